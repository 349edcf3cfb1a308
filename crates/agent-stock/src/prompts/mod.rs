//! Role instructions

pub mod system;
