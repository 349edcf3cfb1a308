//! Shared utilities for agent-rs
//!
//! This crate provides common functionality used across the workspace:
//! tracing setup and the environment-backed application configuration.

pub mod config;
pub mod logging;

pub use config::{Config, ConfigError};
pub use logging::{LogFormat, init_tracing, init_tracing_with};
