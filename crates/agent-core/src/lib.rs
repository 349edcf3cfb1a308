//! Core abstractions for agent-rs conversations
//!
//! This crate defines the fundamental traits and types shared by every
//! participant of a multi-agent exchange: the [`Agent`] trait, the shared
//! [`Transcript`], the per-run [`Context`] and the common [`Error`] type.

pub mod agent;
pub mod context;
pub mod error;
pub mod transcript;

pub use agent::{Agent, Reply};
pub use context::Context;
pub use error::{Error, Result};
pub use transcript::{ChatMessage, ToolCall, ToolResponse, Transcript};
