//! Error types for agent-core

use thiserror::Error;

/// Result type alias for agent-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for agent operations
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// Agent or conversation setup failed
    #[error("Agent initialization failed: {0}")]
    InitializationFailed(String),

    /// A participant failed while taking its turn
    #[error("Agent processing failed: {0}")]
    ProcessingFailed(String),

    /// A participant asked for a tool it does not own
    #[error("Tool '{tool}' is not available to {agent}")]
    ToolUnavailable {
        /// Requesting participant
        agent: String,
        /// Requested tool name
        tool: String,
    },
}
