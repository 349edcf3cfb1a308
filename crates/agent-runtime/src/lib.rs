//! Agent runtime for multi-agent conversations
//!
//! This crate provides the runtime infrastructure for running a conversation
//! between LLM-backed participants: the AgentExecutor for a participant's
//! tool loop, the AssistantAgent and CoordinatorAgent participants, the
//! CodeExecutor sandbox and the round-robin GroupChat.

pub mod agents;
pub mod chat;
pub mod code;
pub mod executor;
pub mod perspective;
pub mod runtime;

#[cfg(test)]
mod testing;

// Re-export key types
pub use agents::{AssistantAgent, CoordinatorAgent, CoordinatorAgentBuilder};
pub use chat::{ChatOutcome, GroupChat, GroupChatBuilder, StopCause};
pub use code::{CodeBlock, CodeExecutor, ExecutionResult};
pub use executor::{AgentExecutor, AgentExecutorBuilder, ExecutorConfig};
pub use runtime::{AgentRuntime, AgentRuntimeBuilder, RuntimeConfig};
