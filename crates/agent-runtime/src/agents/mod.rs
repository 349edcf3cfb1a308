//! Concrete conversation participants
//!
//! - AssistantAgent: LLM-backed role that may call its own tools during its turn
//! - CoordinatorAgent: user proxy that runs code blocks, consolidates results
//!   and ends the exchange when its auto-reply budget is spent

pub mod assistant;
pub mod coordinator;

pub use assistant::AssistantAgent;
pub use coordinator::{CoordinatorAgent, CoordinatorAgentBuilder};
