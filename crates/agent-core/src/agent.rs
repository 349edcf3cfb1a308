//! Core Agent trait definition

use crate::{ChatMessage, Context, Result, Transcript};
use async_trait::async_trait;

/// What a participant does with its turn
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Messages to append to the transcript, in order. May be empty.
    Messages(Vec<ChatMessage>),
    /// End the exchange without speaking
    Terminate,
}

impl Reply {
    /// A single message reply
    pub fn say(message: ChatMessage) -> Self {
        Self::Messages(vec![message])
    }

    /// A turn in which nothing is said
    pub fn silent() -> Self {
        Self::Messages(Vec::new())
    }
}

/// A named participant in a multi-agent exchange
///
/// The participant sees the whole shared transcript and answers with the
/// messages it wants appended. Everything it appends must be attributed to
/// its own name.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Take one turn of the exchange
    async fn reply(&self, transcript: &Transcript, context: &mut Context) -> Result<Reply>;

    /// Get the agent's name (unique within an exchange)
    fn name(&self) -> &str;

    /// One-line description of the participant's role
    fn description(&self) -> &str {
        ""
    }
}
