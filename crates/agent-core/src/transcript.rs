//! Shared conversation transcript
//!
//! Every participant of an exchange reads the same [`Transcript`] and appends
//! [`ChatMessage`]s attributed to itself. The transcript is provider-agnostic:
//! each participant decides how to present it to its own LLM.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool invocation requested by a participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned call id, echoed back in the response
    pub id: String,
    /// Tool name
    pub name: String,
    /// Tool arguments (JSON object)
    pub arguments: Value,
}

/// The answer to a [`ToolCall`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    /// Id of the call being answered
    pub call_id: String,
    /// Serialized tool output
    pub content: String,
    /// Whether the call could not be routed or executed
    #[serde(default)]
    pub is_error: bool,
}

/// One message of the exchange, attributed to a speaker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Name of the participant that produced the message
    pub speaker: String,

    /// Text content (may be empty for pure tool-call messages)
    #[serde(default)]
    pub content: String,

    /// Tool calls requested by the speaker
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,

    /// Set when this message answers a tool call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_response: Option<ToolResponse>,
}

impl ChatMessage {
    /// Plain text message
    pub fn text(speaker: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            content: content.into(),
            tool_calls: Vec::new(),
            tool_response: None,
        }
    }

    /// Message requesting tool calls, with optional accompanying text
    pub fn tool_calls(
        speaker: impl Into<String>,
        content: impl Into<String>,
        calls: Vec<ToolCall>,
    ) -> Self {
        Self {
            speaker: speaker.into(),
            content: content.into(),
            tool_calls: calls,
            tool_response: None,
        }
    }

    /// Tool response message
    pub fn tool_response(speaker: impl Into<String>, response: ToolResponse) -> Self {
        Self {
            speaker: speaker.into(),
            content: response.content.clone(),
            tool_calls: Vec::new(),
            tool_response: Some(response),
        }
    }

    /// Whether the message asks for tools
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Whether the message answers a tool call
    pub fn is_tool_response(&self) -> bool {
        self.tool_response.is_some()
    }

    /// Text of a conversational message: `None` for tool traffic and blank text
    pub fn spoken_text(&self) -> Option<&str> {
        if self.is_tool_response() || self.content.trim().is_empty() {
            None
        } else {
            Some(&self.content)
        }
    }
}

/// Ordered, append-only log of an exchange
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    /// Create an empty transcript
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one message
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Append several messages in order
    pub fn extend(&mut self, messages: impl IntoIterator<Item = ChatMessage>) {
        self.messages.extend(messages);
    }

    /// All messages, oldest first
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Most recent message
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Most recent non-empty conversational text
    pub fn last_spoken(&self) -> Option<&ChatMessage> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.spoken_text().is_some())
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if nothing has been said yet
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Consume the transcript
    pub fn into_messages(self) -> Vec<ChatMessage> {
        self.messages
    }
}
