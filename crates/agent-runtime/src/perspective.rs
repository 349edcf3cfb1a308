//! Render the shared transcript as one participant's LLM history
//!
//! The participant's own messages become assistant turns, its tool traffic
//! stays structured, and everyone else speaks as a named user. Other
//! participants' tool results are passed on as text so later speakers can
//! build on the data.

use agent_core::{ChatMessage, Transcript};
use agent_llm::Message;

/// Convert `transcript` into the message history seen by `me`
pub fn messages_for(transcript: &Transcript, me: &str) -> Vec<Message> {
    transcript
        .messages()
        .iter()
        .filter_map(|message| convert(message, me))
        .collect()
}

fn convert(message: &ChatMessage, me: &str) -> Option<Message> {
    let own = message.speaker == me;

    if let Some(response) = &message.tool_response {
        return Some(if own {
            if response.is_error {
                Message::tool_error(response.call_id.clone(), response.content.clone())
            } else {
                Message::tool_result(response.call_id.clone(), response.content.clone())
            }
        } else {
            Message::user(format!("Tool result: {}", response.content)).with_name(&message.speaker)
        });
    }

    if own && message.has_tool_calls() {
        return Some(Message::assistant_tool_uses(
            message.content.clone(),
            message
                .tool_calls
                .iter()
                .map(|call| (call.id.clone(), call.name.clone(), call.arguments.clone())),
        ));
    }

    let text = message.spoken_text()?;
    Some(if own {
        Message::assistant(text)
    } else {
        Message::user(text).with_name(&message.speaker)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::{ToolCall, ToolResponse};
    use agent_llm::Role;
    use serde_json::json;

    fn sample() -> Transcript {
        let mut transcript = Transcript::new();
        transcript.push(ChatMessage::text("supervisor", "Analyze MSFT"));
        transcript.push(ChatMessage::tool_calls(
            "technical_analyst",
            "",
            vec![ToolCall {
                id: "call_1".into(),
                name: "technical_analysis_tool".into(),
                arguments: json!({"ticker": "MSFT"}),
            }],
        ));
        transcript.push(ChatMessage::tool_response(
            "technical_analyst",
            ToolResponse {
                call_id: "call_1".into(),
                content: r#"{"name":"technical_analysis_tool","data":{"RSI":55.0}}"#.into(),
                is_error: false,
            },
        ));
        transcript.push(ChatMessage::text("technical_analyst", "RSI is neutral."));
        transcript.push(ChatMessage::text("strategy_agent", "   "));
        transcript
    }

    #[test]
    fn test_own_perspective_keeps_tool_structure() {
        let messages = messages_for(&sample(), "technical_analyst");

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].name.as_deref(), Some("supervisor"));
        assert!(messages[1].has_tool_uses());
        assert_eq!(messages[2].role, Role::User);
        assert!(messages[2].name.is_none());
        assert_eq!(messages[3].role, Role::Assistant);
        assert_eq!(messages[3].text(), Some("RSI is neutral."));
    }

    #[test]
    fn test_other_perspective_flattens_tool_traffic() {
        let messages = messages_for(&sample(), "strategy_agent");

        // opening, tool result as text, analyst reply; the blank turn and
        // the bare tool-call message are dropped
        assert_eq!(messages.len(), 3);
        assert!(messages.iter().all(|m| m.role == Role::User));
        assert!(messages[1].text().unwrap().starts_with("Tool result: "));
        assert_eq!(messages[1].name.as_deref(), Some("technical_analyst"));
    }
}
