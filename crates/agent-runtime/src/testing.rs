//! Hand-written doubles shared by the runtime tests

use agent_llm::{
    CompletionRequest, CompletionResponse, ContentBlock, LLMError, LLMProvider, Message,
    MessageContent, Role, StopReason, TokenUsage,
};
use agent_tools::{Metrics, Tool, ToolResult, ToolTable};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Provider replaying canned responses and recording requests
#[derive(Clone)]
pub struct ScriptedProvider {
    script: Arc<Mutex<VecDeque<CompletionResponse>>>,
    repeat: Option<CompletionResponse>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<CompletionResponse>) -> Self {
        Self {
            script: Arc::new(Mutex::new(responses.into())),
            repeat: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn repeating(response: CompletionResponse) -> Self {
        Self {
            repeat: Some(response),
            ..Self::new(Vec::new())
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn text(text: &str) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant(text),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }

    pub fn tool_use(id: &str, name: &str, input: Value) -> CompletionResponse {
        CompletionResponse {
            message: Message {
                role: Role::Assistant,
                name: None,
                content: Some(MessageContent::Blocks(vec![ContentBlock::ToolUse {
                    id: id.to_string(),
                    name: name.to_string(),
                    input,
                }])),
            },
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage::default(),
        }
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn complete(&self, request: CompletionRequest) -> agent_llm::Result<CompletionResponse> {
        self.requests.lock().unwrap().push(request);
        let next = self.script.lock().unwrap().pop_front();
        next.or_else(|| self.repeat.clone())
            .ok_or_else(|| LLMError::RequestFailed("script exhausted".to_string()))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Tool answering every call the same way
pub struct StubTool {
    name: &'static str,
    fail_from_call: Option<usize>,
    calls: AtomicUsize,
}

impl StubTool {
    pub fn ok(name: &'static str) -> Self {
        Self {
            name,
            fail_from_call: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Succeeds until the `n`th call (1-based), then reports errors
    pub fn failing_from(name: &'static str, n: usize) -> Self {
        Self {
            fail_from_call: Some(n),
            ..Self::ok(name)
        }
    }
}

#[async_trait]
impl Tool for StubTool {
    async fn call(&self, params: Value) -> ToolResult {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_from_call.is_some_and(|n| call >= n) {
            return ToolResult::error(self.name, "upstream service unavailable");
        }
        let mut metrics = Metrics::new();
        metrics.insert(
            "ticker".into(),
            params.get("ticker").and_then(Value::as_str).map(Into::into),
        );
        ToolResult::data(self.name, metrics)
    }

    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "stub tool"
    }

    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {"ticker": {"type": "string"}}})
    }
}

/// Table giving `role` one tool that fails from its second call on
pub fn failing_tool_table(role: &str, tool: &'static str) -> ToolTable {
    ToolTable::builder()
        .assign(role, Arc::new(StubTool::failing_from(tool, 2)))
        .build(&[role])
        .unwrap()
}
