//! Agent executor for running one participant's turn
//!
//! The AgentExecutor implements the per-turn tool loop:
//! 1. Call the LLM with the participant's view of the conversation and its tools
//! 2. If tool use is requested, route each call through the [`ToolTable`]
//! 3. Feed the results back and loop, at most `max_tool_rounds` times
//! 4. Return every message produced during the turn, attributed to the speaker

use agent_core::{ChatMessage, Result, ToolCall, ToolResponse};
use agent_llm::{CompletionRequest, ContentBlock, LLMProvider, Message, StopReason, ToolDefinition};
use agent_tools::{ToolResult, ToolTable};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Configuration for one participant's LLM calls
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum tool rounds within a single turn
    pub max_tool_rounds: usize,

    /// Model to use
    pub model: String,

    /// System prompt (the participant's instruction)
    pub system_prompt: Option<String>,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Temperature
    pub temperature: Option<f32>,

    /// Per-call timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: 5,
            model: "gpt-4.1-nano".to_string(),
            system_prompt: None,
            max_tokens: 4096,
            temperature: Some(0.5),
            timeout_secs: None,
        }
    }
}

/// Runs a participant's turn: LLM → tool calls → execution → loop back
pub struct AgentExecutor {
    provider: Arc<dyn LLMProvider>,
    tools: Arc<ToolTable>,
    config: ExecutorConfig,
}

impl AgentExecutor {
    /// Create a new agent executor
    pub fn new(provider: Arc<dyn LLMProvider>, tools: Arc<ToolTable>, config: ExecutorConfig) -> Self {
        Self {
            provider,
            tools,
            config,
        }
    }

    /// Create a builder
    pub fn builder() -> AgentExecutorBuilder {
        AgentExecutorBuilder::new()
    }

    /// Get the configuration
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Take one turn for `speaker`
    ///
    /// `conversation` is the history as the speaker sees it. The returned
    /// messages are in order: tool-call requests, tool responses and finally
    /// the speaker's text reply.
    pub async fn run_turn(
        &self,
        speaker: &str,
        conversation: Vec<Message>,
    ) -> Result<Vec<ChatMessage>> {
        let mut conversation = conversation;
        let mut produced = Vec::new();
        let tools = self.tool_definitions(speaker);
        let mut tool_round = 0;

        loop {
            info!(
                speaker,
                model = %self.config.model,
                tool_round,
                tool_count = tools.len(),
                messages = conversation.len(),
                "Sending request to LLM"
            );

            let request = self.build_request(conversation.clone(), tools.clone());
            let response = self.provider.complete(request).await.map_err(|e| {
                agent_core::Error::ProcessingFailed(format!("{speaker} LLM call failed: {e}"))
            })?;

            info!(
                speaker,
                stop_reason = ?response.stop_reason,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "LLM response received"
            );

            let text = response.message.text().unwrap_or_default().to_string();
            let calls = tool_calls_of(&response.message);

            if calls.is_empty() {
                if response.stop_reason == StopReason::MaxTokens {
                    warn!(speaker, "Response truncated by token limit");
                }
                debug!(speaker, response_length = text.len(), "Turn completed");
                produced.push(ChatMessage::text(speaker, text));
                return Ok(produced);
            }

            if tool_round >= self.config.max_tool_rounds {
                warn!(
                    speaker,
                    max_tool_rounds = self.config.max_tool_rounds,
                    "Tool round limit reached, ending turn"
                );
                produced.push(ChatMessage::text(speaker, text));
                return Ok(produced);
            }

            tool_round += 1;
            conversation.push(response.message);
            produced.push(ChatMessage::tool_calls(speaker, text, calls.clone()));

            for call in &calls {
                let response = self.execute_tool(speaker, call).await;
                conversation.push(if response.is_error {
                    Message::tool_error(response.call_id.clone(), response.content.clone())
                } else {
                    Message::tool_result(response.call_id.clone(), response.content.clone())
                });
                produced.push(ChatMessage::tool_response(speaker, response));
            }
        }
    }

    fn build_request(&self, messages: Vec<Message>, tools: Vec<ToolDefinition>) -> CompletionRequest {
        let mut builder = CompletionRequest::builder(&self.config.model)
            .messages(messages)
            .max_tokens(self.config.max_tokens)
            .tools(tools);

        if let Some(system) = &self.config.system_prompt {
            builder = builder.system(system.clone());
        }
        if let Some(temperature) = self.config.temperature {
            builder = builder.temperature(temperature);
        }
        if let Some(timeout) = self.config.timeout_secs {
            builder = builder.timeout_secs(timeout);
        }
        builder.build()
    }

    /// Definitions of the tools `speaker` owns
    pub fn tool_definitions(&self, speaker: &str) -> Vec<ToolDefinition> {
        self.tools
            .tools_for(speaker)
            .iter()
            .map(|tool| ToolDefinition::new(tool.name(), tool.description(), tool.input_schema()))
            .collect()
    }

    async fn execute_tool(&self, speaker: &str, call: &ToolCall) -> ToolResponse {
        let result = match self.tools.route(speaker, &call.name) {
            Ok(tool) => {
                let started = Instant::now();
                let result = tool.call(call.arguments.clone()).await;
                let duration_ms = started.elapsed().as_millis() as u64;
                if let Some(error) = result.error_message() {
                    warn!(speaker, tool_name = %call.name, duration_ms, error, "Tool returned an error record");
                } else {
                    info!(speaker, tool_name = %call.name, duration_ms, "Tool execution succeeded");
                }
                result
            }
            Err(e) => {
                warn!(speaker, tool_name = %call.name, error = %e, "Rejected tool call");
                ToolResult::error(&call.name, e.to_string())
            }
        };

        ToolResponse {
            call_id: call.id.clone(),
            content: result.to_json_string(),
            is_error: result.is_error(),
        }
    }
}

fn tool_calls_of(message: &Message) -> Vec<ToolCall> {
    message
        .tool_uses()
        .into_iter()
        .filter_map(|block| match block {
            ContentBlock::ToolUse { id, name, input } => Some(ToolCall {
                id: id.clone(),
                name: name.clone(),
                arguments: input.clone(),
            }),
            _ => None,
        })
        .collect()
}

/// Builder for AgentExecutor
pub struct AgentExecutorBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    tools: Arc<ToolTable>,
    config: ExecutorConfig,
}

impl AgentExecutorBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: Arc::new(ToolTable::default()),
            config: ExecutorConfig::default(),
        }
    }

    /// Set the LLM provider
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the tool table
    pub fn tools(mut self, tools: Arc<ToolTable>) -> Self {
        self.tools = tools;
        self
    }

    /// Set the full configuration
    pub fn config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set maximum tool rounds per turn
    pub fn max_tool_rounds(mut self, max: usize) -> Self {
        self.config.max_tool_rounds = max;
        self
    }

    /// Set the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the system prompt
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    /// Set temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    /// Set the per-call timeout
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = Some(secs);
        self
    }

    /// Build the executor
    pub fn build(self) -> Result<AgentExecutor> {
        let provider = self.provider.ok_or_else(|| {
            agent_core::Error::InitializationFailed("Provider not set".to_string())
        })?;

        Ok(AgentExecutor::new(provider, self.tools, self.config))
    }
}

impl Default for AgentExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
