//! The analysis desk: one multi-agent exchange per request
//!
//! [`StockAnalysisDesk::run`] builds the participants, runs the round-robin
//! chat with the request as the supervisor's opening message and extracts
//! the final text. [`StockAnalysisDesk::analyze`] is the infallible wrapper
//! used by the presentation layer.

use crate::agents::{Role, build_participants, build_tool_table};
use crate::api::MarketDataSource;
use crate::config::StockConfig;
use crate::error::Result;
use agent_core::Context;
use agent_llm::LLMProvider;
use agent_llm::providers::{OpenAIConfig, OpenAIProvider};
use agent_runtime::{AgentRuntime, ChatOutcome, GroupChat, RuntimeConfig};
use agent_tools::ToolTable;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Returned when the exchange produced no text at all
pub const NO_RESULT_PLACEHOLDER: &str = "Analysis completed successfully. No detailed result was returned.";

/// Speakers whose messages count as the final answer, besides the coordinator
const ANSWER_SPEAKERS: [&str; 2] = ["user", "manager"];

/// Runs analysis requests through the four-role desk
pub struct StockAnalysisDesk {
    config: StockConfig,
    source: Arc<dyn MarketDataSource>,
    tools: ToolTable,
    provider: Option<Arc<dyn LLMProvider>>,
}

impl StockAnalysisDesk {
    /// Validate `config` and the tool table
    pub fn new(config: StockConfig, source: Arc<dyn MarketDataSource>) -> Result<Self> {
        config.validate()?;
        let tools = build_tool_table(&source)?;
        Ok(Self {
            config,
            source,
            tools,
            provider: None,
        })
    }

    /// Use `provider` instead of the OpenAI client built from the configuration
    pub fn with_provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn config(&self) -> &StockConfig {
        &self.config
    }

    pub fn source(&self) -> &Arc<dyn MarketDataSource> {
        &self.source
    }

    fn provider(&self) -> Result<Arc<dyn LLMProvider>> {
        if let Some(provider) = &self.provider {
            return Ok(provider.clone());
        }

        let mut openai = OpenAIConfig::new(self.config.api_key()?)
            .with_timeout(self.config.model.timeouts.coordinator);
        if let Some(base_url) = &self.config.model.base_url {
            openai = openai.with_api_base(base_url);
        }
        Ok(Arc::new(OpenAIProvider::with_config(openai)?))
    }

    /// Build the provider, the participants and the chat for one exchange
    ///
    /// Initialization problems surface here, before any message is sent.
    pub fn prepare(&self) -> Result<GroupChat> {
        let runtime = AgentRuntime::builder()
            .provider(self.provider()?)
            .tools(self.tools.clone())
            .config(RuntimeConfig {
                default_max_tool_rounds: self.config.max_tool_rounds,
                default_model: self.config.model.model.clone(),
                code_timeout: self.config.code_timeout,
            })
            .build()?;

        let mut chat = GroupChat::builder().max_round(self.config.max_round);
        for participant in build_participants(&runtime, &self.config)? {
            chat = chat.participant(participant);
        }
        Ok(chat.build()?)
    }

    /// Prepare a chat, run one exchange and return its final text
    pub async fn run(&self, request: &str) -> Result<String> {
        let chat = self.prepare()?;
        self.run_prepared(&chat, request).await
    }

    /// Run one exchange on a chat from [`StockAnalysisDesk::prepare`]
    pub async fn run_prepared(&self, chat: &GroupChat, request: &str) -> Result<String> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let started = Instant::now();
        info!(run_id = %run_id, request, model = %self.config.model.model, "Starting analysis");

        let mut context = Context::new().with_run_id(&run_id);
        let outcome = chat.run(request, &mut context).await?;

        info!(
            run_id = %run_id,
            rounds = outcome.rounds,
            stop_cause = ?outcome.stop_cause,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Analysis finished"
        );
        Ok(extract_result(&outcome, Role::Supervisor.name()))
    }

    /// Run one exchange; failures come back as `Error during analysis: ...`
    pub async fn analyze(&self, request: &str) -> String {
        as_text(self.run(request).await)
    }

    /// [`StockAnalysisDesk::analyze`] on a chat that is already prepared
    pub async fn analyze_prepared(&self, chat: &GroupChat, request: &str) -> String {
        as_text(self.run_prepared(chat, request).await)
    }
}

fn as_text(result: Result<String>) -> String {
    match result {
        Ok(text) => text,
        Err(e) => {
            error!(error = %e, "Analysis failed");
            format!("Error during analysis: {e}")
        }
    }
}

/// Final text of an exchange
///
/// The latest non-empty message after the opening request from the
/// coordinator (or a speaker named `user` or `manager`), else the chat
/// summary, else [`NO_RESULT_PLACEHOLDER`].
pub fn extract_result(outcome: &ChatOutcome, coordinator: &str) -> String {
    outcome
        .transcript
        .messages()
        .iter()
        .skip(1)
        .rev()
        .filter(|m| m.speaker == coordinator || ANSWER_SPEAKERS.contains(&m.speaker.as_str()))
        .find_map(|m| m.spoken_text())
        .or_else(|| outcome.summary.as_deref().filter(|s| !s.trim().is_empty()))
        .unwrap_or(NO_RESULT_PLACEHOLDER)
        .to_string()
}
