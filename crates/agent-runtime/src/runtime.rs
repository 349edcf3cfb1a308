//! Runtime holding the shared resources of an exchange
//!
//! The AgentRuntime owns the LLM provider and the tool table, and provides
//! factory methods for the participants built on them.

use agent_core::Result;
use agent_llm::LLMProvider;
use agent_tools::ToolTable;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::agents::{AssistantAgent, CoordinatorAgent};
use crate::code::{CodeExecutor, DEFAULT_TIMEOUT};
use crate::executor::{AgentExecutor, ExecutorConfig};

/// Configuration for the agent runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Default maximum tool rounds for assistants
    pub default_max_tool_rounds: usize,

    /// Default model to use
    pub default_model: String,

    /// Timeout for coordinator code blocks
    pub code_timeout: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            default_max_tool_rounds: 5,
            default_model: "gpt-4.1-nano".to_string(),
            code_timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Factory for participants sharing one provider and tool table
///
/// # Example
///
/// ```no_run
/// use agent_runtime::{AgentRuntime, ExecutorConfig};
/// # fn example(provider: std::sync::Arc<dyn agent_llm::LLMProvider>, tools: agent_tools::ToolTable) -> agent_core::Result<()> {
/// let runtime = AgentRuntime::builder()
///     .provider(provider)
///     .tools(tools)
///     .build()?;
///
/// let analyst = runtime.create_assistant(
///     "strategy_agent",
///     "Buy/sell/hold recommendations",
///     ExecutorConfig::default(),
/// );
/// # Ok(())
/// # }
/// ```
pub struct AgentRuntime {
    provider: Arc<dyn LLMProvider>,
    tools: Arc<ToolTable>,
    config: RuntimeConfig,
}

impl AgentRuntime {
    /// Create a new agent runtime
    pub fn new(provider: Arc<dyn LLMProvider>, tools: Arc<ToolTable>, config: RuntimeConfig) -> Self {
        Self {
            provider,
            tools,
            config,
        }
    }

    /// Create a new runtime builder
    pub fn builder() -> AgentRuntimeBuilder {
        AgentRuntimeBuilder::new()
    }

    /// Get a reference to the LLM provider
    pub fn provider(&self) -> &Arc<dyn LLMProvider> {
        &self.provider
    }

    /// Get a reference to the tool table
    pub fn tools(&self) -> &Arc<ToolTable> {
        &self.tools
    }

    /// Get a reference to the runtime configuration
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    fn executor(&self, config: ExecutorConfig) -> AgentExecutor {
        AgentExecutor::new(self.provider.clone(), self.tools.clone(), config)
    }

    /// Create an LLM participant that may call the tools it owns
    pub fn create_assistant(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        config: ExecutorConfig,
    ) -> AssistantAgent {
        let name = name.into();
        debug!(
            agent = %name,
            tools = self.tools.tools_for(&name).len(),
            model = %config.model,
            "Creating assistant"
        );
        AssistantAgent::new(self.executor(config), name, description)
    }

    /// Create the coordinator: LLM consolidation plus code execution
    pub fn create_coordinator(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        config: ExecutorConfig,
        max_auto_replies: u64,
    ) -> Result<CoordinatorAgent> {
        let code_executor = CodeExecutor::new(self.config.code_timeout)?;
        Ok(CoordinatorAgent::builder(name)
            .description(description)
            .executor(self.executor(config))
            .code_executor(code_executor)
            .max_auto_replies(max_auto_replies)
            .build())
    }
}

/// Builder for AgentRuntime
pub struct AgentRuntimeBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    tools: Option<ToolTable>,
    config: RuntimeConfig,
}

impl AgentRuntimeBuilder {
    /// Create a new runtime builder
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: None,
            config: RuntimeConfig::default(),
        }
    }

    /// Set the LLM provider
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the tool table
    pub fn tools(mut self, tools: ToolTable) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Set the runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the default max tool rounds
    pub fn default_max_tool_rounds(mut self, max: usize) -> Self {
        self.config.default_max_tool_rounds = max;
        self
    }

    /// Set the default model
    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        self.config.default_model = model.into();
        self
    }

    /// Set the code block timeout
    pub fn code_timeout(mut self, timeout: Duration) -> Self {
        self.config.code_timeout = timeout;
        self
    }

    /// Build the runtime
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is not set
    pub fn build(self) -> Result<AgentRuntime> {
        let provider = self.provider.ok_or_else(|| {
            agent_core::Error::InitializationFailed("Provider not set".to_string())
        })?;

        Ok(AgentRuntime::new(
            provider,
            Arc::new(self.tools.unwrap_or_default()),
            self.config,
        ))
    }
}

impl Default for AgentRuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
