//! Assistant agent implementation (wraps AgentExecutor)

use crate::executor::AgentExecutor;
use crate::perspective::messages_for;
use agent_core::{Agent, Context, Reply, Result, Transcript};
use async_trait::async_trait;
use tracing::debug;

/// An LLM-backed participant with its own tools
///
/// On each turn the assistant reads the shared transcript from its own point
/// of view, runs the executor's tool loop, and appends everything it produced.
///
/// # Example
///
/// ```no_run
/// use agent_runtime::{AgentRuntime, ExecutorConfig};
///
/// # fn example(runtime: &AgentRuntime) {
/// let analyst = runtime.create_assistant(
///     "technical_analyst",
///     "Computes SMA, EMA and RSI",
///     ExecutorConfig::default(),
/// );
/// # }
/// ```
pub struct AssistantAgent {
    executor: AgentExecutor,
    name: String,
    description: String,
}

impl AssistantAgent {
    /// Create a new assistant
    pub fn new(executor: AgentExecutor, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            executor,
            name: name.into(),
            description: description.into(),
        }
    }

    /// Get a reference to the underlying executor
    pub fn executor(&self) -> &AgentExecutor {
        &self.executor
    }
}

#[async_trait]
impl Agent for AssistantAgent {
    async fn reply(&self, transcript: &Transcript, context: &mut Context) -> Result<Reply> {
        debug!(
            agent = %self.name,
            round = context.round(),
            run_id = context.run_id().unwrap_or_default(),
            "Assistant turn"
        );
        let history = messages_for(transcript, &self.name);
        let produced = self.executor.run_turn(&self.name, history).await?;
        Ok(Reply::Messages(produced))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;
    use agent_core::ChatMessage;
    use agent_llm::Role;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_assistant_replies_from_own_perspective() {
        let provider = ScriptedProvider::new(vec![ScriptedProvider::text("Revenue grew 8%.")]);
        let executor = AgentExecutor::builder()
            .provider(Arc::new(provider.clone()))
            .system_prompt("You are a Finance Reporting Analyst")
            .build()
            .unwrap();
        let agent = AssistantAgent::new(executor, "finance_reporting_analyst", "reports");

        let mut transcript = Transcript::new();
        transcript.push(ChatMessage::text("supervisor", "Analyze AAPL"));
        let reply = agent.reply(&transcript, &mut Context::new()).await.unwrap();

        assert_eq!(
            reply,
            Reply::say(ChatMessage::text("finance_reporting_analyst", "Revenue grew 8%."))
        );
        let request = &provider.requests()[0];
        assert_eq!(request.system.as_deref(), Some("You are a Finance Reporting Analyst"));
        assert_eq!(request.messages[0].role, Role::User);
        assert_eq!(request.messages[0].name.as_deref(), Some("supervisor"));
        assert!(request.tools.is_none());
        assert_eq!(agent.description(), "reports");
    }
}
