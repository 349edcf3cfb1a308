//! Coordinator agent (user proxy that never asks a human)

use crate::code::CodeExecutor;
use crate::executor::AgentExecutor;
use crate::perspective::messages_for;
use agent_core::{Agent, ChatMessage, Context, Reply, Result, Transcript};
use async_trait::async_trait;
use tracing::{debug, info};

/// Default auto-reply budget
pub const DEFAULT_MAX_AUTO_REPLIES: u64 = 3;

/// The participant that opens the exchange and speaks for the user
///
/// Each of its turns is an automatic reply, chosen in this order:
/// 1. run the code blocks in the latest message from another participant;
/// 2. consolidate the discussion with its LLM, if it has one;
/// 3. an empty reply.
///
/// Once `max_auto_replies` turns have been used it terminates the exchange.
pub struct CoordinatorAgent {
    name: String,
    description: String,
    executor: Option<AgentExecutor>,
    code_executor: Option<CodeExecutor>,
    max_auto_replies: u64,
}

impl CoordinatorAgent {
    /// Create a builder
    pub fn builder(name: impl Into<String>) -> CoordinatorAgentBuilder {
        CoordinatorAgentBuilder::new(name)
    }

    /// Auto-reply budget
    pub fn max_auto_replies(&self) -> u64 {
        self.max_auto_replies
    }

    fn counter_key(&self) -> String {
        format!("{}.auto_reply", self.name)
    }

    async fn run_code(&self, transcript: &Transcript) -> Option<String> {
        let code_executor = self.code_executor.as_ref()?;
        let latest = transcript
            .messages()
            .iter()
            .rev()
            .find(|m| m.spoken_text().is_some())?;
        if latest.speaker == self.name {
            return None;
        }

        let blocks = code_executor.extract_blocks(&latest.content);
        if blocks.is_empty() {
            return None;
        }

        info!(agent = %self.name, blocks = blocks.len(), from = %latest.speaker, "Running code blocks");
        Some(code_executor.execute(&blocks).await.to_reply())
    }
}

#[async_trait]
impl Agent for CoordinatorAgent {
    async fn reply(&self, transcript: &Transcript, context: &mut Context) -> Result<Reply> {
        let key = self.counter_key();
        if context.counter(&key) >= self.max_auto_replies {
            info!(
                agent = %self.name,
                max_auto_replies = self.max_auto_replies,
                "Auto-reply budget spent, terminating"
            );
            return Ok(Reply::Terminate);
        }
        let used = context.increment(&key);
        debug!(agent = %self.name, auto_reply = used, round = context.round(), "Coordinator turn");

        if let Some(output) = self.run_code(transcript).await {
            return Ok(Reply::say(ChatMessage::text(&self.name, output)));
        }

        if let Some(executor) = &self.executor {
            let history = messages_for(transcript, &self.name);
            let produced = executor.run_turn(&self.name, history).await?;
            return Ok(Reply::Messages(produced));
        }

        Ok(Reply::say(ChatMessage::text(&self.name, "")))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for [`CoordinatorAgent`]
pub struct CoordinatorAgentBuilder {
    name: String,
    description: String,
    executor: Option<AgentExecutor>,
    code_executor: Option<CodeExecutor>,
    max_auto_replies: u64,
}

impl CoordinatorAgentBuilder {
    /// Create a builder for a coordinator called `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            executor: None,
            code_executor: None,
            max_auto_replies: DEFAULT_MAX_AUTO_REPLIES,
        }
    }

    /// Set the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Consolidate with this LLM executor
    pub fn executor(mut self, executor: AgentExecutor) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Run code blocks with this executor
    pub fn code_executor(mut self, code_executor: CodeExecutor) -> Self {
        self.code_executor = Some(code_executor);
        self
    }

    /// Set the auto-reply budget
    pub fn max_auto_replies(mut self, max: u64) -> Self {
        self.max_auto_replies = max;
        self
    }

    /// Build the coordinator
    pub fn build(self) -> CoordinatorAgent {
        CoordinatorAgent {
            name: self.name,
            description: self.description,
            executor: self.executor,
            code_executor: self.code_executor,
            max_auto_replies: self.max_auto_replies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::DEFAULT_TIMEOUT;
    use crate::testing::ScriptedProvider;
    use std::sync::Arc;

    fn opening() -> Transcript {
        let mut transcript = Transcript::new();
        transcript.push(ChatMessage::text("supervisor", "Analyze MSFT"));
        transcript
    }

    #[tokio::test]
    async fn test_budget_then_terminate() {
        let coordinator = CoordinatorAgent::builder("supervisor").max_auto_replies(2).build();
        let mut context = Context::new();
        let transcript = opening();

        for _ in 0..2 {
            let reply = coordinator.reply(&transcript, &mut context).await.unwrap();
            assert_eq!(reply, Reply::say(ChatMessage::text("supervisor", "")));
        }
        let reply = coordinator.reply(&transcript, &mut context).await.unwrap();
        assert_eq!(reply, Reply::Terminate);
    }

    #[tokio::test]
    async fn test_consolidates_with_llm() {
        let provider = ScriptedProvider::new(vec![ScriptedProvider::text("Final report: HOLD")]);
        let executor = AgentExecutor::builder()
            .provider(Arc::new(provider.clone()))
            .system_prompt("Consolidate the findings")
            .build()
            .unwrap();
        let coordinator = CoordinatorAgent::builder("supervisor").executor(executor).build();

        let mut transcript = opening();
        transcript.push(ChatMessage::text("strategy_agent", "Signal: HOLD"));
        let reply = coordinator.reply(&transcript, &mut Context::new()).await.unwrap();

        assert_eq!(reply, Reply::say(ChatMessage::text("supervisor", "Final report: HOLD")));
        // its own opening message is presented as an assistant turn
        let request = &provider.requests()[0];
        assert_eq!(request.messages[0].role, agent_llm::Role::Assistant);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_runs_code_from_other_participant() {
        let coordinator = CoordinatorAgent::builder("supervisor")
            .code_executor(CodeExecutor::new(DEFAULT_TIMEOUT).unwrap())
            .build();

        let mut transcript = opening();
        transcript.push(ChatMessage::text(
            "technical_analyst",
            "Check this:\n```sh\necho 42\n```",
        ));
        let reply = coordinator.reply(&transcript, &mut Context::new()).await.unwrap();

        match reply {
            Reply::Messages(messages) => {
                assert_eq!(messages[0].content, "exitcode: 0 (execution succeeded)\nCode output: 42\n");
            }
            Reply::Terminate => panic!("Expected a reply"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_ignores_code_in_own_message() {
        let coordinator = CoordinatorAgent::builder("supervisor")
            .code_executor(CodeExecutor::new(DEFAULT_TIMEOUT).unwrap())
            .build();

        let mut transcript = Transcript::new();
        transcript.push(ChatMessage::text("supervisor", "```sh\necho 1\n```"));
        let reply = coordinator.reply(&transcript, &mut Context::new()).await.unwrap();
        assert_eq!(reply, Reply::say(ChatMessage::text("supervisor", "")));
    }
}
