//! Stock analysis agents
//!
//! Builds the validated tool table and the four desk participants on top of
//! an [`AgentRuntime`].

pub mod roles;

pub use roles::Role;

use crate::api::MarketDataSource;
use crate::config::StockConfig;
use crate::tools::all_tools;
use agent_core::{Agent, Result};
use agent_runtime::{AgentRuntime, ExecutorConfig};
use agent_tools::ToolTable;
use std::sync::Arc;
use tracing::debug;

/// Give every finance tool to the role that owns it
///
/// Fails when a tool has two owners, an owner is not a participant, or a
/// role declares a tool with no handler.
pub fn build_tool_table(source: &Arc<dyn MarketDataSource>) -> Result<ToolTable> {
    let tools = all_tools(source);
    let mut builder = ToolTable::builder();

    for role in Role::ALL {
        builder = builder.advertise(role.tools().iter().copied());
        for tool in tools.iter().filter(|t| role.tools().contains(&t.name())) {
            builder = builder.assign(role.name(), tool.clone());
        }
    }

    Ok(builder.build(&Role::participant_names())?)
}

fn executor_config(role: Role, config: &StockConfig) -> ExecutorConfig {
    ExecutorConfig {
        max_tool_rounds: config.max_tool_rounds,
        model: config.model.model.clone(),
        system_prompt: Some(role.instruction().to_string()),
        max_tokens: config.model.max_tokens,
        temperature: Some(config.model.temperature),
        timeout_secs: Some(role.timeout_secs(&config.model.timeouts)),
    }
}

/// The desk participants in speaking order, supervisor first
pub fn build_participants(runtime: &AgentRuntime, config: &StockConfig) -> Result<Vec<Arc<dyn Agent>>> {
    let mut participants: Vec<Arc<dyn Agent>> = Vec::with_capacity(Role::ALL.len());

    for role in Role::ALL {
        debug!(role = %role, tools = ?role.tools(), "Creating participant");
        let agent: Arc<dyn Agent> = match role {
            Role::Supervisor => Arc::new(runtime.create_coordinator(
                role.name(),
                role.description(),
                executor_config(role, config),
                config.max_auto_replies,
            )?),
            _ => Arc::new(runtime.create_assistant(
                role.name(),
                role.description(),
                executor_config(role, config),
            )),
        };
        participants.push(agent);
    }

    Ok(participants)
}
