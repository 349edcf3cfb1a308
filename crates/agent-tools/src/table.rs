//! Static role → tool table
//!
//! Each tool belongs to exactly one participant. The table is built once,
//! validated against the participant list, and then only read.

use crate::Tool;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Problems found while building or querying a [`ToolTable`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolTableError {
    /// Two assignments for the same tool name
    #[error("tool '{tool}' is assigned to both {first} and {second}")]
    DuplicateTool {
        /// Tool name
        tool: String,
        /// Role of the first assignment
        first: String,
        /// Role of the conflicting assignment
        second: String,
    },

    /// A tool is owned by a role that does not take part in the exchange
    #[error("tool '{tool}' is owned by '{role}', which is not a participant")]
    UnknownOwner {
        /// Tool name
        tool: String,
        /// Owning role
        role: String,
    },

    /// An advertised tool has no handler
    #[error("tool '{0}' is advertised but has no handler")]
    MissingHandler(String),

    /// A role asked for a tool it does not own
    #[error("tool '{tool}' is not available to {role}")]
    NotOwned {
        /// Requesting role
        role: String,
        /// Requested tool
        tool: String,
    },
}

impl From<ToolTableError> for agent_core::Error {
    fn from(err: ToolTableError) -> Self {
        match err {
            ToolTableError::NotOwned { role, tool } => Self::ToolUnavailable { agent: role, tool },
            other => Self::InitializationFailed(other.to_string()),
        }
    }
}

/// Role → tools mapping
///
/// # Example
///
/// ```ignore
/// let table = ToolTable::builder()
///     .assign("technical_analyst", Arc::new(TechnicalAnalysisTool::new(source)))
///     .build(&["supervisor", "technical_analyst"])?;
/// assert_eq!(table.owner_of("technical_analysis_tool"), Some("technical_analyst"));
/// ```
#[derive(Clone, Default)]
pub struct ToolTable {
    by_role: BTreeMap<String, Vec<Arc<dyn Tool>>>,
    owners: HashMap<String, String>,
}

impl ToolTable {
    /// Create a builder
    pub fn builder() -> ToolTableBuilder {
        ToolTableBuilder::default()
    }

    /// Tools owned by a role, in assignment order
    pub fn tools_for(&self, role: &str) -> &[Arc<dyn Tool>] {
        self.by_role.get(role).map_or(&[], Vec::as_slice)
    }

    /// Role owning a tool
    pub fn owner_of(&self, tool: &str) -> Option<&str> {
        self.owners.get(tool).map(String::as_str)
    }

    /// Resolve a tool call made by `role`
    ///
    /// Fails with [`ToolTableError::NotOwned`] when the tool is unknown or
    /// belongs to someone else.
    pub fn route(&self, role: &str, tool: &str) -> Result<Arc<dyn Tool>, ToolTableError> {
        self.tools_for(role)
            .iter()
            .find(|t| t.name() == tool)
            .cloned()
            .ok_or_else(|| ToolTableError::NotOwned {
                role: role.to_string(),
                tool: tool.to_string(),
            })
    }

    /// Roles that own at least one tool
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.by_role.keys().map(String::as_str)
    }

    /// Total number of tools
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Whether the table has no tools
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

impl std::fmt::Debug for ToolTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (role, tools) in &self.by_role {
            let names: Vec<&str> = tools.iter().map(|t| t.name()).collect();
            map.entry(role, &names);
        }
        map.finish()
    }
}

/// Builder for [`ToolTable`]
#[derive(Default)]
pub struct ToolTableBuilder {
    assignments: Vec<(String, Arc<dyn Tool>)>,
    advertised: Vec<String>,
}

impl ToolTableBuilder {
    /// Give `tool` to `role`
    pub fn assign(mut self, role: impl Into<String>, tool: Arc<dyn Tool>) -> Self {
        self.assignments.push((role.into(), tool));
        self
    }

    /// Require a handler for every advertised tool name
    pub fn advertise<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.advertised.extend(names.into_iter().map(Into::into));
        self
    }

    /// Validate against the participant names and build
    pub fn build(self, participants: &[&str]) -> Result<ToolTable, ToolTableError> {
        let mut table = ToolTable::default();

        for (role, tool) in self.assignments {
            let name = tool.name().to_string();
            if let Some(first) = table.owners.get(&name) {
                return Err(ToolTableError::DuplicateTool {
                    tool: name,
                    first: first.clone(),
                    second: role,
                });
            }
            if !participants.contains(&role.as_str()) {
                return Err(ToolTableError::UnknownOwner { tool: name, role });
            }

            debug!(tool = %name, role = %role, "Assigned tool");
            table.owners.insert(name, role.clone());
            table.by_role.entry(role).or_default().push(tool);
        }

        if let Some(missing) = self
            .advertised
            .into_iter()
            .find(|name| !table.owners.contains_key(name))
        {
            return Err(ToolTableError::MissingHandler(missing));
        }

        Ok(table)
    }
}
