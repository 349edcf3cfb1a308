//! Per-run execution context
//!
//! The `Context` travels with one exchange. It carries identifiers used for
//! log correlation and small counters participants keep between their turns.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Well-known context keys
pub mod keys {
    /// Identifier of the analysis run
    pub const RUN_ID: &str = "run_id";
    /// Current round number (1-based)
    pub const ROUND: &str = "round";
    /// Prefix for per-agent counters
    pub const COUNTER_PREFIX: &str = "counter.";
}

/// Context passed to participants during an exchange
///
/// # Example
///
/// ```
/// use agent_core::Context;
///
/// let mut ctx = Context::new().with_run_id("run-123");
/// ctx.set_round(2);
///
/// assert_eq!(ctx.run_id(), Some("run-123"));
/// assert_eq!(ctx.round(), 2);
/// assert_eq!(ctx.increment("supervisor.auto_reply"), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    data: HashMap<String, serde_json::Value>,
}

impl Context {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the run identifier
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.insert(keys::RUN_ID, serde_json::json!(run_id.into()));
        self
    }

    /// Get the run identifier
    pub fn run_id(&self) -> Option<&str> {
        self.get(keys::RUN_ID).and_then(|v| v.as_str())
    }

    /// Current round, 0 before the exchange starts
    pub fn round(&self) -> u64 {
        self.get(keys::ROUND).and_then(serde_json::Value::as_u64).unwrap_or(0)
    }

    /// Record the current round
    pub fn set_round(&mut self, round: u64) {
        self.insert(keys::ROUND, serde_json::json!(round));
    }

    /// Read a named counter
    pub fn counter(&self, name: &str) -> u64 {
        self.get(&format!("{}{name}", keys::COUNTER_PREFIX))
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0)
    }

    /// Increment a named counter and return its new value
    pub fn increment(&mut self, name: &str) -> u64 {
        let next = self.counter(name) + 1;
        self.insert(format!("{}{name}", keys::COUNTER_PREFIX), serde_json::json!(next));
        next
    }

    /// Reset a named counter to zero
    pub fn reset(&mut self, name: &str) {
        self.data.remove(&format!("{}{name}", keys::COUNTER_PREFIX));
    }

    /// Insert a value into the context
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// Get a value from the context
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Insert a typed value into the context
    pub fn insert_typed<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> crate::Result<()> {
        let json_value = serde_json::to_value(value).map_err(|e| {
            crate::Error::ProcessingFailed(format!("Failed to serialize context value: {e}"))
        })?;
        self.data.insert(key.into(), json_value);
        Ok(())
    }

    /// Get a typed value from the context
    pub fn get_typed<T: for<'de> Deserialize<'de>>(&self, key: &str) -> crate::Result<Option<T>> {
        self.data
            .get(key)
            .map(|value| {
                serde_json::from_value(value.clone()).map_err(|e| {
                    crate::Error::ProcessingFailed(format!(
                        "Failed to deserialize context value: {e}"
                    ))
                })
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let mut ctx = Context::new();
        assert_eq!(ctx.counter("supervisor"), 0);
        assert_eq!(ctx.increment("supervisor"), 1);
        assert_eq!(ctx.increment("supervisor"), 2);
        assert_eq!(ctx.counter("other"), 0);

        ctx.reset("supervisor");
        assert_eq!(ctx.counter("supervisor"), 0);
    }

    #[test]
    fn test_round() {
        let mut ctx = Context::new();
        assert_eq!(ctx.round(), 0);
        ctx.set_round(9);
        assert_eq!(ctx.round(), 9);
    }

    #[test]
    fn test_typed_roundtrip_and_missing_key() {
        let mut ctx = Context::new();
        ctx.insert_typed("tickers", &vec!["MSFT".to_string()]).unwrap();

        let tickers: Vec<String> = ctx.get_typed("tickers").unwrap().unwrap();
        assert_eq!(tickers, vec!["MSFT".to_string()]);

        let missing: Option<Vec<String>> = ctx.get_typed("missing").unwrap();
        assert!(missing.is_none());
    }
}
