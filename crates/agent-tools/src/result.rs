//! Typed tool results
//!
//! A [`ToolResult`] carries the tool name and exactly one of a metrics map or
//! an error message. On the wire it is `{"name": .., "data": {..}}` or
//! `{"name": .., "error": ".."}`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One metric value reported by a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// Numeric metric
    Number(f64),
    /// Text metric (names, currencies, ratings)
    Text(String),
    /// Labelled series, e.g. date → close price
    Series(BTreeMap<String, f64>),
}

impl MetricValue {
    /// Numeric value, if this is a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text value, if this is text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<String> for MetricValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<BTreeMap<String, f64>> for MetricValue {
    fn from(value: BTreeMap<String, f64>) -> Self {
        Self::Series(value)
    }
}

/// Flat metric name → value map; `None` serialises as `null`
pub type Metrics = BTreeMap<String, Option<MetricValue>>;

/// Exactly one of data or error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolOutcome {
    /// Successful call
    Data(Metrics),
    /// Failed call, with a human-readable reason
    Error(String),
}

/// Result of one tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Name of the tool that produced the result
    pub name: String,
    /// Data or error
    #[serde(flatten)]
    pub outcome: ToolOutcome,
}

impl ToolResult {
    /// Successful result
    pub fn data(name: impl Into<String>, metrics: Metrics) -> Self {
        Self {
            name: name.into(),
            outcome: ToolOutcome::Data(metrics),
        }
    }

    /// Failed result
    pub fn error(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: ToolOutcome::Error(message.into()),
        }
    }

    /// Whether the call failed
    pub fn is_error(&self) -> bool {
        matches!(self.outcome, ToolOutcome::Error(_))
    }

    /// Error message, if the call failed
    pub fn error_message(&self) -> Option<&str> {
        match &self.outcome {
            ToolOutcome::Error(message) => Some(message),
            ToolOutcome::Data(_) => None,
        }
    }

    /// Metrics, if the call succeeded
    pub fn metrics(&self) -> Option<&Metrics> {
        match &self.outcome {
            ToolOutcome::Data(metrics) => Some(metrics),
            ToolOutcome::Error(_) => None,
        }
    }

    /// A single metric; `None` when absent, null, or the call failed
    pub fn metric(&self, key: &str) -> Option<&MetricValue> {
        self.metrics()?.get(key)?.as_ref()
    }

    /// Serialise for the LLM
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"name":"{}","error":"unserialisable result: {e}"}}"#, self.name)
        })
    }
}
