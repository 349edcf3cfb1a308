//! Tool trait definition

use crate::ToolResult;
use async_trait::async_trait;
use serde_json::Value;

/// Trait for tools that agents can call
///
/// A tool never fails at the type level: bad parameters and upstream errors
/// are reported inside the returned [`ToolResult`], so a failing call cannot
/// abort the conversation that made it.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute the tool with given parameters
    ///
    /// `params` should match [`Tool::input_schema`]; implementations must
    /// answer malformed input with an error result.
    async fn call(&self, params: Value) -> ToolResult;

    /// Get the tool's name
    ///
    /// Must be unique within a [`ToolTable`](crate::ToolTable) and is the
    /// name the LLM uses to request the tool.
    fn name(&self) -> &str;

    /// Get the tool's description
    fn description(&self) -> &str;

    /// Get the tool's input schema (JSON Schema format)
    ///
    /// # Example
    ///
    /// ```
    /// use serde_json::json;
    ///
    /// let schema = json!({
    ///     "type": "object",
    ///     "properties": {
    ///         "ticker": { "type": "string", "description": "Stock ticker symbol" }
    ///     },
    ///     "required": ["ticker"]
    /// });
    /// assert_eq!(schema["required"][0], "ticker");
    /// ```
    fn input_schema(&self) -> Value;
}

/// Read a required string parameter, trimmed and non-empty
pub fn string_param<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
