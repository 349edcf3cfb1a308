//! Configuration for the analysis desk
//!
//! [`ModelSettings`] carries what every role needs to reach the LLM, and
//! [`StockConfig`] adds the conversation limits and market data throttling.

use crate::error::{Result, StockError};
use agent_utils::Config;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-role LLM call timeouts, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleTimeouts {
    /// finance_reporting_analyst
    pub finance: u64,
    /// technical_analyst
    pub technical: u64,
    /// strategy_agent
    pub strategy: u64,
    /// supervisor consolidation
    pub coordinator: u64,
}

impl Default for RoleTimeouts {
    fn default() -> Self {
        Self {
            finance: 280,
            technical: 200,
            strategy: 300,
            coordinator: 280,
        }
    }
}

/// Model parameters shared by every role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Model id
    pub model: String,

    /// OpenAI API key
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// OpenAI-compatible endpoint; `None` uses the public API
    pub base_url: Option<String>,

    /// Sampling temperature
    pub temperature: f32,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Per-role timeouts
    pub timeouts: RoleTimeouts,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: agent_utils::config::DEFAULT_MODEL.to_string(),
            api_key: None,
            base_url: None,
            temperature: 0.5,
            max_tokens: 4096,
            timeouts: RoleTimeouts::default(),
        }
    }
}

/// Configuration for stock analysis operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    /// LLM settings
    pub model: ModelSettings,

    /// Group chat round cap, the opening request included
    pub max_round: usize,

    /// Coordinator auto-reply budget
    pub max_auto_replies: u64,

    /// Tool rounds allowed inside one turn
    pub max_tool_rounds: usize,

    /// Timeout for coordinator code blocks
    pub code_timeout: Duration,

    /// Upstream market data requests per minute
    pub requests_per_minute: u32,

    /// Market data request timeout
    pub request_timeout: Duration,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            model: ModelSettings::default(),
            max_round: 9,
            max_auto_replies: 3,
            max_tool_rounds: 5,
            code_timeout: Duration::from_secs(30),
            requests_per_minute: 60,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl StockConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// Defaults with the model, credential and endpoint taken from `app`
    pub fn from_app_config(app: &Config) -> Self {
        let mut config = Self::default();
        config.model.model.clone_from(&app.model);
        config.model.api_key.clone_from(&app.api_key);
        config.model.base_url.clone_from(&app.base_url);
        config
    }

    /// Replace the API key when `key` is non-blank
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.model.api_key = Some(key);
        }
        self
    }

    /// The API key, or an error when none is configured
    pub fn api_key(&self) -> Result<&str> {
        self.model
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| agent_utils::ConfigError::MissingApiKey.into())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.api_key()?;

        if self.model.model.trim().is_empty() {
            return Err(StockError::ConfigError("model must not be empty".to_string()));
        }

        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(StockError::ConfigError(format!(
                "temperature must be between 0 and 2, got {}",
                self.model.temperature
            )));
        }

        if self.max_round == 0 {
            return Err(StockError::ConfigError("max_round must be at least 1".to_string()));
        }

        if self.requests_per_minute == 0 {
            return Err(StockError::ConfigError(
                "requests_per_minute must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    base: Option<StockConfig>,
    model: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    temperature: Option<f32>,
    timeouts: Option<RoleTimeouts>,
    max_round: Option<usize>,
    max_auto_replies: Option<u64>,
    max_tool_rounds: Option<usize>,
    code_timeout: Option<Duration>,
    requests_per_minute: Option<u32>,
    request_timeout: Option<Duration>,
}

impl StockConfigBuilder {
    /// Start from an existing configuration instead of the defaults
    pub fn base(mut self, config: StockConfig) -> Self {
        self.base = Some(config);
        self
    }

    /// Set the model id
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the OpenAI-compatible endpoint
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the per-role timeouts
    pub fn timeouts(mut self, timeouts: RoleTimeouts) -> Self {
        self.timeouts = Some(timeouts);
        self
    }

    /// Set the round cap
    pub fn max_round(mut self, max_round: usize) -> Self {
        self.max_round = Some(max_round);
        self
    }

    /// Set the coordinator auto-reply budget
    pub fn max_auto_replies(mut self, max: u64) -> Self {
        self.max_auto_replies = Some(max);
        self
    }

    /// Set the tool rounds per turn
    pub fn max_tool_rounds(mut self, max: usize) -> Self {
        self.max_tool_rounds = Some(max);
        self
    }

    /// Set the code block timeout
    pub fn code_timeout(mut self, duration: Duration) -> Self {
        self.code_timeout = Some(duration);
        self
    }

    /// Set the market data request rate
    pub fn requests_per_minute(mut self, rpm: u32) -> Self {
        self.requests_per_minute = Some(rpm);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<StockConfig> {
        let mut config = self.base.unwrap_or_default();

        if let Some(model) = self.model {
            config.model.model = model;
        }
        if let Some(key) = self.api_key {
            config.model.api_key = Some(key);
        }
        if let Some(url) = self.base_url {
            config.model.base_url = Some(url);
        }
        if let Some(temperature) = self.temperature {
            config.model.temperature = temperature;
        }
        if let Some(timeouts) = self.timeouts {
            config.model.timeouts = timeouts;
        }
        config.max_round = self.max_round.unwrap_or(config.max_round);
        config.max_auto_replies = self.max_auto_replies.unwrap_or(config.max_auto_replies);
        config.max_tool_rounds = self.max_tool_rounds.unwrap_or(config.max_tool_rounds);
        config.code_timeout = self.code_timeout.unwrap_or(config.code_timeout);
        config.requests_per_minute = self.requests_per_minute.unwrap_or(config.requests_per_minute);
        config.request_timeout = self.request_timeout.unwrap_or(config.request_timeout);

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StockConfig::default();
        assert_eq!(config.model.model, "gpt-4.1-nano");
        assert!((config.model.temperature - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.model.timeouts.finance, 280);
        assert_eq!(config.model.timeouts.technical, 200);
        assert_eq!(config.model.timeouts.strategy, 300);
        assert_eq!(config.model.timeouts.coordinator, 280);
        assert_eq!(config.max_round, 9);
        assert_eq!(config.max_auto_replies, 3);
        // no key configured
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = StockConfig::builder()
            .api_key("sk-test")
            .model("gpt-4o-mini")
            .max_round(5)
            .request_timeout(Duration::from_secs(60))
            .build()
            .unwrap();

        assert_eq!(config.model.model, "gpt-4o-mini");
        assert_eq!(config.max_round, 5);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.api_key().unwrap(), "sk-test");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(StockConfig::builder().api_key("  ").build().is_err());
        assert!(StockConfig::builder().api_key("k").max_round(0).build().is_err());
        assert!(StockConfig::builder().api_key("k").temperature(3.5).build().is_err());
        assert!(StockConfig::builder().api_key("k").requests_per_minute(0).build().is_err());
    }

    #[test]
    fn test_from_app_config_and_override() {
        let app = Config {
            api_key: Some("sk-env".to_string()),
            base_url: Some("http://localhost:1234/v1".to_string()),
            ..Config::default()
        };
        let config = StockConfig::from_app_config(&app);
        assert_eq!(config.api_key().unwrap(), "sk-env");
        assert_eq!(config.model.base_url.as_deref(), Some("http://localhost:1234/v1"));

        let config = config.with_api_key(Some("sk-form".to_string()));
        assert_eq!(config.api_key().unwrap(), "sk-form");
        let config = config.with_api_key(Some(String::new()));
        assert_eq!(config.api_key().unwrap(), "sk-form");
    }
}
