//! Configuration management utilities
//!
//! Application settings come from the environment and can be overridden
//! field by field (for example from command-line flags).

use crate::LogFormat;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default model id
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// Default web listen address
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";

/// Configuration problems
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// No API key was supplied
    #[error("OpenAI API key is missing (set OPENAI_API_KEY or pass --api-key)")]
    MissingApiKey,

    /// A value could not be parsed
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue {
        /// Variable or flag name
        key: &'static str,
        /// What was wrong
        reason: String,
    },
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OpenAI API key
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// OpenAI-compatible endpoint; `None` uses the public API
    pub base_url: Option<String>,
    /// Model id used by every role
    pub model: String,
    /// Address the web UI listens on
    pub listen_addr: String,
    /// Log output format
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: DEFAULT_MODEL.to_string(),
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Read `OPENAI_API_KEY`, `OPENAI_BASE_URL` (or `OPENAI_API_BASE`),
    /// `OPENAI_MODEL`, `STOCK_ANALYST_ADDR` and `LOG_FORMAT`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] over an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let log_format = match get("LOG_FORMAT") {
            Some(raw) => raw.parse().map_err(|reason| ConfigError::InvalidValue {
                key: "LOG_FORMAT",
                reason,
            })?,
            None => defaults.log_format,
        };

        Ok(Self {
            api_key: get("OPENAI_API_KEY"),
            base_url: get("OPENAI_BASE_URL").or_else(|| get("OPENAI_API_BASE")),
            model: get("OPENAI_MODEL").unwrap_or(defaults.model),
            listen_addr: get("STOCK_ANALYST_ADDR").unwrap_or(defaults.listen_addr),
            log_format,
        })
    }

    /// Replace the API key when `key` is non-blank
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.listen_addr, DEFAULT_LISTEN_ADDR);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn test_environment_values() {
        let config = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-env"),
            ("OPENAI_API_BASE", "http://localhost:1234/v1"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("STOCK_ANALYST_ADDR", "0.0.0.0:9000"),
            ("LOG_FORMAT", "json"),
        ]))
        .unwrap();

        assert_eq!(config.api_key.as_deref(), Some("sk-env"));
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:1234/v1"));
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.listen_addr, "0.0.0.0:9000");
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_api_key_override() {
        let config = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-env")])).unwrap();
        let flagged = config.clone().with_api_key(Some("sk-flag".into()));
        assert_eq!(flagged.api_key.as_deref(), Some("sk-flag"));
        let blank = config.with_api_key(Some("  ".into()));
        assert_eq!(blank.api_key.as_deref(), Some("sk-env"));
    }

    #[test]
    fn test_invalid_log_format() {
        let err = Config::from_lookup(lookup(&[("LOG_FORMAT", "xml")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "LOG_FORMAT", .. }));
    }
}
