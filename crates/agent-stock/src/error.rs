//! Error types for stock analysis operations

use thiserror::Error;

/// Stock analysis specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// API request failed
    #[error("API error: {0}")]
    ApiError(String),

    /// Invalid stock symbol provided
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable {
        symbol: String,
        reason: String,
    },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Technical indicator calculation error
    #[error("Technical indicator error: {0}")]
    IndicatorError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The multi-agent exchange failed
    #[error("{0}")]
    Agent(#[from] agent_core::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl StockError {
    /// Shorthand for [`StockError::DataUnavailable`]
    pub fn unavailable(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;

/// Convert StockError to agent_core::Error
impl From<StockError> for agent_core::Error {
    fn from(err: StockError) -> Self {
        match err {
            StockError::Agent(inner) => inner,
            StockError::ConfigError(msg) => agent_core::Error::InitializationFailed(msg),
            other => agent_core::Error::ProcessingFailed(other.to_string()),
        }
    }
}

impl From<yahoo_finance_api::YahooError> for StockError {
    fn from(err: yahoo_finance_api::YahooError) -> Self {
        StockError::YahooFinanceError(err.to_string())
    }
}

impl From<agent_llm::LLMError> for StockError {
    fn from(err: agent_llm::LLMError) -> Self {
        StockError::ConfigError(err.to_string())
    }
}

impl From<agent_utils::ConfigError> for StockError {
    fn from(err: agent_utils::ConfigError) -> Self {
        StockError::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StockError::InvalidSymbol("INVALID".to_string());
        assert_eq!(err.to_string(), "Invalid symbol: INVALID");

        let err = StockError::unavailable("ZZZZ", "no price history");
        assert_eq!(err.to_string(), "Data not available for ZZZZ: no price history");
    }

    #[test]
    fn test_error_conversion() {
        let stock_err = StockError::ApiError("Test error".to_string());
        let agent_err: agent_core::Error = stock_err.into();

        match agent_err {
            agent_core::Error::ProcessingFailed(msg) => {
                assert!(msg.contains("API error"));
            },
            _ => panic!("Expected ProcessingFailed variant"),
        }
    }

    #[test]
    fn test_agent_error_round_trips_unchanged() {
        let original = agent_core::Error::ProcessingFailed("provider down".to_string());
        let stock_err = StockError::from(original);
        assert_eq!(stock_err.to_string(), "Agent processing failed: provider down");

        let back: agent_core::Error = stock_err.into();
        assert!(matches!(back, agent_core::Error::ProcessingFailed(_)));
    }

    #[test]
    fn test_config_error_maps_to_initialization() {
        let err: agent_core::Error = StockError::from(agent_utils::ConfigError::MissingApiKey).into();
        assert!(matches!(err, agent_core::Error::InitializationFailed(_)));
    }
}
