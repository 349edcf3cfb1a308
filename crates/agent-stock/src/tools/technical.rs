//! Tool for calculating technical indicators

use super::{TECHNICAL_ANALYSIS_TOOL, required, run_tool, ticker_schema};
use crate::api::{MarketDataSource, closes};
use crate::error::{Result, StockError};
use crate::indicators::{self, EMA_SPAN, RSI_PERIOD, SMA_PERIOD};
use agent_tools::{Metrics, Tool, ToolResult};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// `technical_analysis_tool`: SMA 20, EMA 20 and RSI 14 over three months of daily closes
pub struct TechnicalAnalysisTool {
    source: Arc<dyn MarketDataSource>,
}

impl TechnicalAnalysisTool {
    /// Create a new technical analysis tool
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self { source }
    }

    async fn calculate(&self, ticker: &str) -> Result<Metrics> {
        let bars = self.source.history(ticker, "3mo", "1d").await?;
        let closes = closes(&bars);
        let last_close = closes
            .last()
            .copied()
            .ok_or_else(|| StockError::unavailable(ticker, "no price history"))?;

        let sma = indicators::latest(&indicators::sma(&closes, SMA_PERIOD)?);
        let ema = indicators::ema(&closes, EMA_SPAN)?.last().copied();
        let rsi = indicators::latest(&indicators::rsi(&closes, RSI_PERIOD)?);

        let mut metrics = Metrics::new();
        metrics.insert("SMA_20".into(), Some(required("SMA_20", sma)?.into()));
        metrics.insert("EMA_20".into(), Some(required("EMA_20", ema)?.into()));
        metrics.insert("RSI".into(), Some(required("RSI", rsi)?.into()));
        metrics.insert("Last_Close".into(), Some(last_close.into()));
        Ok(metrics)
    }
}

#[async_trait]
impl Tool for TechnicalAnalysisTool {
    async fn call(&self, params: Value) -> ToolResult {
        run_tool(TECHNICAL_ANALYSIS_TOOL, "Technical analysis failed for", &params, |ticker| {
            self.calculate(ticker)
        })
        .await
    }

    fn name(&self) -> &str {
        TECHNICAL_ANALYSIS_TOOL
    }

    fn description(&self) -> &str {
        "Perform technical analysis using moving averages and RSI: 20-day SMA, 20-day EMA, \
         14-day RSI and the last close over three months of daily prices"
    }

    fn input_schema(&self) -> Value {
        ticker_schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockMarketDataSource;
    use crate::tools::fixtures::bars;
    use mockall::predicate::eq;
    use serde_json::json;

    fn tool_with(closes: Vec<f64>) -> TechnicalAnalysisTool {
        let mut source = MockMarketDataSource::new();
        source
            .expect_history()
            .with(eq("AAPL"), eq("3mo"), eq("1d"))
            .returning(move |_, _, _| Ok(bars(&closes)));
        TechnicalAnalysisTool::new(Arc::new(source))
    }

    #[tokio::test]
    async fn test_rising_series() {
        let closes: Vec<f64> = (1..=30).map(f64::from).collect();
        let result = tool_with(closes).call(json!({"ticker": "AAPL"})).await;

        assert!(!result.is_error(), "{:?}", result.error_message());
        // mean of 11..=30
        assert!((result.metric("SMA_20").unwrap().as_f64().unwrap() - 20.5).abs() < 1e-9);
        assert_eq!(result.metric("RSI").unwrap().as_f64(), Some(100.0));
        assert_eq!(result.metric("Last_Close").unwrap().as_f64(), Some(30.0));
        let ema = result.metric("EMA_20").unwrap().as_f64().unwrap();
        assert!(ema > 20.5 && ema < 30.0);
    }

    #[tokio::test]
    async fn test_short_history_is_an_error() {
        let result = tool_with(vec![1.0, 2.0, 3.0]).call(json!({"ticker": "AAPL"})).await;
        let message = result.error_message().unwrap();
        assert!(message.starts_with("Technical analysis failed for AAPL: "));
        assert!(message.contains("SMA_20"));
    }

    #[test]
    fn test_tool_metadata() {
        let tool = TechnicalAnalysisTool::new(Arc::new(MockMarketDataSource::new()));
        assert_eq!(tool.name(), "technical_analysis_tool");
        let schema = tool.input_schema();
        assert_eq!(schema["type"], "object");
    }
}
