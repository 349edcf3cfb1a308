//! Trading signal inputs: MACD, signal line and RSI

use super::{STRATEGY_SIGNAL_TOOL, required, run_tool, ticker_schema};
use crate::api::{MarketDataSource, closes};
use crate::error::{Result, StockError};
use crate::indicators::{self, RSI_PERIOD};
use agent_tools::{Metrics, Tool, ToolResult};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// `strategy_signal_tool`: MACD (12, 26, 9) and RSI 14 over six months of daily closes
pub struct StrategySignalTool {
    source: Arc<dyn MarketDataSource>,
}

impl StrategySignalTool {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self { source }
    }

    async fn signals(&self, ticker: &str) -> Result<Metrics> {
        let bars = self.source.history(ticker, "6mo", "1d").await?;
        let closes = closes(&bars);
        let last_close = closes
            .last()
            .copied()
            .ok_or_else(|| StockError::unavailable(ticker, "no price history"))?;

        let macd = indicators::macd(&closes)?;
        let rsi = indicators::latest(&indicators::rsi(&closes, RSI_PERIOD)?);

        let mut metrics = Metrics::new();
        metrics.insert("MACD".into(), Some(required("MACD", macd.macd.last().copied())?.into()));
        metrics.insert(
            "MACD_Signal".into(),
            Some(required("MACD_Signal", macd.signal.last().copied())?.into()),
        );
        metrics.insert("RSI".into(), Some(required("RSI", rsi)?.into()));
        metrics.insert("Last_Close".into(), Some(last_close.into()));
        Ok(metrics)
    }
}

#[async_trait]
impl Tool for StrategySignalTool {
    async fn call(&self, params: Value) -> ToolResult {
        run_tool(STRATEGY_SIGNAL_TOOL, "Strategy signal analysis failed for", &params, |ticker| {
            self.signals(ticker)
        })
        .await
    }

    fn name(&self) -> &str {
        STRATEGY_SIGNAL_TOOL
    }

    fn description(&self) -> &str {
        "Evaluate trading signals using MACD, RSI, and closing price over six months of daily prices"
    }

    fn input_schema(&self) -> Value {
        ticker_schema()
    }
}
