//! Finance tools for the analyst roles
//!
//! Each tool takes `{"ticker": ...}`, reads the market data source and
//! answers with a [`ToolResult`]. Failures never escape a tool: they become
//! an error record naming the ticker.

pub mod finance_data;
pub mod quick;
pub mod risk;
pub mod strategy;
pub mod technical;

pub use finance_data::FinanceDataTool;
pub use quick::quick_metrics;
pub use risk::{RiskAssessmentTool, RiskRating};
pub use strategy::StrategySignalTool;
pub use technical::TechnicalAnalysisTool;

use crate::api::MarketDataSource;
use crate::error::{Result, StockError};
use agent_llm::ToolDefinition;
use agent_llm::tools::schema;
use agent_tools::{MetricValue, Metrics, Tool, ToolResult, string_param};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, warn};

/// Tool names
pub const FINANCE_DATA_FETCH: &str = "finance_data_fetch";
pub const TECHNICAL_ANALYSIS_TOOL: &str = "technical_analysis_tool";
pub const RISK_ASSESSMENT_TOOL: &str = "risk_assessment_tool";
pub const STRATEGY_SIGNAL_TOOL: &str = "strategy_signal_tool";

/// `{"ticker": string}` parameter schema
pub fn ticker_schema() -> Value {
    schema::object(
        json!({ "ticker": schema::string("Stock ticker symbol, e.g. MSFT") }),
        vec!["ticker"],
    )
}

/// Descriptors for the four finance tools
pub fn tool_descriptors(source: &Arc<dyn MarketDataSource>) -> Vec<ToolDefinition> {
    all_tools(source)
        .into_iter()
        .map(|tool| ToolDefinition::new(tool.name(), tool.description(), tool.input_schema()))
        .collect()
}

/// One instance of every finance tool over `source`
pub fn all_tools(source: &Arc<dyn MarketDataSource>) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(FinanceDataTool::new(source.clone())),
        Arc::new(TechnicalAnalysisTool::new(source.clone())),
        Arc::new(RiskAssessmentTool::new(source.clone())),
        Arc::new(StrategySignalTool::new(source.clone())),
    ]
}

/// The required ticker parameter
fn ticker_param(params: &Value) -> Result<&str> {
    string_param(params, "ticker")
        .ok_or_else(|| StockError::InvalidSymbol("missing required parameter 'ticker'".to_string()))
}

/// Run a tool body and turn its outcome into a [`ToolResult`]
///
/// Errors read `"{failure} {ticker}: {error}"`.
async fn run_tool<'a, F, Fut>(name: &str, failure: &str, params: &'a Value, body: F) -> ToolResult
where
    F: FnOnce(&'a str) -> Fut,
    Fut: Future<Output = Result<Metrics>>,
{
    let ticker = match ticker_param(params) {
        Ok(ticker) => ticker,
        Err(e) => {
            warn!(tool = name, error = %e, "Tool called without a ticker");
            return ToolResult::error(name, format!("{failure} unknown: {e}"));
        }
    };

    match body(ticker).await {
        Ok(metrics) => {
            debug!(tool = name, ticker, metrics = metrics.len(), "Tool call succeeded");
            ToolResult::data(name, metrics)
        }
        Err(e) => {
            warn!(tool = name, ticker, error = %e, "Tool call failed");
            ToolResult::error(name, format!("{failure} {ticker}: {e}"))
        }
    }
}

fn number(value: Option<f64>) -> Option<MetricValue> {
    value.map(MetricValue::from)
}

/// Latest value of an indicator, or an error naming it
fn required(name: &str, value: Option<f64>) -> Result<f64> {
    value.ok_or_else(|| StockError::IndicatorError(format!("{name} is undefined for the available history")))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::api::PriceBar;
    use chrono::{Days, NaiveDate};

    /// Daily bars with the given closes, starting 2024-01-01
    pub fn bars(closes: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: start.checked_add_days(Days::new(i as u64)).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1_000,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockMarketDataSource;

    fn no_history_source() -> Arc<dyn MarketDataSource> {
        let mut source = MockMarketDataSource::new();
        source
            .expect_history()
            .returning(|ticker, _, _| Err(StockError::unavailable(ticker, "no price history")));
        source
            .expect_info()
            .returning(|ticker| Err(StockError::unavailable(ticker, "Quote not found")));
        Arc::new(source)
    }

    #[tokio::test]
    async fn test_no_history_ticker_errors_everywhere() {
        let source = no_history_source();
        for tool in all_tools(&source) {
            let result = tool.call(json!({"ticker": "ZZZZ"})).await;
            assert!(result.is_error(), "{} should fail", tool.name());
            assert_eq!(result.name, tool.name());
            assert!(result.error_message().unwrap().contains("ZZZZ"));
        }
    }

    #[tokio::test]
    async fn test_missing_ticker_is_an_error_record() {
        let source = no_history_source();
        for tool in all_tools(&source) {
            let result = tool.call(json!({})).await;
            assert!(result.is_error());
        }
    }

    #[test]
    fn test_descriptors() {
        let source = no_history_source();
        let descriptors = tool_descriptors(&source);
        let names: Vec<&str> = descriptors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec![FINANCE_DATA_FETCH, TECHNICAL_ANALYSIS_TOOL, RISK_ASSESSMENT_TOOL, STRATEGY_SIGNAL_TOOL]
        );
        for descriptor in &descriptors {
            assert_eq!(descriptor.input_schema["type"], "object");
            assert_eq!(descriptor.input_schema["required"][0], "ticker");
            assert!(!descriptor.description.is_empty());
        }
    }
}
