//! Company snapshot with recent closing prices

use super::{FINANCE_DATA_FETCH, number, run_tool};
use crate::api::{MarketDataSource, VALID_PERIODS};
use crate::error::Result;
use agent_llm::tools::schema;
use agent_tools::{MetricValue, Metrics, Tool, ToolResult, string_param};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// History period used when the caller gives none
pub const DEFAULT_PERIOD: &str = "1mo";

/// `finance_data_fetch`: name, price, valuation fields and recent closes
pub struct FinanceDataTool {
    source: Arc<dyn MarketDataSource>,
}

impl FinanceDataTool {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self { source }
    }

    async fn snapshot(&self, ticker: &str, period: &str) -> Result<Metrics> {
        let bars = self.source.history(ticker, period, "1d").await?;
        let info = self.source.info(ticker).await?;

        let closes: BTreeMap<String, f64> = bars
            .iter()
            .map(|bar| (bar.date.format("%Y-%m-%d").to_string(), bar.close))
            .collect();

        let mut metrics = Metrics::new();
        metrics.insert(
            "name".into(),
            Some(info.short_name.unwrap_or_else(|| ticker.to_string()).into()),
        );
        metrics.insert("symbol".into(), Some(ticker.into()));
        metrics.insert("currentPrice".into(), number(info.current_price));
        metrics.insert(
            "currency".into(),
            Some(info.currency.unwrap_or_else(|| "USD".to_string()).into()),
        );
        metrics.insert(
            "summary".into(),
            Some(info.long_business_summary.unwrap_or_default().into()),
        );
        metrics.insert("marketCap".into(), number(info.market_cap));
        metrics.insert("peRatio".into(), number(info.trailing_pe));
        metrics.insert("priceToBook".into(), number(info.price_to_book));
        metrics.insert("dividend".into(), number(info.dividend_rate));
        metrics.insert("recentClosePrices".into(), Some(MetricValue::from(closes)));
        Ok(metrics)
    }
}

#[async_trait]
impl Tool for FinanceDataTool {
    async fn call(&self, params: Value) -> ToolResult {
        let period = string_param(&params, "period").unwrap_or(DEFAULT_PERIOD).to_string();
        run_tool(FINANCE_DATA_FETCH, "Failed to fetch data for", &params, |ticker| {
            self.snapshot(ticker, &period)
        })
        .await
    }

    fn name(&self) -> &str {
        FINANCE_DATA_FETCH
    }

    fn description(&self) -> &str {
        "Fetch recent stock information for a ticker symbol: company name, current price, \
         market cap, P/E, price-to-book, dividend and recent closing prices"
    }

    fn input_schema(&self) -> Value {
        let mut input = super::ticker_schema();
        input["properties"]["period"] =
            schema::string_enum("History period for recent closes", VALID_PERIODS, DEFAULT_PERIOD);
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockMarketDataSource, TickerInfo};
    use crate::tools::fixtures::bars;
    use crate::tools::ticker_param;
    use mockall::predicate::eq;
    use serde_json::json;

    fn info() -> TickerInfo {
        TickerInfo {
            short_name: Some("Microsoft Corporation".into()),
            currency: Some("USD".into()),
            current_price: Some(415.5),
            long_business_summary: Some("Software".into()),
            market_cap: Some(3.1e12),
            trailing_pe: Some(35.2),
            price_to_book: Some(11.8),
            dividend_rate: Some(3.32),
            ..TickerInfo::default()
        }
    }

    #[tokio::test]
    async fn test_snapshot_fields() {
        let mut source = MockMarketDataSource::new();
        source
            .expect_history()
            .with(eq("MSFT"), eq("1mo"), eq("1d"))
            .returning(|_, _, _| Ok(bars(&[410.0, 412.5, 415.5])));
        source.expect_info().returning(|_| Ok(info()));

        let tool = FinanceDataTool::new(Arc::new(source));
        let result = tool.call(json!({"ticker": "MSFT"})).await;

        assert!(!result.is_error());
        assert_eq!(result.metric("name").unwrap().as_str(), Some("Microsoft Corporation"));
        assert_eq!(result.metric("symbol").unwrap().as_str(), Some("MSFT"));
        assert_eq!(result.metric("currentPrice").unwrap().as_f64(), Some(415.5));
        assert_eq!(result.metric("peRatio").unwrap().as_f64(), Some(35.2));
        assert_eq!(result.metric("dividend").unwrap().as_f64(), Some(3.32));

        let json: Value = serde_json::from_str(&result.to_json_string()).unwrap();
        assert_eq!(json["name"], "finance_data_fetch");
        assert_eq!(json["data"]["recentClosePrices"]["2024-01-03"], 415.5);
    }

    #[tokio::test]
    async fn test_fallbacks_for_missing_info() {
        let mut source = MockMarketDataSource::new();
        source
            .expect_history()
            .with(eq("TINY"), eq("5d"), eq("1d"))
            .returning(|_, _, _| Ok(bars(&[1.0])));
        source.expect_info().returning(|_| Ok(TickerInfo::default()));

        let tool = FinanceDataTool::new(Arc::new(source));
        let result = tool.call(json!({"ticker": "TINY", "period": "5d"})).await;

        assert_eq!(result.metric("name").unwrap().as_str(), Some("TINY"));
        assert_eq!(result.metric("currency").unwrap().as_str(), Some("USD"));
        assert_eq!(result.metric("summary").unwrap().as_str(), Some(""));
        assert!(result.metric("marketCap").is_none());
        // missing values are present as null
        assert!(result.metrics().unwrap().contains_key("peRatio"));
    }

    #[tokio::test]
    async fn test_info_failure_after_history() {
        let mut source = MockMarketDataSource::new();
        source.expect_history().returning(|_, _, _| Ok(bars(&[1.0, 2.0])));
        source
            .expect_info()
            .returning(|_| Err(crate::error::StockError::ApiError("HTTP 500".into())));

        let tool = FinanceDataTool::new(Arc::new(source));
        let result = tool.call(json!({"ticker": "AAPL"})).await;
        assert_eq!(
            result.error_message(),
            Some("Failed to fetch data for AAPL: API error: HTTP 500")
        );
    }

    #[test]
    fn test_schema_has_period() {
        let tool = FinanceDataTool::new(Arc::new(MockMarketDataSource::new()));
        let schema = tool.input_schema();
        assert_eq!(schema["properties"]["period"]["default"], "1mo");
        assert_eq!(schema["required"][0], "ticker");
        assert_eq!(ticker_param(&json!({"ticker": "msft"})).unwrap(), "msft");
    }
}
