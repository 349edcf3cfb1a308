//! Risk profile from beta, market cap, dividend yield and 52-week change

use super::{RISK_ASSESSMENT_TOOL, number, run_tool, ticker_schema};
use crate::api::MarketDataSource;
use crate::error::Result;
use agent_tools::{Metrics, Tool, ToolResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Beta assumed for the rating when the ticker reports none
pub const FALLBACK_BETA: f64 = 1.0;

/// Coarse risk bucket derived from beta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskRating {
    High,
    Moderate,
    Low,
}

impl RiskRating {
    /// Above 1.2 is High, above 0.8 Moderate, anything else Low
    pub fn from_beta(beta: Option<f64>) -> Self {
        let beta = beta.unwrap_or(FALLBACK_BETA);
        if beta > 1.2 {
            Self::High
        } else if beta > 0.8 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Moderate => "Moderate",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for RiskRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `risk_assessment_tool`
pub struct RiskAssessmentTool {
    source: Arc<dyn MarketDataSource>,
}

impl RiskAssessmentTool {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self { source }
    }

    async fn assess(&self, ticker: &str) -> Result<Metrics> {
        let info = self.source.info(ticker).await?;

        let mut metrics = Metrics::new();
        metrics.insert("Beta".into(), number(info.beta));
        metrics.insert("MarketCap".into(), number(info.market_cap));
        metrics.insert("DividendYield".into(), number(info.dividend_yield));
        metrics.insert("Volatility".into(), number(info.fifty_two_week_change));
        metrics.insert(
            "RiskRating".into(),
            Some(RiskRating::from_beta(info.beta).as_str().into()),
        );
        Ok(metrics)
    }
}

#[async_trait]
impl Tool for RiskAssessmentTool {
    async fn call(&self, params: Value) -> ToolResult {
        run_tool(RISK_ASSESSMENT_TOOL, "Risk assessment failed for", &params, |ticker| {
            self.assess(ticker)
        })
        .await
    }

    fn name(&self) -> &str {
        RISK_ASSESSMENT_TOOL
    }

    fn description(&self) -> &str {
        "Perform risk evaluation using beta, volatility (52-week change), and dividend yield"
    }

    fn input_schema(&self) -> Value {
        ticker_schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockMarketDataSource, TickerInfo};
    use serde_json::json;

    #[test]
    fn test_rating_thresholds() {
        assert_eq!(RiskRating::from_beta(Some(1.5)), RiskRating::High);
        assert_eq!(RiskRating::from_beta(Some(0.85)), RiskRating::Moderate);
        assert_eq!(RiskRating::from_beta(Some(0.5)), RiskRating::Low);
        // boundaries are exclusive
        assert_eq!(RiskRating::from_beta(Some(1.2)), RiskRating::Moderate);
        assert_eq!(RiskRating::from_beta(Some(0.8)), RiskRating::Low);
        assert_eq!(RiskRating::from_beta(None), RiskRating::Moderate);
    }

    #[tokio::test]
    async fn test_assessment_without_beta() {
        let mut source = MockMarketDataSource::new();
        source.expect_info().returning(|_| {
            Ok(TickerInfo {
                market_cap: Some(5.0e9),
                fifty_two_week_change: Some(-0.3),
                ..TickerInfo::default()
            })
        });

        let tool = RiskAssessmentTool::new(Arc::new(source));
        let result = tool.call(json!({"ticker": "NOBETA"})).await;

        assert!(result.metric("Beta").is_none());
        assert!(result.metrics().unwrap().contains_key("Beta"));
        assert_eq!(result.metric("MarketCap").unwrap().as_f64(), Some(5.0e9));
        assert_eq!(result.metric("Volatility").unwrap().as_f64(), Some(-0.3));
        assert_eq!(result.metric("RiskRating").unwrap().as_str(), Some("Moderate"));
    }

    #[tokio::test]
    async fn test_high_beta() {
        let mut source = MockMarketDataSource::new();
        source.expect_info().returning(|_| {
            Ok(TickerInfo {
                beta: Some(1.5),
                dividend_yield: Some(0.01),
                ..TickerInfo::default()
            })
        });

        let result = RiskAssessmentTool::new(Arc::new(source))
            .call(json!({"ticker": "TSLA"}))
            .await;
        assert_eq!(result.metric("RiskRating").unwrap().as_str(), Some("High"));
        assert_eq!(result.metric("DividendYield").unwrap().as_f64(), Some(0.01));
    }
}
