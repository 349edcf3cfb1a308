//! Market data access
//!
//! The finance tools only see the [`MarketDataSource`] trait; the Yahoo
//! Finance client is the production implementation.

pub mod yahoo;

use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use yahoo::YahooFinanceClient;

/// Periods accepted by [`MarketDataSource::history`]
pub const VALID_PERIODS: &[&str] = &[
    "1d", "5d", "1mo", "3mo", "6mo", "1y", "2y", "5y", "10y", "ytd", "max",
];

/// One daily (or intraday) price bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Descriptive and fundamental fields of a ticker; every field may be absent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickerInfo {
    pub short_name: Option<String>,
    pub currency: Option<String>,
    pub current_price: Option<f64>,
    pub long_business_summary: Option<String>,
    pub market_cap: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub price_to_book: Option<f64>,
    pub dividend_rate: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub beta: Option<f64>,
    pub fifty_two_week_change: Option<f64>,
}

/// Upstream market data
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Price bars for `ticker` over `period` (e.g. `3mo`) at `interval` (e.g. `1d`), oldest first
    ///
    /// An empty history is an error.
    async fn history(&self, ticker: &str, period: &str, interval: &str) -> Result<Vec<PriceBar>>;

    /// Descriptive and fundamental fields for `ticker`
    async fn info(&self, ticker: &str) -> Result<TickerInfo>;
}

/// Close prices of `bars`, oldest first
pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}
