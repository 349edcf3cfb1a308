//! Yahoo Finance API client

use super::{MarketDataSource, PriceBar, TickerInfo, VALID_PERIODS};
use crate::error::{Result, StockError};
use async_trait::async_trait;
use chrono::DateTime;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use yahoo_finance_api as yahoo;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URL: &str = "https://query1.finance.yahoo.com/v1/test/getcrumb";
const SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";
const SUMMARY_MODULES: &str = "price,summaryDetail,defaultKeyStatistics,financialData,assetProfile";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Yahoo Finance API client
///
/// Price history goes through `yahoo_finance_api`; ticker info comes from
/// the `quoteSummary` endpoint, which needs a session cookie and crumb.
/// Every upstream request waits on a shared rate limiter.
pub struct YahooFinanceClient {
    connector: yahoo::YahooConnector,
    http: Client,
    crumb: Mutex<Option<String>>,
    rate_limiter: SharedRateLimiter,
}

impl YahooFinanceClient {
    /// Create a client allowing `requests_per_minute` upstream calls
    pub fn new(requests_per_minute: u32, timeout: Duration) -> Result<Self> {
        let connector = yahoo::YahooConnector::new()?;
        let http = Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        let rate = NonZeroU32::new(requests_per_minute)
            .ok_or_else(|| StockError::ConfigError("requests_per_minute must be greater than 0".to_string()))?;
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(rate)));

        Ok(Self {
            connector,
            http,
            crumb: Mutex::new(None),
            rate_limiter,
        })
    }

    /// Create a client from the desk configuration
    pub fn from_config(config: &crate::config::StockConfig) -> Result<Self> {
        Self::new(config.requests_per_minute, config.request_timeout)
    }

    async fn crumb(&self) -> Result<String> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        // only the cookie matters; this endpoint answers 404
        self.rate_limiter.until_ready().await;
        let _ = self.http.get(COOKIE_URL).send().await?;

        self.rate_limiter.until_ready().await;
        let crumb = self.http.get(CRUMB_URL).send().await?.text().await?;
        let crumb = crumb.trim().to_string();
        if crumb.is_empty() || crumb.contains('<') || crumb.contains(' ') {
            return Err(StockError::ApiError("Yahoo Finance did not issue a crumb".to_string()));
        }

        debug!("Obtained Yahoo Finance crumb");
        *cached = Some(crumb.clone());
        Ok(crumb)
    }
}

#[async_trait]
impl MarketDataSource for YahooFinanceClient {
    async fn history(&self, ticker: &str, period: &str, interval: &str) -> Result<Vec<PriceBar>> {
        if !VALID_PERIODS.contains(&period) {
            return Err(StockError::Other(format!(
                "Invalid period '{period}', expected one of {}",
                VALID_PERIODS.join(", ")
            )));
        }

        self.rate_limiter.until_ready().await;
        debug!(ticker, period, interval, "Fetching price history");

        let response = self.connector.get_quote_range(ticker, interval, period).await?;
        let quotes = response
            .quotes()
            .map_err(|e| StockError::unavailable(ticker, e.to_string()))?;

        let mut bars: Vec<PriceBar> = quotes
            .iter()
            .filter(|q| q.close.is_finite())
            .filter_map(|q| {
                let date = DateTime::from_timestamp(q.timestamp as i64, 0)?.date_naive();
                Some(PriceBar {
                    date,
                    open: q.open,
                    high: q.high,
                    low: q.low,
                    close: q.close,
                    volume: q.volume,
                })
            })
            .collect();
        bars.sort_by_key(|b| b.date);

        if bars.is_empty() {
            return Err(StockError::unavailable(ticker, "no price history"));
        }
        Ok(bars)
    }

    async fn info(&self, ticker: &str) -> Result<TickerInfo> {
        let crumb = self.crumb().await?;

        self.rate_limiter.until_ready().await;
        debug!(ticker, "Fetching ticker info");

        let url = format!("{SUMMARY_URL}/{ticker}");
        let response = self
            .http
            .get(&url)
            .query(&[("modules", SUMMARY_MODULES), ("crumb", crumb.as_str())])
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(ticker, "Yahoo Finance rejected the crumb, renewing on next call");
            *self.crumb.lock().await = None;
            return Err(StockError::ApiError("Yahoo Finance session expired".to_string()));
        }

        let body = response.text().await?;
        parse_quote_summary(ticker, &body)
    }
}

#[derive(Debug, Deserialize)]
struct SummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    result: Option<Vec<SummaryModules>>,
    error: Option<SummaryError>,
}

#[derive(Debug, Deserialize)]
struct SummaryError {
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryModules {
    price: Option<PriceModule>,
    summary_detail: Option<SummaryDetail>,
    default_key_statistics: Option<KeyStatistics>,
    financial_data: Option<FinancialData>,
    asset_profile: Option<AssetProfile>,
}

/// `{"raw": 1.23, "fmt": "1.23"}`, or `{}` when Yahoo has no value
#[derive(Debug, Default, Deserialize)]
struct Raw {
    raw: Option<f64>,
}

fn raw(value: Option<&Raw>) -> Option<f64> {
    value.and_then(|v| v.raw).filter(|v| v.is_finite())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    short_name: Option<String>,
    currency: Option<String>,
    regular_market_price: Option<Raw>,
    market_cap: Option<Raw>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetail {
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<Raw>,
    dividend_rate: Option<Raw>,
    dividend_yield: Option<Raw>,
    beta: Option<Raw>,
    market_cap: Option<Raw>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyStatistics {
    price_to_book: Option<Raw>,
    #[serde(rename = "52WeekChange")]
    fifty_two_week_change: Option<Raw>,
    beta: Option<Raw>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinancialData {
    current_price: Option<Raw>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetProfile {
    long_business_summary: Option<String>,
}

fn parse_quote_summary(ticker: &str, body: &str) -> Result<TickerInfo> {
    let envelope: SummaryEnvelope = serde_json::from_str(body)?;
    let summary = envelope.quote_summary;

    if let Some(error) = summary.error {
        let reason = error.description.unwrap_or_else(|| "quote summary error".to_string());
        return Err(StockError::unavailable(ticker, reason));
    }

    let modules = summary
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| StockError::unavailable(ticker, "no quote summary"))?;

    let price = modules.price;
    let detail = modules.summary_detail;
    let stats = modules.default_key_statistics;

    Ok(TickerInfo {
        short_name: price.as_ref().and_then(|p| p.short_name.clone()),
        currency: price.as_ref().and_then(|p| p.currency.clone()),
        current_price: raw(modules.financial_data.as_ref().and_then(|f| f.current_price.as_ref()))
            .or_else(|| raw(price.as_ref().and_then(|p| p.regular_market_price.as_ref()))),
        long_business_summary: modules.asset_profile.and_then(|a| a.long_business_summary),
        market_cap: raw(detail.as_ref().and_then(|d| d.market_cap.as_ref()))
            .or_else(|| raw(price.as_ref().and_then(|p| p.market_cap.as_ref()))),
        trailing_pe: raw(detail.as_ref().and_then(|d| d.trailing_pe.as_ref())),
        price_to_book: raw(stats.as_ref().and_then(|s| s.price_to_book.as_ref())),
        dividend_rate: raw(detail.as_ref().and_then(|d| d.dividend_rate.as_ref())),
        dividend_yield: raw(detail.as_ref().and_then(|d| d.dividend_yield.as_ref())),
        beta: raw(detail.as_ref().and_then(|d| d.beta.as_ref()))
            .or_else(|| raw(stats.as_ref().and_then(|s| s.beta.as_ref()))),
        fifty_two_week_change: raw(stats.as_ref().and_then(|s| s.fifty_two_week_change.as_ref())),
    })
}
