//! Multi-agent stock analysis desk
//!
//! A free-text request ("Should I invest in MSFT based on recent trends?")
//! goes to a desk of four LLM-backed roles talking in a fixed round-robin:
//!
//! - `supervisor` opens the exchange and consolidates the answer
//! - `finance_reporting_analyst` owns `finance_data_fetch`
//! - `technical_analyst` owns `technical_analysis_tool`
//! - `strategy_agent` owns `risk_assessment_tool` and `strategy_signal_tool`
//!
//! The tools read Yahoo Finance through [`api::MarketDataSource`] and never
//! fail: problems come back as `{"error": ...}` records the model can read.
//! The final text is kept in a [`store::ResultStore`] and can be downloaded
//! as a markdown report from the web UI.
//!
//! # Example
//!
//! ```rust,ignore
//! use agent_stock::{StockAnalysisDesk, StockConfig, YahooFinanceClient};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = StockConfig::builder().api_key("sk-...").build()?;
//!     let source = Arc::new(YahooFinanceClient::from_config(&config)?);
//!
//!     let desk = StockAnalysisDesk::new(config, source)?;
//!     println!("{}", desk.analyze("Should I invest in MSFT?").await);
//!     Ok(())
//! }
//! ```

pub mod agents;
pub mod api;
pub mod config;
pub mod desk;
pub mod error;
pub mod indicators;
pub mod prompts;
pub mod report;
pub mod store;
pub mod tools;
pub mod web;

pub use agents::Role;
pub use api::{MarketDataSource, YahooFinanceClient};
pub use config::StockConfig;
pub use desk::StockAnalysisDesk;
pub use error::{Result, StockError};
pub use store::{AnalysisResult, ResultStore};
pub use tools::quick_metrics;
