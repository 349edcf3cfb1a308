//! Sidebar quick view: four headline metrics for a ticker

use crate::api::MarketDataSource;
use tracing::warn;

/// Display pairs for `ticker`, in display order
///
/// Missing or zero values read `N/A`. A failed lookup yields a single
/// `Error` pair instead.
pub async fn quick_metrics(source: &dyn MarketDataSource, ticker: &str) -> Vec<(String, String)> {
    let ticker = ticker.trim().to_uppercase();
    match source.info(&ticker).await {
        Ok(info) => vec![
            ("Current Price".to_string(), display(info.current_price, |v| format!("${v:.2}"))),
            ("Market Cap".to_string(), display(info.market_cap, |v| format!("${:.2}B", v / 1e9))),
            ("P/E Ratio".to_string(), display(info.trailing_pe, |v| format!("{v:.2}"))),
            ("Beta".to_string(), display(info.beta, |v| format!("{v:.2}"))),
        ],
        Err(e) => {
            warn!(ticker = %ticker, error = %e, "Quick metrics lookup failed");
            vec![("Error".to_string(), format!("Could not fetch metrics: {e}"))]
        }
    }
}

fn display(value: Option<f64>, format: impl Fn(f64) -> String) -> String {
    match value {
        Some(v) if v != 0.0 => format(v),
        _ => "N/A".to_string(),
    }
}
