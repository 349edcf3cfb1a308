//! Technical indicators over close-price series
//!
//! Every function returns one value per input point, `None` where the
//! rolling window is incomplete or the value is undefined.

use crate::error::{Result, StockError};
use ta::Next;
use ta::indicators::{ExponentialMovingAverage, SimpleMovingAverage};

/// Window of the technical SMA
pub const SMA_PERIOD: usize = 20;
/// Span of the technical EMA
pub const EMA_SPAN: usize = 20;
/// RSI window
pub const RSI_PERIOD: usize = 14;
/// MACD fast EMA span
pub const MACD_FAST: usize = 12;
/// MACD slow EMA span
pub const MACD_SLOW: usize = 26;
/// MACD signal EMA span
pub const MACD_SIGNAL: usize = 9;

// rolling sums leave residue below this after a window of zeros
const ZERO_TOLERANCE: f64 = 1e-12;

fn indicator_error(e: impl std::fmt::Display) -> StockError {
    StockError::IndicatorError(e.to_string())
}

/// Rolling mean over `period` points; first value at index `period - 1`
pub fn sma(values: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    let mut indicator = SimpleMovingAverage::new(period).map_err(indicator_error)?;
    Ok(values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let mean = indicator.next(v);
            (i + 1 >= period).then_some(mean)
        })
        .collect())
}

/// Exponential moving average with `alpha = 2 / (span + 1)`, seeded with the
/// first value; defined from index 0
pub fn ema(values: &[f64], span: usize) -> Result<Vec<f64>> {
    let mut indicator = ExponentialMovingAverage::new(span).map_err(indicator_error)?;
    Ok(values.iter().map(|&v| indicator.next(v)).collect())
}

/// Relative strength index from rolling means of gains and losses
///
/// The first delta counts as zero. A window with losses but no gains gives 0,
/// gains but no losses gives 100, and a flat window is undefined.
pub fn rsi(values: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    let mut gains = Vec::with_capacity(values.len());
    let mut losses = Vec::with_capacity(values.len());
    let mut previous: Option<f64> = None;
    for &v in values {
        let delta = previous.map_or(0.0, |p| v - p);
        gains.push(delta.max(0.0));
        losses.push((-delta).max(0.0));
        previous = Some(v);
    }

    let avg_gain = sma(&gains, period)?;
    let avg_loss = sma(&losses, period)?;

    Ok(avg_gain
        .into_iter()
        .zip(avg_loss)
        .map(|(gain, loss)| {
            let gain = gain?;
            let loss = loss?;
            let gain = if gain.abs() < ZERO_TOLERANCE { 0.0 } else { gain };
            let loss = if loss.abs() < ZERO_TOLERANCE { 0.0 } else { loss };
            match (gain > 0.0, loss > 0.0) {
                (false, false) => None,
                (_, false) => Some(100.0),
                _ => Some(100.0 - 100.0 / (1.0 + gain / loss)),
            }
        })
        .collect())
}

/// MACD line and its signal line
#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    /// Fast EMA minus slow EMA
    pub macd: Vec<f64>,
    /// EMA of the MACD line
    pub signal: Vec<f64>,
}

/// MACD (12, 26) with a 9-span signal line
pub fn macd(values: &[f64]) -> Result<Macd> {
    let fast = ema(values, MACD_FAST)?;
    let slow = ema(values, MACD_SLOW)?;
    let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = ema(&macd, MACD_SIGNAL)?;
    Ok(Macd { macd, signal })
}

/// Last defined value of a series
pub fn latest(series: &[Option<f64>]) -> Option<f64> {
    series.iter().rev().find_map(|v| *v)
}
