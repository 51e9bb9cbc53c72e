//! Indicator computation for quote preparation.
//!
//! Indicators are pure functions: bar history in, numeric series out. The
//! output has the same length as the input and uses NaN where the value is
//! not defined. Multi-series indicators (price channel, super trend) are
//! exposed as one instance per band, each named after the column it fills.

pub mod atr;
pub mod price_channel;
pub mod supertrend;

pub use atr::{true_range, wilder_smooth};
pub use price_channel::{ChannelBand, PriceChannel};
pub use supertrend::{Supertrend, TrendBand};

use crate::config::IndicatorSpec;
use crate::domain::Bar;

/// Trait for indicators.
///
/// # Look-ahead guard
/// No value at bar t may depend on price data from bar t+1 or later.
pub trait Indicator: Send + Sync {
    /// Column name this indicator fills (e.g. "PC_30_HIGH").
    fn name(&self) -> &str;

    /// Number of bars needed before the indicator produces valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// All band indicators described by one validated spec.
pub fn indicators_for(spec: &IndicatorSpec) -> Vec<Box<dyn Indicator>> {
    match *spec {
        IndicatorSpec::PriceChannel { period } => vec![
            Box::new(PriceChannel::new(period, ChannelBand::High)),
            Box::new(PriceChannel::new(period, ChannelBand::Low)),
            Box::new(PriceChannel::new(period, ChannelBand::Mid)),
        ],
        IndicatorSpec::SuperTrend { period, multiplier } => vec![
            Box::new(Supertrend::new(period, multiplier, TrendBand::Upper)),
            Box::new(Supertrend::new(period, multiplier, TrendBand::Lower)),
        ],
    }
}

/// Create synthetic intraday bars from close prices for testing.
///
/// open = prev_close (or close for the first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, one bar per minute.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(7, 0, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar::new(
                base + chrono::Duration::minutes(i as i64),
                open,
                open.max(close) + 1.0,
                open.min(close) - 1.0,
                close,
            )
        })
        .collect()
}

/// Create intraday bars from explicit (open, high, low, close) tuples.
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<Bar> {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(7, 0, 0)
        .unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| {
            Bar::new(
                base + chrono::Duration::minutes(i as i64),
                open,
                high,
                low,
                close,
            )
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
