//! Bar: one OHLC price record, and the band values attached to it.

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// OHLC bar for a fixed intraday interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Bar {
    pub fn new(date: NaiveDateTime, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
        }
    }

    pub fn time(&self) -> NaiveTime {
        self.date.time()
    }

    /// Returns true if any OHLC field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// A bar where nothing traded: open, high, low and close are identical.
    pub fn is_flat(&self) -> bool {
        self.open == self.close && self.open == self.high && self.open == self.low
    }
}

/// Indicator band values on one bar. `None` means the value is not defined
/// (indicator warmup, or a super trend band that is inactive on this bar).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bands {
    pub pc_high: Option<f64>,
    pub pc_low: Option<f64>,
    pub pc_mid: Option<f64>,
    pub st_upper: Option<f64>,
    pub st_lower: Option<f64>,
}

impl Bands {
    /// Set channel high and low; the midpoint follows.
    pub fn with_channel(mut self, high: f64, low: f64) -> Self {
        self.pc_high = Some(high);
        self.pc_low = Some(low);
        self.pc_mid = Some((high + low) / 2.0);
        self
    }

    pub fn with_trend(mut self, upper: Option<f64>, lower: Option<f64>) -> Self {
        self.st_upper = upper;
        self.st_lower = lower;
        self
    }
}

/// Previous bar's band values used for crossing checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LaggedBands {
    pub pc_low: Option<f64>,
    pub pc_high: Option<f64>,
    pub st_lower: Option<f64>,
}

impl From<&Bands> for LaggedBands {
    fn from(bands: &Bands) -> Self {
        Self {
            pc_low: bands.pc_low,
            pc_high: bands.pc_high,
            st_lower: bands.st_lower,
        }
    }
}

/// A bar together with its bands and their lag-1 values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandedBar {
    pub bar: Bar,
    pub bands: Bands,
    /// Filled in by [`BarSeries`](super::BarSeries); all `None` on the first bar.
    pub prev: LaggedBands,
}

impl BandedBar {
    pub fn new(bar: Bar, bands: Bands) -> Self {
        Self {
            bar,
            bands,
            prev: LaggedBands::default(),
        }
    }

    pub fn time(&self) -> NaiveTime {
        self.bar.time()
    }
}

/// Map NaN (pandas-style missing cell) to `None`.
pub fn defined(value: f64) -> Option<f64> {
    (!value.is_nan()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_bar() -> Bar {
        Bar::new(
            NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(7, 5, 0)
                .unwrap(),
            100.0,
            105.0,
            98.0,
            103.0,
        )
    }

    #[test]
    fn traded_bar_is_not_flat() {
        assert!(!sample_bar().is_flat());
        assert!(!sample_bar().is_void());
    }

    #[test]
    fn bar_detects_void() {
        let mut bar = sample_bar();
        bar.open = f64::NAN;
        assert!(bar.is_void());
    }

    #[test]
    fn flat_bar() {
        let bar = Bar::new(sample_bar().date, 50.0, 50.0, 50.0, 50.0);
        assert!(bar.is_flat());
    }

    #[test]
    fn channel_midpoint() {
        let bands = Bands::default().with_channel(110.0, 100.0);
        assert_eq!(bands.pc_mid, Some(105.0));
        assert_eq!(bands.st_lower, None);
    }

    #[test]
    fn nan_is_undefined() {
        assert_eq!(defined(f64::NAN), None);
        assert_eq!(defined(1.5), Some(1.5));
    }

    #[test]
    fn bar_time_of_day() {
        assert_eq!(
            sample_bar().time(),
            NaiveTime::from_hms_opt(7, 5, 0).unwrap()
        );
    }
}
