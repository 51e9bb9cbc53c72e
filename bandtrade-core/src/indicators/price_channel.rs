//! Price channel: highest high / lowest low over a lookback window.
//!
//! Produces three series (exposed as separate Indicator instances):
//! - High: max(high[t-period+1..=t])
//! - Low: min(low[t-period+1..=t])
//! - Mid: (High + Low) / 2
//!
//! Lookback: period - 1.

use crate::columns::{channel_high, channel_low, channel_mid};
use crate::domain::Bar;
use crate::indicators::Indicator;

/// Which line of the price channel to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelBand {
    High,
    Low,
    Mid,
}

#[derive(Debug, Clone)]
pub struct PriceChannel {
    period: usize,
    band: ChannelBand,
    name: String,
}

impl PriceChannel {
    pub fn new(period: usize, band: ChannelBand) -> Self {
        assert!(period >= 1, "price channel period must be >= 1");
        let name = match band {
            ChannelBand::High => channel_high(period),
            ChannelBand::Low => channel_low(period),
            ChannelBand::Mid => channel_mid(period),
        };
        Self { period, band, name }
    }

    /// Extremes of one window, or `None` if any bar in it is void.
    fn window_extremes(window: &[Bar]) -> Option<(f64, f64)> {
        let mut high = f64::NEG_INFINITY;
        let mut low = f64::INFINITY;
        for bar in window {
            if bar.high.is_nan() || bar.low.is_nan() {
                return None;
            }
            high = high.max(bar.high);
            low = low.min(bar.low);
        }
        Some((high, low))
    }
}

impl Indicator for PriceChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period {
            return result;
        }

        for (i, window) in bars.windows(self.period).enumerate() {
            let Some((high, low)) = Self::window_extremes(window) else {
                continue;
            };
            result[i + self.period - 1] = match self.band {
                ChannelBand::High => high,
                ChannelBand::Low => low,
                ChannelBand::Mid => (high + low) / 2.0,
            };
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlc_bars, DEFAULT_EPSILON};

    fn sample() -> Vec<Bar> {
        make_ohlc_bars(&[
            (10.0, 12.0, 9.0, 11.0),
            (11.0, 15.0, 10.0, 14.0),
            (14.0, 14.0, 13.0, 13.5),
            (13.5, 16.0, 12.0, 15.0),
            (15.0, 15.5, 14.0, 14.5),
        ])
    }

    #[test]
    fn channel_high_3() {
        let result = PriceChannel::new(3, ChannelBand::High).compute(&sample());
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        // [2] = max(12, 15, 14)
        assert_approx(result[2], 15.0, DEFAULT_EPSILON);
        // [3] = max(15, 14, 16)
        assert_approx(result[3], 16.0, DEFAULT_EPSILON);
        assert_approx(result[4], 16.0, DEFAULT_EPSILON);
    }

    #[test]
    fn channel_low_3() {
        let result = PriceChannel::new(3, ChannelBand::Low).compute(&sample());
        assert!(result[1].is_nan());
        // [2] = min(9, 10, 13)
        assert_approx(result[2], 9.0, DEFAULT_EPSILON);
        assert_approx(result[3], 10.0, DEFAULT_EPSILON);
        assert_approx(result[4], 12.0, DEFAULT_EPSILON);
    }

    #[test]
    fn channel_mid_3() {
        let result = PriceChannel::new(3, ChannelBand::Mid).compute(&sample());
        assert_approx(result[2], 12.0, DEFAULT_EPSILON);
        assert_approx(result[3], 13.0, DEFAULT_EPSILON);
        assert_approx(result[4], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn nan_propagation() {
        let mut bars = sample();
        bars[1].high = f64::NAN;
        bars[1].low = f64::NAN;
        let result = PriceChannel::new(3, ChannelBand::High).compute(&bars);
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
        assert_approx(result[4], 16.0, DEFAULT_EPSILON);
    }

    #[test]
    fn names_and_lookback() {
        let pc = PriceChannel::new(20, ChannelBand::Mid);
        assert_eq!(pc.name(), "PC_20_MID");
        assert_eq!(pc.lookback(), 19);
        assert_eq!(PriceChannel::new(1, ChannelBand::Low).lookback(), 0);
    }

    #[test]
    fn too_few_bars() {
        let result = PriceChannel::new(10, ChannelBand::High).compute(&sample());
        assert!(result.iter().all(|v| v.is_nan()));
    }
}
