//! Super trend: ATR-based trailing trend bands.
//!
//! Inherently sequential: the final bands ratchet toward price and the
//! direction flips when the close crosses the active band.
//!
//! Output per band:
//! - Lower: the support line, defined only while the trend is up.
//! - Upper: the resistance line, defined only while the trend is down.
//!
//! An undefined lower band is what the simulation treats as a trend gap.

use crate::columns::{trend_lower, trend_upper};
use crate::domain::Bar;
use crate::indicators::atr::{true_range, wilder_smooth};
use crate::indicators::Indicator;

/// Which line of the super trend to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendBand {
    Upper,
    Lower,
}

#[derive(Debug, Clone)]
pub struct Supertrend {
    period: usize,
    multiplier: f64,
    band: TrendBand,
    name: String,
}

/// Final bands and direction on one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TrendState {
    upper: f64,
    lower: f64,
    trending_up: bool,
}

impl Supertrend {
    pub fn new(period: usize, multiplier: f64, band: TrendBand) -> Self {
        assert!(period >= 1, "super trend period must be >= 1");
        let name = match band {
            TrendBand::Upper => trend_upper(period, multiplier),
            TrendBand::Lower => trend_lower(period, multiplier),
        };
        Self {
            period,
            multiplier,
            band,
            name,
        }
    }

    fn states(&self, bars: &[Bar]) -> Vec<Option<TrendState>> {
        let n = bars.len();
        let mut out = vec![None; n];

        let atr = wilder_smooth(&true_range(bars), self.period);

        let Some(start) = atr.iter().position(|v| !v.is_nan()) else {
            return out;
        };

        let hl2 = (bars[start].high + bars[start].low) / 2.0;
        let mut state = TrendState {
            upper: hl2 + self.multiplier * atr[start],
            lower: hl2 - self.multiplier * atr[start],
            trending_up: true,
        };
        out[start] = Some(state);

        for i in (start + 1)..n {
            if atr[i].is_nan() || bars[i].is_void() {
                continue;
            }

            let hl2 = (bars[i].high + bars[i].low) / 2.0;
            let basic_upper = hl2 + self.multiplier * atr[i];
            let basic_lower = hl2 - self.multiplier * atr[i];
            let prev_close = bars[i - 1].close;

            // Upper band only tightens while price stays below it.
            let upper = if !prev_close.is_nan() && prev_close <= state.upper {
                basic_upper.min(state.upper)
            } else {
                basic_upper
            };

            // Lower band only tightens while price stays above it.
            let lower = if !prev_close.is_nan() && prev_close >= state.lower {
                basic_lower.max(state.lower)
            } else {
                basic_lower
            };

            let trending_up = if state.trending_up {
                bars[i].close >= lower
            } else {
                bars[i].close > upper
            };

            state = TrendState {
                upper,
                lower,
                trending_up,
            };
            out[i] = Some(state);
        }

        out
    }
}

impl Indicator for Supertrend {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        self.states(bars)
            .into_iter()
            .map(|state| match (state, self.band) {
                (Some(s), TrendBand::Lower) if s.trending_up => s.lower,
                (Some(s), TrendBand::Upper) if !s.trending_up => s.upper,
                _ => f64::NAN,
            })
            .collect()
    }
}
