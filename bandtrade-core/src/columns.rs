//! Indicator column resolver.
//!
//! The engine reads indicator values from named columns. Names are derived
//! from the typed indicator configuration, never parsed back out of column
//! strings:
//!
//! - `PC_{period}_HIGH`, `PC_{period}_LOW`, `PC_{period}_MID`
//! - `ST_UPPER_{period}_{multiplier}`, `ST_LOWER_{period}_{multiplier}`
//!
//! The first configured indicator must be the price channel, the second the
//! super trend. Further entries are allowed and ignored here.

use serde::{Deserialize, Serialize};

use crate::config::{parse_indicators, IndicatorConfig, IndicatorSpec};
use crate::error::ConfigError;

pub const DATE: &str = "DATE";
pub const OPEN: &str = "OPEN";
pub const HIGH: &str = "HIGH";
pub const LOW: &str = "LOW";
pub const CLOSE: &str = "CLOSE";

/// Base price columns every quote table must carry (besides `DATE`).
pub const PRICE_COLUMNS: [&str; 4] = [OPEN, HIGH, LOW, CLOSE];

pub fn channel_high(period: usize) -> String {
    format!("PC_{period}_HIGH")
}

pub fn channel_low(period: usize) -> String {
    format!("PC_{period}_LOW")
}

pub fn channel_mid(period: usize) -> String {
    format!("PC_{period}_MID")
}

pub fn trend_upper(period: usize, multiplier: f64) -> String {
    format!("ST_UPPER_{period}_{multiplier}")
}

pub fn trend_lower(period: usize, multiplier: f64) -> String {
    format!("ST_LOWER_{period}_{multiplier}")
}

/// Name of the one-bar lag of `column`.
pub fn lag(column: &str) -> String {
    format!("prev_{column}")
}

/// The five band columns the engine reads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndicatorColumns {
    pub pc_high: String,
    pub pc_low: String,
    pub pc_mid: String,
    pub st_upper: String,
    pub st_lower: String,
}

impl IndicatorColumns {
    /// Validate raw indicator entries and resolve their column names.
    pub fn resolve(configs: &[IndicatorConfig]) -> Result<Self, ConfigError> {
        if configs.len() < 2 {
            return Err(ConfigError::TooFewIndicators(configs.len()));
        }
        Self::from_specs(&parse_indicators(configs)?)
    }

    pub fn from_specs(specs: &[IndicatorSpec]) -> Result<Self, ConfigError> {
        let (channel, trend) = match specs {
            [channel, trend, ..] => (channel, trend),
            _ => return Err(ConfigError::TooFewIndicators(specs.len())),
        };

        let pc_period = match *channel {
            IndicatorSpec::PriceChannel { period } => period,
            other => {
                return Err(ConfigError::UnexpectedIndicator {
                    index: 0,
                    expected: "price channel",
                    found: other.kind_name(),
                })
            }
        };
        let (st_period, multiplier) = match *trend {
            IndicatorSpec::SuperTrend { period, multiplier } => (period, multiplier),
            other => {
                return Err(ConfigError::UnexpectedIndicator {
                    index: 1,
                    expected: "super trend",
                    found: other.kind_name(),
                })
            }
        };

        Ok(Self {
            pc_high: channel_high(pc_period),
            pc_low: channel_low(pc_period),
            pc_mid: channel_mid(pc_period),
            st_upper: trend_upper(st_period, multiplier),
            st_lower: trend_lower(st_period, multiplier),
        })
    }

    /// All five names in a fixed order: channel high/low/mid, trend upper/lower.
    pub fn names(&self) -> [&str; 5] {
        [
            self.pc_high.as_str(),
            self.pc_low.as_str(),
            self.pc_mid.as_str(),
            self.st_upper.as_str(),
            self.st_lower.as_str(),
        ]
    }

    /// Names of the lag columns the engine derives before simulating.
    pub fn lag_names(&self) -> [String; 3] {
        [lag(&self.pc_low), lag(&self.pc_high), lag(&self.st_lower)]
    }
}
