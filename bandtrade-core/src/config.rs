//! Typed strategy configuration.
//!
//! Indicator entries arrive loosely typed (`type`, optional `period`,
//! optional `multiplier`) so that a missing key can be reported precisely,
//! then get validated into [`IndicatorSpec`]. Session times and the
//! commission rate form the [`EngineConfig`] handed to the simulation.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One entry of the configured indicator list, as written by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<f64>,
}

impl IndicatorConfig {
    pub fn price_channel(period: usize) -> Self {
        Self {
            kind: "price_channel".into(),
            period: Some(period),
            multiplier: None,
        }
    }

    pub fn super_trend(period: usize, multiplier: f64) -> Self {
        Self {
            kind: "super_trend".into(),
            period: Some(period),
            multiplier: Some(multiplier),
        }
    }
}

/// A validated indicator description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IndicatorSpec {
    /// Highest high / lowest low / midpoint over `period` bars.
    PriceChannel { period: usize },
    /// ATR-based trailing trend bands.
    SuperTrend { period: usize, multiplier: f64 },
}

impl IndicatorSpec {
    /// Validate the `index`-th configured indicator.
    pub fn from_config(index: usize, config: &IndicatorConfig) -> Result<Self, ConfigError> {
        let spec = match config.kind.as_str() {
            "price_channel" | "price_chanel" => IndicatorSpec::PriceChannel {
                period: require(index, config, "period", config.period)?,
            },
            "super_trend" | "supertrend" => IndicatorSpec::SuperTrend {
                period: require(index, config, "period", config.period)?,
                multiplier: require(index, config, "multiplier", config.multiplier)?,
            },
            other => return Err(ConfigError::UnsupportedIndicator(other.to_string())),
        };
        spec.validate(index)?;
        Ok(spec)
    }

    /// Check parameter ranges. Periods must be at least 1, multipliers finite and positive.
    pub fn validate(&self, index: usize) -> Result<(), ConfigError> {
        let period = match *self {
            IndicatorSpec::PriceChannel { period } => period,
            IndicatorSpec::SuperTrend { period, multiplier } => {
                if !multiplier.is_finite() || multiplier <= 0.0 {
                    return Err(ConfigError::InvalidParameter {
                        index,
                        key: "multiplier",
                        value: multiplier.to_string(),
                    });
                }
                period
            }
        };
        if period == 0 {
            return Err(ConfigError::InvalidParameter {
                index,
                key: "period",
                value: period.to_string(),
            });
        }
        Ok(())
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            IndicatorSpec::PriceChannel { .. } => "price channel",
            IndicatorSpec::SuperTrend { .. } => "super trend",
        }
    }
}

fn require<T>(
    index: usize,
    config: &IndicatorConfig,
    key: &'static str,
    value: Option<T>,
) -> Result<T, ConfigError> {
    value.ok_or_else(|| ConfigError::MissingKey {
        index,
        kind: config.kind.clone(),
        key,
    })
}

/// Validate a whole indicator list, stopping at the first bad entry.
pub fn parse_indicators(configs: &[IndicatorConfig]) -> Result<Vec<IndicatorSpec>, ConfigError> {
    configs
        .iter()
        .enumerate()
        .map(|(i, c)| IndicatorSpec::from_config(i, c))
        .collect()
}

/// Intraday trading window.
///
/// - Bars before `open` are ignored entirely.
/// - New entries are only taken strictly before `close`.
/// - An open position is flattened on the bar stamped exactly `force_close`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionWindow {
    #[serde(with = "hhmm")]
    pub open: NaiveTime,
    #[serde(with = "hhmm")]
    pub close: NaiveTime,
    #[serde(with = "hhmm")]
    pub force_close: NaiveTime,
}

impl SessionWindow {
    pub fn new(open: NaiveTime, close: NaiveTime, force_close: NaiveTime) -> Self {
        Self {
            open,
            close,
            force_close,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.open < self.close && self.close <= self.force_close {
            Ok(())
        } else {
            Err(ConfigError::InvalidSession {
                open: self.open,
                close: self.close,
                force_close: self.force_close,
            })
        }
    }

    /// False for bars before the session opens; such bars are skipped.
    pub fn is_active(&self, time: NaiveTime) -> bool {
        time >= self.open
    }

    pub fn accepts_entries(&self, time: NaiveTime) -> bool {
        time < self.close
    }

    pub fn is_force_close(&self, time: NaiveTime) -> bool {
        time == self.force_close
    }
}

impl Default for SessionWindow {
    fn default() -> Self {
        Self {
            open: hms(7, 0),
            close: hms(23, 0),
            force_close: hms(23, 40),
        }
    }
}

fn hms(hour: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, min, 0).unwrap_or(NaiveTime::MIN)
}

/// Everything the simulation engine needs besides the bars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Fraction of the traded price charged on every entry and exit.
    pub commission_rate: f64,
    pub session: SessionWindow,
}

impl EngineConfig {
    pub const DEFAULT_COMMISSION_RATE: f64 = 0.0005;

    pub fn new(commission_rate: f64, session: SessionWindow) -> Self {
        Self {
            commission_rate,
            session,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..1.0).contains(&self.commission_rate) {
            return Err(ConfigError::InvalidCommission(self.commission_rate));
        }
        self.session.validate()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_COMMISSION_RATE, SessionWindow::default())
    }
}

/// Parse `HH:MM` or `HH:MM:SS`.
pub fn parse_time(raw: &str) -> Result<NaiveTime, chrono::ParseError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S").or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
}

/// Serde adapter for time-of-day literals such as `"07:00"`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M:%S").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw)
            .map_err(|e| serde::de::Error::custom(format!("invalid time '{raw}': {e}")))
    }
}
