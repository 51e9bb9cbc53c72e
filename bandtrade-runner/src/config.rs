//! Serializable backtest configuration, read from TOML.
//!
//! ```toml
//! data = "quotes.csv"
//! prepare = true
//! commission_rate = 0.0005
//!
//! [session]
//! open = "07:00"
//! close = "23:00"
//! force_close = "23:40"
//!
//! [[indicators]]
//! type = "price_channel"
//! period = 30
//!
//! [[indicators]]
//! type = "super_trend"
//! period = 7
//! multiplier = 3
//! ```

use std::path::{Path, PathBuf};

use bandtrade_core::config::parse_indicators;
use bandtrade_core::{
    ConfigError, EngineConfig, IndicatorColumns, IndicatorConfig, IndicatorSpec, SessionWindow,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

/// Errors from reading or validating a run configuration.
#[derive(Debug, Error)]
pub enum RunConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Everything needed to reproduce one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Quote CSV. Relative paths are resolved against the config file.
    pub data: PathBuf,

    /// Compute indicator columns before simulating. When false the quote
    /// file must already carry them.
    #[serde(default = "default_prepare")]
    pub prepare: bool,

    #[serde(default = "default_commission_rate")]
    pub commission_rate: f64,

    #[serde(default)]
    pub session: SessionWindow,

    pub indicators: Vec<IndicatorConfig>,
}

fn default_prepare() -> bool {
    true
}

fn default_commission_rate() -> f64 {
    EngineConfig::DEFAULT_COMMISSION_RATE
}

impl BacktestConfig {
    /// Config with default session and commission over the two standard indicators.
    pub fn new(data: impl Into<PathBuf>, pc_period: usize, st_period: usize, multiplier: f64) -> Self {
        Self {
            data: data.into(),
            prepare: true,
            commission_rate: EngineConfig::DEFAULT_COMMISSION_RATE,
            session: SessionWindow::default(),
            indicators: vec![
                IndicatorConfig::price_channel(pc_period),
                IndicatorConfig::super_trend(st_period, multiplier),
            ],
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, RunConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file. A relative `data` path is taken relative to the
    /// file's directory.
    pub fn from_file(path: &Path) -> Result<Self, RunConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| RunConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&content)?;
        if config.data.is_relative() {
            if let Some(dir) = path.parent() {
                config.data = dir.join(&config.data);
            }
        }
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Check indicators, session and commission without running anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine_config().validate()?;
        IndicatorColumns::from_specs(&self.indicator_specs()?)?;
        Ok(())
    }

    pub fn indicator_specs(&self) -> Result<Vec<IndicatorSpec>, ConfigError> {
        parse_indicators(&self.indicators)
    }

    pub fn columns(&self) -> Result<IndicatorColumns, ConfigError> {
        IndicatorColumns::resolve(&self.indicators)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new(self.commission_rate, self.session)
    }

    /// Copy of this config with the channel and trend parameters replaced.
    /// Indicators past the first two are kept as they are.
    pub fn with_params(&self, pc_period: usize, st_period: usize, multiplier: f64) -> Self {
        let mut config = self.clone();
        let tail = config.indicators.iter().skip(2).cloned();
        config.indicators = [
            IndicatorConfig::price_channel(pc_period),
            IndicatorConfig::super_trend(st_period, multiplier),
        ]
        .into_iter()
        .chain(tail)
        .collect();
        config
    }

    /// Deterministic hash of the configuration.
    ///
    /// Two runs with identical configs share the same id.
    pub fn run_id(&self) -> Result<RunId, RunConfigError> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    const FULL: &str = r#"
data = "quotes.csv"
prepare = false
commission_rate = 0.001

[session]
open = "08:00"
close = "16:30"
force_close = "17:00:00"

[[indicators]]
type = "price_chanel"
period = 30

[[indicators]]
type = "super_trend"
period = 7
multiplier = 3
"#;

    #[test]
    fn parses_full_document() {
        let config = BacktestConfig::from_toml(FULL).unwrap();
        assert_eq!(config.data, PathBuf::from("quotes.csv"));
        assert!(!config.prepare);
        assert_eq!(config.commission_rate, 0.001);
        assert_eq!(config.session.open, NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(config.session.force_close, NaiveTime::from_hms_opt(17, 0, 0).unwrap());

        let columns = config.columns().unwrap();
        assert_eq!(columns.pc_high, "PC_30_HIGH");
        assert_eq!(columns.st_lower, "ST_LOWER_7_3");
    }

    #[test]
    fn defaults_apply() {
        let config = BacktestConfig::from_toml(
            r#"
data = "q.csv"
indicators = [
    { type = "price_channel", period = 10 },
    { type = "supertrend", period = 5, multiplier = 2.5 },
]
"#,
        )
        .unwrap();
        assert!(config.prepare);
        assert_eq!(config.commission_rate, 0.0005);
        assert_eq!(config.session, SessionWindow::default());
    }

    #[test]
    fn missing_multiplier_is_rejected() {
        let err = BacktestConfig::from_toml(
            r#"
data = "q.csv"
[[indicators]]
type = "price_channel"
period = 10
[[indicators]]
type = "super_trend"
period = 5
"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RunConfigError::Config(ConfigError::MissingKey { index: 1, key: "multiplier", .. })
        ));
    }

    #[test]
    fn single_indicator_is_rejected() {
        let err = BacktestConfig::from_toml(
            r#"
data = "q.csv"
[[indicators]]
type = "price_channel"
period = 10
"#,
        )
        .unwrap_err();
        assert!(matches!(err, RunConfigError::Config(ConfigError::TooFewIndicators(1))));
    }

    #[test]
    fn bad_session_is_rejected() {
        let mut config = BacktestConfig::new("q.csv", 30, 7, 3.0);
        config.session.close = config.session.open;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidSession { .. })));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = BacktestConfig::from_toml("data = ").unwrap_err();
        assert!(matches!(err, RunConfigError::Parse(_)));
    }

    #[test]
    fn run_id_deterministic() {
        let config = BacktestConfig::new("q.csv", 30, 7, 3.0);
        let id1 = config.run_id().unwrap();
        let id2 = config.clone().run_id().unwrap();
        assert_eq!(id1, id2);
        assert_eq!(id1.len(), 64);
    }

    #[test]
    fn run_id_changes_with_params() {
        let config = BacktestConfig::new("q.csv", 30, 7, 3.0);
        let other = config.with_params(20, 7, 3.0);
        assert_ne!(config.run_id().unwrap(), other.run_id().unwrap());
    }

    #[test]
    fn with_params_replaces_leading_indicators() {
        let mut config = BacktestConfig::new("q.csv", 30, 7, 3.0);
        config.indicators.push(IndicatorConfig::price_channel(99));
        let swept = config.with_params(10, 5, 2.0);
        assert_eq!(swept.indicators.len(), 3);
        assert_eq!(swept.indicators[0], IndicatorConfig::price_channel(10));
        assert_eq!(swept.indicators[1], IndicatorConfig::super_trend(5, 2.0));
        assert_eq!(swept.indicators[2], IndicatorConfig::price_channel(99));
    }

    #[test]
    fn toml_round_trip() {
        let config = BacktestConfig::from_toml(FULL).unwrap();
        let text = config.to_toml().unwrap();
        assert_eq!(BacktestConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn from_file_resolves_relative_data_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(&path, FULL).unwrap();
        let config = BacktestConfig::from_file(&path).unwrap();
        assert_eq!(config.data, dir.path().join("quotes.csv"));
    }

    #[test]
    fn from_file_missing_is_io_error() {
        let err = BacktestConfig::from_file(Path::new("/nonexistent/run.toml")).unwrap_err();
        assert!(matches!(err, RunConfigError::Io { .. }));
    }
}
