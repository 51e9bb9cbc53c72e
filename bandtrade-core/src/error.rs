//! Error types for configuration and input data.
//!
//! Both kinds fail fast before a simulation starts. The simulation itself
//! never returns an error: a missing trend band on an open position is a
//! business rule (forced close), not a failure.

use chrono::{NaiveDateTime, NaiveTime};
use thiserror::Error;

/// Malformed strategy configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("expected at least two indicators (price channel, super trend), got {0}")]
    TooFewIndicators(usize),

    #[error("unsupported indicator type: {0}")]
    UnsupportedIndicator(String),

    #[error("indicator #{index} ({kind}) is missing required key '{key}'")]
    MissingKey {
        index: usize,
        kind: String,
        key: &'static str,
    },

    #[error("indicator #{index} must be a {expected} indicator, got {found}")]
    UnexpectedIndicator {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("indicator #{index} has invalid {key}: {value}")]
    InvalidParameter {
        index: usize,
        key: &'static str,
        value: String,
    },

    #[error(
        "invalid session window: expected open ({open}) < close ({close}) <= force close ({force_close})"
    )]
    InvalidSession {
        open: NaiveTime,
        close: NaiveTime,
        force_close: NaiveTime,
    },

    #[error("commission rate must be within [0, 1), got {0}")]
    InvalidCommission(f64),
}

/// Input data that cannot be simulated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("column '{column}' has no value at row {row}")]
    MissingValue { column: String, row: usize },

    #[error("column '{column}' has a non-positive price {value} at row {row}")]
    NonPositivePrice {
        column: String,
        row: usize,
        value: f64,
    },

    #[error("dates must be non-decreasing: row {row} ({date}) is earlier than the row before it")]
    UnorderedDates { row: usize, date: NaiveDateTime },

    #[error("column '{column}' has {found} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },
}

/// Any error raised by the core crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Data(#[from] DataError),
}
