//! BandTrade Core: domain types, indicator columns, band strategy simulation.
//!
//! This crate contains the heart of the backtester:
//! - Domain types (bars with attached bands, annotations, trade records)
//! - Typed strategy configuration and the indicator column resolver
//! - Price channel and super trend indicator computation
//! - Quote preparation (flat bar removal, indicator columns)
//! - Bar-by-bar simulation engine with its trade ledger
//! - Trade extraction from the annotated series

pub mod columns;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod rounding;

pub use columns::IndicatorColumns;
pub use config::{EngineConfig, IndicatorConfig, IndicatorSpec, SessionWindow};
pub use domain::{Annotation, BandedBar, Bands, Bar, BarSeries, ExitReason, SignalKind, TradeRecord};
pub use engine::{simulate, SimulationRun, SimulationState};
pub use error::{ConfigError, DataError, Error};
