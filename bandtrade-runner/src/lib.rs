//! BandTrade Runner: backtest orchestration on top of `bandtrade-core`.
//!
//! This crate provides:
//! - TOML run configuration with a content-addressed run id
//! - CSV quote loading into a [`QuoteTable`](bandtrade_core::data::QuoteTable)
//! - Single-run orchestration (prepare, simulate, extract trades, summarize)
//! - CSV and JSON export of the annotated series, trade tape and summary
//! - A parallel parameter sweep over indicator periods and multipliers

pub mod config;
pub mod data_loader;
pub mod export;
pub mod report;
pub mod runner;
pub mod sweep;

pub use config::{BacktestConfig, RunConfigError, RunId};
pub use data_loader::{dataset_hash, load_quotes, read_quotes, LoadError};
pub use export::{export_annotated_csv, export_quotes_csv, export_summary_json, export_trades_csv};
pub use report::PerformanceSummary;
pub use runner::{prepare_table, run_backtest, run_backtest_on, BacktestResult};
pub use sweep::{ParamGrid, ParamSweep, SweepEntry, SweepResults};
