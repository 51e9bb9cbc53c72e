//! Backtest runner: wires together loading, preparation, simulation and summary.
//!
//! Two entry points:
//! - `run_backtest()`: loads the quote file named by the config, then runs. Used by the CLI.
//! - `run_backtest_on()`: takes an already loaded table. Used by the sweep.

use anyhow::{Context, Result};
use bandtrade_core::data::{prepare_quotes, QuoteTable};
use bandtrade_core::domain::{BarSeries, TradeRecord};
use bandtrade_core::engine::simulate;
use bandtrade_core::SimulationRun;

use crate::config::{BacktestConfig, RunId};
use crate::data_loader::{dataset_hash, load_quotes};
use crate::report::PerformanceSummary;

/// Complete result of a single backtest run.
#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub run_id: RunId,
    pub dataset_hash: String,
    pub config: BacktestConfig,
    /// Quote table the series was built from (with indicator columns).
    pub table: QuoteTable,
    pub series: BarSeries,
    pub run: SimulationRun,
    pub trades: Vec<TradeRecord>,
    pub summary: PerformanceSummary,
}

impl BacktestResult {
    pub fn final_balance(&self) -> f64 {
        self.summary.final_balance
    }
}

/// Load the configured quote file and run one backtest.
pub fn run_backtest(config: &BacktestConfig) -> Result<BacktestResult> {
    let raw = load_quotes(&config.data)
        .with_context(|| format!("failed to load quotes from {}", config.data.display()))?;
    let hash = dataset_hash(&raw);
    run_backtest_on(config, &raw, &hash)
}

/// Compute the configured indicator columns on `raw`, or take it as is
/// when `prepare` is off.
pub fn prepare_table(config: &BacktestConfig, raw: &QuoteTable) -> Result<QuoteTable> {
    if !config.prepare {
        return Ok(raw.clone());
    }
    let specs = config.indicator_specs().context("invalid indicator configuration")?;
    prepare_quotes(raw, &specs).context("failed to prepare quotes")
}

/// Run a backtest on already loaded quotes: no I/O.
pub fn run_backtest_on(
    config: &BacktestConfig,
    raw: &QuoteTable,
    dataset_hash: &str,
) -> Result<BacktestResult> {
    let run_id = config.run_id()?;
    let columns = config.columns().context("invalid indicator configuration")?;
    let table = prepare_table(config, raw)?;

    let series = BarSeries::from_table(&table, &columns).context("quotes cannot be simulated")?;
    let run = simulate(&series, &config.engine_config()).context("invalid engine configuration")?;
    let trades = run.trades(&series);
    let summary = PerformanceSummary::compute(&series, &run.annotations, &trades);

    tracing::info!(
        run_id = %run_id,
        bars = series.len(),
        trades = trades.len(),
        final_balance = summary.final_balance,
        "backtest complete"
    );

    Ok(BacktestResult {
        run_id,
        dataset_hash: dataset_hash.to_string(),
        config: config.clone(),
        table,
        series,
        run,
        trades,
        summary,
    })
}
