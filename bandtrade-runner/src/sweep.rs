//! Parameter sweep over indicator periods and the super trend multiplier.

use anyhow::Result;
use bandtrade_core::data::QuoteTable;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{BacktestConfig, RunId};
use crate::report::PerformanceSummary;
use crate::runner::run_backtest_on;

/// Parameter grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamGrid {
    pub pc_periods: Vec<usize>,
    pub st_periods: Vec<usize>,
    pub st_multipliers: Vec<f64>,
}

impl ParamGrid {
    /// Total number of configurations in this grid.
    pub fn size(&self) -> usize {
        self.pc_periods.len() * self.st_periods.len() * self.st_multipliers.len()
    }

    /// All configurations in the grid, in nested order
    /// (channel period, then trend period, then multiplier).
    ///
    /// Every generated config prepares its own indicator columns.
    pub fn generate_configs(&self, base: &BacktestConfig) -> Vec<BacktestConfig> {
        let mut configs = Vec::with_capacity(self.size());
        for &pc in &self.pc_periods {
            for &st in &self.st_periods {
                for &mult in &self.st_multipliers {
                    let mut config = base.with_params(pc, st, mult);
                    config.prepare = true;
                    configs.push(config);
                }
            }
        }
        configs
    }
}

/// Summary of one sweep point. Full series are not kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepEntry {
    pub run_id: RunId,
    pub pc_period: usize,
    pub st_period: usize,
    pub st_multiplier: f64,
    pub summary: PerformanceSummary,
}

/// Parameter sweep executor.
///
/// Each grid point prepares and simulates independently from the same raw
/// quotes, optionally in parallel.
#[derive(Debug, Clone)]
pub struct ParamSweep {
    parallel: bool,
}

impl Default for ParamSweep {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamSweep {
    pub fn new() -> Self {
        Self { parallel: true }
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run every grid point. Fails on the first invalid combination.
    pub fn sweep(
        &self,
        grid: &ParamGrid,
        base: &BacktestConfig,
        raw: &QuoteTable,
        dataset_hash: &str,
    ) -> Result<SweepResults> {
        let configs = grid.generate_configs(base);
        tracing::info!(points = configs.len(), parallel = self.parallel, "starting sweep");

        let run_one = |config: &BacktestConfig| -> Result<SweepEntry> {
            let result = run_backtest_on(config, raw, dataset_hash)?;
            let (pc_period, st_period, st_multiplier) = sweep_point(config);
            Ok(SweepEntry {
                run_id: result.run_id,
                pc_period,
                st_period,
                st_multiplier,
                summary: result.summary,
            })
        };

        let entries = if self.parallel {
            configs.par_iter().map(run_one).collect::<Result<Vec<_>>>()?
        } else {
            configs.iter().map(run_one).collect::<Result<Vec<_>>>()?
        };

        Ok(SweepResults::new(entries))
    }
}

fn sweep_point(config: &BacktestConfig) -> (usize, usize, f64) {
    let channel = config.indicators.first();
    let trend = config.indicators.get(1);
    (
        channel.and_then(|c| c.period).unwrap_or_default(),
        trend.and_then(|t| t.period).unwrap_or_default(),
        trend.and_then(|t| t.multiplier).unwrap_or_default(),
    )
}

/// Results from a parameter sweep, sorted by final balance (descending).
#[derive(Debug, Clone)]
pub struct SweepResults {
    entries: Vec<SweepEntry>,
}

impl SweepResults {
    fn new(mut entries: Vec<SweepEntry>) -> Self {
        // Stable sort: ties keep grid order.
        entries.sort_by(|a, b| b.summary.final_balance.total_cmp(&a.summary.final_balance));
        Self { entries }
    }

    pub fn all(&self) -> &[SweepEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn best(&self) -> Option<&SweepEntry> {
        self.entries.first()
    }

    pub fn top_n(&self, n: usize) -> &[SweepEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    /// Render the top `n` points as a plain text table.
    pub fn render(&self, n: usize) -> String {
        let mut out = format!(
            "{:>4} {:>6} {:>6} {:>6} {:>7} {:>8} {:>12}\n",
            "rank", "pc", "st", "mult", "trades", "win%", "balance"
        );
        for (rank, e) in self.top_n(n).iter().enumerate() {
            out.push_str(&format!(
                "{:>4} {:>6} {:>6} {:>6} {:>7} {:>8.2} {:>12.2}\n",
                rank + 1,
                e.pc_period,
                e.st_period,
                e.st_multiplier,
                e.summary.trade_count,
                e.summary.win_rate,
                e.summary.final_balance,
            ));
        }
        out
    }
}
