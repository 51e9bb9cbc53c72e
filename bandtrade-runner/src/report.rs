//! Run summary: pure functions over the annotated series and trade list.

use std::fmt::Write as _;

use bandtrade_core::domain::{Annotation, BarSeries, SignalKind, TradeRecord};
use serde::{Deserialize, Serialize};

/// Aggregate statistics for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub bar_count: usize,
    pub buy_signals: usize,
    pub stop_loss_signals: usize,
    pub take_profit_signals: usize,
    pub stop_time_signals: usize,
    pub trade_count: usize,
    pub profitable_trades: usize,
    pub unprofitable_trades: usize,
    /// Percent, 0 when there were no trades.
    pub win_rate: f64,
    /// Last realized equity written on the series, 0 if nothing closed.
    pub final_balance: f64,
    /// One unit bought at the first open and held to the last close.
    pub buy_and_hold: f64,
    pub open_position: bool,
}

impl PerformanceSummary {
    pub fn compute(series: &BarSeries, annotations: &[Annotation], trades: &[TradeRecord]) -> Self {
        let profitable = trades.iter().filter(|t| t.is_profitable()).count();
        Self {
            bar_count: series.len(),
            buy_signals: signal_count(annotations, SignalKind::Buy),
            stop_loss_signals: signal_count(annotations, SignalKind::StopLoss),
            take_profit_signals: signal_count(annotations, SignalKind::TakeProfit),
            stop_time_signals: signal_count(annotations, SignalKind::StopTime),
            trade_count: trades.len(),
            profitable_trades: profitable,
            unprofitable_trades: trades.len() - profitable,
            win_rate: win_rate(trades),
            final_balance: final_balance(annotations),
            buy_and_hold: buy_and_hold(series),
            open_position: open_position(annotations),
        }
    }

    pub fn exit_signals(&self) -> usize {
        self.stop_loss_signals + self.take_profit_signals + self.stop_time_signals
    }

    /// Plain text report.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Backtest Result ===");
        let _ = writeln!(out, "Bars:           {}", self.bar_count);
        let _ = writeln!(out, "Trades:         {}", self.trade_count);
        let _ = writeln!(out);
        let _ = writeln!(out, "--- Signals ---");
        let _ = writeln!(out, "BUY:            {}", self.buy_signals);
        let _ = writeln!(out, "TAKE_PROFIT:    {}", self.take_profit_signals);
        let _ = writeln!(out, "STOP_LOSS:      {}", self.stop_loss_signals);
        let _ = writeln!(out, "STOP_TIME:      {}", self.stop_time_signals);
        let _ = writeln!(out);
        let _ = writeln!(out, "--- Performance ---");
        let _ = writeln!(out, "Profitable:     {}", self.profitable_trades);
        let _ = writeln!(out, "Unprofitable:   {}", self.unprofitable_trades);
        let _ = writeln!(out, "Win Rate:       {:.2}%", self.win_rate);
        let _ = writeln!(out, "Final Balance:  {:.2}", self.final_balance);
        let _ = writeln!(out, "Buy & Hold:     {:.2}", self.buy_and_hold);
        if self.open_position {
            let _ = writeln!(out);
            let _ = writeln!(out, "WARNING: series ended with an open position");
        }
        out
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Bars carrying `kind`.
pub fn signal_count(annotations: &[Annotation], kind: SignalKind) -> usize {
    annotations
        .iter()
        .filter(|a| a.signal() == Some(kind))
        .count()
}

/// Share of trades with positive net P&L, in percent.
pub fn win_rate(trades: &[TradeRecord]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let wins = trades.iter().filter(|t| t.is_profitable()).count();
    wins as f64 / trades.len() as f64 * 100.0
}

pub fn final_balance(annotations: &[Annotation]) -> f64 {
    annotations
        .iter()
        .rev()
        .find_map(|a| a.equity)
        .unwrap_or(0.0)
}

/// Last close minus first open; 0 for an empty series.
pub fn buy_and_hold(series: &BarSeries) -> f64 {
    match (series.bars().first(), series.bars().last()) {
        (Some(first), Some(last)) => last.bar.close - first.bar.open,
        _ => 0.0,
    }
}

/// True when the last position flag written is 1.
fn open_position(annotations: &[Annotation]) -> bool {
    annotations.iter().rev().find_map(|a| a.position) == Some(1)
}
