//! TradeRecord: one completed round trip.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::ExitReason;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub entry_bar: usize,
    pub entry_date: NaiveDateTime,
    pub entry_price: f64,
    pub entry_commission: f64,
    pub exit_bar: usize,
    pub exit_date: NaiveDateTime,
    pub exit_price: f64,
    pub exit_commission: f64,
    pub exit_reason: ExitReason,
    /// (exit − entry) − (entry commission + exit commission).
    pub net_pnl: f64,
    /// Change in realized equity booked by the ledger on the exit bar.
    pub equity_delta: f64,
    /// Realized equity after this trade.
    pub equity_after: f64,
    /// Number of bars from entry to exit.
    pub bars_held: usize,
}

impl TradeRecord {
    pub fn is_profitable(&self) -> bool {
        self.net_pnl > 0.0
    }
}
