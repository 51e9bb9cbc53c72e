//! Mutable simulation state carried from one bar to the next.

use serde::{Deserialize, Serialize};

use crate::engine::ledger::TradeLedger;

/// An open long position. Stop and target exist exactly as long as the
/// position does.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub entry_bar: usize,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    /// `None` while flat. No shorts, no pyramiding.
    pub position: Option<OpenPosition>,
    pub ledger: TradeLedger,
    /// Bars that passed the session gate.
    pub active_bars: usize,
    pub trades_opened: usize,
    pub trades_closed: usize,
}

impl SimulationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_flat(&self) -> bool {
        self.position.is_none()
    }

    /// 0 when flat, 1 when long.
    pub fn position_flag(&self) -> u8 {
        u8::from(self.position.is_some())
    }
}
