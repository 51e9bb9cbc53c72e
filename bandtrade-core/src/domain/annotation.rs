//! Per-bar output of the simulation engine.
//!
//! One canonical annotation scheme: the entry price, one price column per
//! exit kind (stop-time, stop-loss, take-profit), the live trailing levels
//! while a position is open, the commission charged on the bar, realized
//! equity on close bars and the position flag.

use serde::{Deserialize, Serialize};

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExitReason {
    /// Bar high broke through the take-profit level.
    TakeProfit,
    /// Forced close at the bar open: session force-close time, or the trend
    /// band went undefined.
    StopTime,
    /// Bar low broke through the stop-loss level.
    StopLoss,
}

/// Signal kinds as reported in trade statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalKind {
    Buy,
    StopLoss,
    TakeProfit,
    StopTime,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Buy => "BUY",
            SignalKind::StopLoss => "STOP_LOSS",
            SignalKind::TakeProfit => "TAKE_PROFIT",
            SignalKind::StopTime => "STOP_TIME",
        }
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ExitReason> for SignalKind {
    fn from(reason: ExitReason) -> Self {
        match reason {
            ExitReason::TakeProfit => SignalKind::TakeProfit,
            ExitReason::StopTime => SignalKind::StopTime,
            ExitReason::StopLoss => SignalKind::StopLoss,
        }
    }
}

/// Fields written by the engine onto one bar. All absent by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub buy_price: Option<f64>,
    pub st_price: Option<f64>,
    pub sl_price: Option<f64>,
    pub tp_price: Option<f64>,
    pub sl_line: Option<f64>,
    pub tp_line: Option<f64>,
    pub commission: Option<f64>,
    pub equity: Option<f64>,
    pub position: Option<u8>,
}

impl Annotation {
    pub fn is_empty(&self) -> bool {
        *self == Annotation::default()
    }

    /// Record an exit at `price` under the column matching `reason`.
    pub fn set_exit(&mut self, reason: ExitReason, price: f64) {
        match reason {
            ExitReason::TakeProfit => self.tp_price = Some(price),
            ExitReason::StopTime => self.st_price = Some(price),
            ExitReason::StopLoss => self.sl_price = Some(price),
        }
    }

    pub fn exit_reason(&self) -> Option<ExitReason> {
        if self.st_price.is_some() {
            Some(ExitReason::StopTime)
        } else if self.sl_price.is_some() {
            Some(ExitReason::StopLoss)
        } else if self.tp_price.is_some() {
            Some(ExitReason::TakeProfit)
        } else {
            None
        }
    }

    /// The exit price regardless of exit kind (single-column view).
    pub fn sell_price(&self) -> Option<f64> {
        self.st_price.or(self.sl_price).or(self.tp_price)
    }

    pub fn signal(&self) -> Option<SignalKind> {
        match self.exit_reason() {
            Some(reason) => Some(reason.into()),
            None => self.buy_price.map(|_| SignalKind::Buy),
        }
    }
}
