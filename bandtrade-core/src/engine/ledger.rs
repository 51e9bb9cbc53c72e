//! Trade ledger: cash committed to the open trade and realized equity.

use serde::{Deserialize, Serialize};

use crate::rounding::{round_to, EQUITY_DECIMALS, PRICE_DECIMALS};

/// Result of closing a trade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub commission: f64,
    /// Realized change, rounded to cents.
    pub equity_delta: f64,
    /// Cumulative realized equity after the close.
    pub equity: f64,
}

/// Cash bookkeeping for a single-position strategy.
///
/// - `trade_balance` is nonzero only while a trade is open and is zeroed on
///   every close.
/// - `cumulative_equity` only changes on closes, by
///   `round(trade_balance + exit_price − exit_commission, 2)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeLedger {
    trade_balance: f64,
    cumulative_equity: f64,
}

impl TradeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commission on one side of a trade, rounded to cents.
    pub fn commission(price: f64, commission_rate: f64) -> f64 {
        round_to(price * commission_rate, PRICE_DECIMALS)
    }

    /// Book an entry. Returns the commission charged.
    pub fn open(&mut self, entry_price: f64, commission_rate: f64) -> f64 {
        let commission = Self::commission(entry_price, commission_rate);
        self.trade_balance -= entry_price - commission;
        commission
    }

    /// Book an exit and realize the trade.
    pub fn close(&mut self, exit_price: f64, commission_rate: f64) -> Settlement {
        let commission = Self::commission(exit_price, commission_rate);
        let equity_delta = round_to(
            self.trade_balance + exit_price - commission,
            EQUITY_DECIMALS,
        );
        self.cumulative_equity = round_to(self.cumulative_equity + equity_delta, EQUITY_DECIMALS);
        self.trade_balance = 0.0;
        Settlement {
            commission,
            equity_delta,
            equity: self.cumulative_equity,
        }
    }

    pub fn trade_balance(&self) -> f64 {
        self.trade_balance
    }

    pub fn cumulative_equity(&self) -> f64 {
        self.cumulative_equity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: f64 = 0.0005;

    #[test]
    fn open_books_entry_net_of_commission() {
        let mut ledger = TradeLedger::new();
        let commission = ledger.open(103.33, RATE);
        assert_eq!(commission, 0.05);
        assert!((ledger.trade_balance() - -103.28).abs() < 1e-9);
        assert_eq!(ledger.cumulative_equity(), 0.0);
    }

    #[test]
    fn close_realizes_and_resets_balance() {
        let mut ledger = TradeLedger::new();
        ledger.open(103.33, RATE);
        let s = ledger.close(112.0, RATE);
        assert_eq!(s.commission, 0.06);
        // -103.28 + 112 - 0.06
        assert_eq!(s.equity_delta, 8.66);
        assert_eq!(s.equity, 8.66);
        assert_eq!(ledger.trade_balance(), 0.0);
    }

    #[test]
    fn equity_accumulates_across_trades() {
        let mut ledger = TradeLedger::new();
        ledger.open(100.0, RATE);
        let first = ledger.close(98.0, RATE);
        ledger.open(60.0, RATE);
        let second = ledger.close(61.0, RATE);
        assert_eq!(first.equity_delta, -2.0);
        assert_eq!(second.equity_delta, 1.0);
        assert_eq!(
            second.equity,
            round_to(first.equity_delta + second.equity_delta, EQUITY_DECIMALS)
        );
    }

    #[test]
    fn zero_commission_rate() {
        let mut ledger = TradeLedger::new();
        assert_eq!(ledger.open(100.0, 0.0), 0.0);
        assert_eq!(ledger.close(101.5, 0.0).equity, 1.5);
    }
}
