//! Entry and exit rules, evaluated against a single bar.
//!
//! Both functions are pure; the caller owns all state changes.

use crate::config::SessionWindow;
use crate::domain::{BandedBar, ExitReason};
use crate::engine::state::OpenPosition;
use crate::rounding::{round_to, LEVEL_DECIMALS, PRICE_DECIMALS};

/// A triggered long entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntrySignal {
    pub price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
}

/// Band-divergence entry.
///
/// Fires when the previous bar's trend lower band is defined, the channel
/// low sits above the trend lower band, the bar's low trades below the
/// trigger `round((pc_high − st_lower) / 3 + st_lower, 2)`, and the session
/// still accepts entries. Any undefined band on this bar means no entry.
pub fn entry_signal(bar: &BandedBar, session: &SessionWindow) -> Option<EntrySignal> {
    bar.prev.st_lower?;
    let st_lower = bar.bands.st_lower?;
    let pc_low = bar.bands.pc_low?;
    let pc_high = bar.bands.pc_high?;

    if pc_low <= st_lower {
        return None;
    }

    let price = round_to((pc_high - st_lower) / 3.0 + st_lower, PRICE_DECIMALS);
    if bar.bar.low >= price || !session.accepts_entries(bar.time()) {
        return None;
    }

    Some(EntrySignal {
        price,
        stop_loss: round_to(st_lower, LEVEL_DECIMALS),
        take_profit: round_to(pc_high, LEVEL_DECIMALS),
    })
}

/// What to do with an open position on this bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExitDecision {
    Close { reason: ExitReason, price: f64 },
    /// Stay long with the (possibly moved) levels.
    Hold { stop_loss: f64, take_profit: f64 },
}

/// Exit rules in strict priority order; the first match wins.
///
/// 1. High above take-profit: close at the take-profit level.
/// 2. Force-close time, or trend lower band undefined: close at the open.
/// 3. Low below stop-loss: close at the stop-loss level.
/// 4. Otherwise trail: target follows the channel high, stop follows the
///    trend lower band.
pub fn exit_decision(
    bar: &BandedBar,
    position: &OpenPosition,
    session: &SessionWindow,
) -> ExitDecision {
    if bar.bar.high > position.take_profit {
        return ExitDecision::Close {
            reason: ExitReason::TakeProfit,
            price: position.take_profit,
        };
    }

    let st_lower = match bar.bands.st_lower {
        Some(v) if !session.is_force_close(bar.time()) => v,
        _ => {
            return ExitDecision::Close {
                reason: ExitReason::StopTime,
                price: bar.bar.open,
            }
        }
    };

    if bar.bar.low < position.stop_loss {
        return ExitDecision::Close {
            reason: ExitReason::StopLoss,
            price: position.stop_loss,
        };
    }

    ExitDecision::Hold {
        stop_loss: round_to(st_lower, LEVEL_DECIMALS),
        take_profit: bar
            .bands
            .pc_high
            .map(|v| round_to(v, LEVEL_DECIMALS))
            .unwrap_or(position.take_profit),
    }
}
