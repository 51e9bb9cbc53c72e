//! Simulation engine: a bar-by-bar fold over the series.
//!
//! For each bar, in order:
//! 1. Session gate: bars before the session opens are skipped untouched.
//! 2. Flat: evaluate the band-divergence entry.
//! 3. Long: evaluate exits in strict priority (take-profit, forced close,
//!    stop-loss), otherwise trail the stop and target to the current bands.
//!
//! The only mutable state is [`SimulationState`], threaded through the fold
//! by value. Independent runs share nothing and can run in parallel.

pub mod ledger;
pub mod rules;
pub mod simulate;
pub mod state;
pub mod trade_extraction;

pub use ledger::{Settlement, TradeLedger};
pub use rules::{entry_signal, exit_decision, EntrySignal, ExitDecision};
pub use simulate::{simulate, step, SimulationRun};
pub use state::{OpenPosition, SimulationState};
pub use trade_extraction::extract_trades;
