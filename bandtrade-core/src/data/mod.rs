//! Quote tables and their preparation for simulation.

pub mod prepare;
pub mod table;

pub use prepare::{drop_flat_bars, prepare_quotes};
pub use table::QuoteTable;
