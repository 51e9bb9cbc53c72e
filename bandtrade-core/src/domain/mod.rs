//! Domain types for BandTrade

pub mod annotation;
pub mod bar;
pub mod series;
pub mod trade;

pub use annotation::{Annotation, ExitReason, SignalKind};
pub use bar::{BandedBar, Bands, Bar, LaggedBands};
pub use series::BarSeries;
pub use trade::TradeRecord;
