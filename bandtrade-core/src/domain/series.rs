//! BarSeries: the time-ordered input of one simulation run.

use serde::{Deserialize, Serialize};

use crate::columns::{IndicatorColumns, PRICE_COLUMNS};
use crate::data::QuoteTable;
use crate::domain::bar::{defined, BandedBar, Bands, Bar, LaggedBands};
use crate::error::DataError;

/// Bars ordered by non-decreasing date, each carrying its bands and the
/// previous bar's bands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    bars: Vec<BandedBar>,
}

impl BarSeries {
    /// Check ordering and derive the lag-1 band values by a one-step shift.
    /// Any `prev` values already on the input bars are overwritten.
    pub fn new(mut bars: Vec<BandedBar>) -> Result<Self, DataError> {
        for row in 1..bars.len() {
            if bars[row].bar.date < bars[row - 1].bar.date {
                return Err(DataError::UnorderedDates {
                    row,
                    date: bars[row].bar.date,
                });
            }
        }

        let mut prev = LaggedBands::default();
        for bar in &mut bars {
            let current = LaggedBands::from(&bar.bands);
            bar.prev = prev;
            prev = current;
        }

        Ok(Self { bars })
    }

    /// Read the price and band columns out of a quote table.
    ///
    /// Every missing column is reported at once. Empty price cells are an
    /// error; empty band cells become `None`.
    pub fn from_table(table: &QuoteTable, columns: &IndicatorColumns) -> Result<Self, DataError> {
        let missing = table.missing_columns(PRICE_COLUMNS.into_iter().chain(columns.names()));
        if !missing.is_empty() {
            return Err(DataError::MissingColumns(missing));
        }

        let band = |name: &str, row: usize| table.value(name, row).and_then(defined);
        let bars = table
            .bars()?
            .into_iter()
            .enumerate()
            .map(|(row, bar): (usize, Bar)| {
                let bands = Bands {
                    pc_high: band(&columns.pc_high, row),
                    pc_low: band(&columns.pc_low, row),
                    pc_mid: band(&columns.pc_mid, row),
                    st_upper: band(&columns.st_upper, row),
                    st_lower: band(&columns.st_lower, row),
                };
                BandedBar::new(bar, bands)
            })
            .collect();

        Self::new(bars)
    }

    pub fn bars(&self) -> &[BandedBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BandedBar> {
        self.bars.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BandedBar> {
        self.bars.iter()
    }
}

impl<'a> IntoIterator for &'a BarSeries {
    type Item = &'a BandedBar;
    type IntoIter = std::slice::Iter<'a, BandedBar>;

    fn into_iter(self) -> Self::IntoIter {
        self.bars.iter()
    }
}
