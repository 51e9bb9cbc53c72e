//! QuoteTable: a name-keyed, column-oriented quote table.
//!
//! Mirrors the shape of the CSV files the runner loads: a `DATE` column plus
//! any number of numeric columns. Missing cells are stored as NaN. Column
//! order is preserved so that export writes columns back the way they came.

use chrono::NaiveDateTime;
use std::collections::HashMap;

use crate::columns::{CLOSE, HIGH, LOW, OPEN, PRICE_COLUMNS};
use crate::domain::Bar;
use crate::error::DataError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteTable {
    dates: Vec<NaiveDateTime>,
    order: Vec<String>,
    columns: HashMap<String, Vec<f64>>,
}

impl QuoteTable {
    pub fn new(dates: Vec<NaiveDateTime>) -> Self {
        Self {
            dates,
            order: Vec::new(),
            columns: HashMap::new(),
        }
    }

    /// Build a table holding the OHLC columns of `bars`.
    pub fn from_bars(bars: &[Bar]) -> Self {
        let mut table = Self::new(bars.iter().map(|b| b.date).collect());
        let series: [(&str, fn(&Bar) -> f64); 4] = [
            (OPEN, |b| b.open),
            (HIGH, |b| b.high),
            (LOW, |b| b.low),
            (CLOSE, |b| b.close),
        ];
        for (name, field) in series {
            table.put(name, bars.iter().map(field).collect());
        }
        table
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDateTime] {
        &self.dates
    }

    /// Numeric column names in insertion order.
    pub fn column_names(&self) -> &[String] {
        &self.order
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(|v| v.as_slice())
    }

    /// Cell value, NaN if the cell is empty.
    pub fn value(&self, name: &str, row: usize) -> Option<f64> {
        self.columns.get(name).and_then(|v| v.get(row).copied())
    }

    /// Insert or replace a column. Replacing keeps the column's position.
    pub fn insert_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<(), DataError> {
        let name = name.into();
        if values.len() != self.dates.len() {
            return Err(DataError::LengthMismatch {
                column: name,
                expected: self.dates.len(),
                found: values.len(),
            });
        }
        self.put(&name, values);
        Ok(())
    }

    fn put(&mut self, name: &str, values: Vec<f64>) {
        if self.columns.insert(name.to_string(), values).is_none() {
            self.order.push(name.to_string());
        }
    }

    /// Names from `required` that this table does not carry.
    pub fn missing_columns<'a>(&self, required: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        required
            .into_iter()
            .filter(|name| !self.has_column(name))
            .map(str::to_string)
            .collect()
    }

    /// Extract OHLC bars. Fails on missing price columns or empty price cells.
    pub fn bars(&self) -> Result<Vec<Bar>, DataError> {
        let missing = self.missing_columns(PRICE_COLUMNS);
        if !missing.is_empty() {
            return Err(DataError::MissingColumns(missing));
        }
        (0..self.len())
            .map(|row| {
                Ok(Bar::new(
                    self.dates[row],
                    self.price(OPEN, row)?,
                    self.price(HIGH, row)?,
                    self.price(LOW, row)?,
                    self.price(CLOSE, row)?,
                ))
            })
            .collect()
    }

    /// A required price cell. Empty cells are a data error, never defaulted,
    /// and prices must be strictly positive.
    pub fn price(&self, name: &str, row: usize) -> Result<f64, DataError> {
        match self.value(name, row) {
            Some(v) if v > 0.0 => Ok(v),
            Some(v) if !v.is_nan() => Err(DataError::NonPositivePrice {
                column: name.to_string(),
                row,
                value: v,
            }),
            _ => Err(DataError::MissingValue {
                column: name.to_string(),
                row,
            }),
        }
    }

    /// Keep only rows for which `keep(row)` is true, in every column.
    pub fn retain_rows(&mut self, keep: impl FnMut(usize) -> bool) {
        let mask: Vec<bool> = (0..self.len()).map(keep).collect();
        retain_by_mask(&mut self.dates, &mask);
        for values in self.columns.values_mut() {
            retain_by_mask(values, &mask);
        }
    }
}

fn retain_by_mask<T>(values: &mut Vec<T>, mask: &[bool]) {
    let mut row = 0;
    values.retain(|_| {
        let keep = mask[row];
        row += 1;
        keep
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(8, min, 0)
            .unwrap()
    }

    fn sample() -> QuoteTable {
        QuoteTable::from_bars(&[
            Bar::new(dt(0), 10.0, 11.0, 9.0, 10.5),
            Bar::new(dt(1), 10.5, 10.5, 10.5, 10.5),
            Bar::new(dt(2), 10.5, 12.0, 10.0, 11.0),
        ])
    }

    #[test]
    fn from_bars_roundtrips_ohlc() {
        let table = sample();
        assert_eq!(table.len(), 3);
        assert_eq!(table.column_names(), ["OPEN", "HIGH", "LOW", "CLOSE"]);
        let bars = table.bars().unwrap();
        assert_eq!(bars[2].high, 12.0);
        assert_eq!(bars[1].date, dt(1));
    }

    #[test]
    fn insert_rejects_wrong_length() {
        let mut table = sample();
        let err = table.insert_column("X", vec![1.0]).unwrap_err();
        assert_eq!(
            err,
            DataError::LengthMismatch {
                column: "X".into(),
                expected: 3,
                found: 1
            }
        );
    }

    #[test]
    fn replace_keeps_column_position() {
        let mut table = sample();
        table.insert_column("X", vec![1.0, 2.0, 3.0]).unwrap();
        table.insert_column("OPEN", vec![0.0, 0.0, 0.0]).unwrap();
        assert_eq!(table.column_names(), ["OPEN", "HIGH", "LOW", "CLOSE", "X"]);
        assert_eq!(table.value("OPEN", 1), Some(0.0));
    }

    #[test]
    fn empty_price_cell_is_an_error() {
        let mut table = sample();
        table
            .insert_column("CLOSE", vec![10.5, f64::NAN, 11.0])
            .unwrap();
        assert_eq!(
            table.bars().unwrap_err(),
            DataError::MissingValue {
                column: "CLOSE".into(),
                row: 1
            }
        );
    }

    #[test]
    fn non_positive_price_is_rejected() {
        let mut table = sample();
        table.insert_column("LOW", vec![9.0, 0.0, 10.0]).unwrap();
        assert_eq!(
            table.bars().unwrap_err(),
            DataError::NonPositivePrice {
                column: "LOW".into(),
                row: 1,
                value: 0.0
            }
        );

        table.insert_column("LOW", vec![9.0, 10.5, 10.0]).unwrap();
        table
            .insert_column("OPEN", vec![10.0, 10.5, -10.5])
            .unwrap();
        assert!(matches!(
            table.bars().unwrap_err(),
            DataError::NonPositivePrice { row: 2, .. }
        ));
    }

    #[test]
    fn missing_price_column_is_reported() {
        let table = QuoteTable::new(vec![dt(0)]);
        assert_eq!(
            table.bars().unwrap_err(),
            DataError::MissingColumns(vec![
                "OPEN".into(),
                "HIGH".into(),
                "LOW".into(),
                "CLOSE".into()
            ])
        );
    }

    #[test]
    fn retain_rows_filters_every_column() {
        let mut table = sample();
        table.retain_rows(|row| row != 1);
        assert_eq!(table.len(), 2);
        assert_eq!(table.dates(), [dt(0), dt(2)]);
        assert_eq!(table.column("HIGH").unwrap(), [11.0, 12.0]);
    }
}
