//! Quote loading for the runner.
//!
//! Reads a headed CSV file into a [`QuoteTable`]. The `DATE` column is parsed
//! as a timestamp; every other column is numeric, with empty cells (and
//! `NaN`) loaded as missing values. Column order is preserved.

use std::io::Read;
use std::path::{Path, PathBuf};

use bandtrade_core::columns::{DATE, PRICE_COLUMNS};
use bandtrade_core::data::QuoteTable;
use bandtrade_core::DataError;
use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Timestamp layouts accepted in the `DATE` column, tried in order.
const DATE_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d.%m.%Y %H:%M:%S",
];

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open quotes '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: cannot parse date '{value}'")]
    Date { row: usize, value: String },

    #[error("row {row}, column '{column}': cannot parse number '{value}'")]
    Number {
        row: usize,
        column: String,
        value: String,
    },

    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// Load a quote CSV from disk.
pub fn load_quotes(path: &Path) -> Result<QuoteTable, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = read_quotes(file)?;
    tracing::info!(
        path = %path.display(),
        rows = table.len(),
        columns = table.column_names().len(),
        "loaded quotes"
    );
    Ok(table)
}

/// Parse quote CSV from any reader.
pub fn read_quotes<R: Read>(reader: R) -> Result<QuoteTable, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let missing: Vec<String> = std::iter::once(DATE)
        .chain(PRICE_COLUMNS)
        .filter(|name| !headers.iter().any(|h| h == *name))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(DataError::MissingColumns(missing).into());
    }

    let date_idx = headers.iter().position(|h| h == DATE).unwrap_or_default();
    let value_columns: Vec<(usize, &str)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != date_idx)
        .collect();

    let mut dates = Vec::new();
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); value_columns.len()];

    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        let raw_date = record.get(date_idx).unwrap_or_default();
        dates.push(parse_date(raw_date).ok_or_else(|| LoadError::Date {
            row,
            value: raw_date.to_string(),
        })?);

        for (slot, (idx, name)) in values.iter_mut().zip(&value_columns) {
            let raw = record.get(*idx).unwrap_or_default();
            slot.push(parse_number(raw).ok_or_else(|| LoadError::Number {
                row,
                column: name.to_string(),
                value: raw.to_string(),
            })?);
        }
    }

    let mut table = QuoteTable::new(dates);
    for ((_, name), column) in value_columns.into_iter().zip(values) {
        table.insert_column(name, column)?;
    }
    Ok(table)
}

/// Parse a `DATE` cell. A bare date is taken as midnight.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parse a numeric cell. Empty cells become NaN.
fn parse_number(raw: &str) -> Option<f64> {
    if raw.is_empty() {
        return Some(f64::NAN);
    }
    raw.parse::<f64>().ok()
}

/// Deterministic BLAKE3 hash over the table contents.
///
/// Covers dates and every column in table order, so the same file always
/// hashes the same regardless of where it was loaded from.
pub fn dataset_hash(table: &QuoteTable) -> String {
    let mut hasher = blake3::Hasher::new();
    for date in table.dates() {
        hasher.update(date.to_string().as_bytes());
    }
    for name in table.column_names() {
        hasher.update(name.as_bytes());
        for value in table.column(name).unwrap_or_default() {
            hasher.update(&value.to_le_bytes());
        }
    }
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
DATE,OPEN,HIGH,LOW,CLOSE,VOLUME
2024-01-02 07:00:00,100.0,101.0,99.5,100.5,10
2024-01-02 07:05:00,100.5,102.0,100.0,101.5,
2024-01-02T07:10:00,101.5,101.5,101.5,101.5,7
";

    #[test]
    fn reads_columns_in_order() {
        let table = read_quotes(CSV.as_bytes()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.column_names(), ["OPEN", "HIGH", "LOW", "CLOSE", "VOLUME"]);
        assert_eq!(table.value("HIGH", 1), Some(102.0));
        assert!(table.value("VOLUME", 1).unwrap().is_nan());
        assert_eq!(
            table.dates()[2],
            NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(7, 10, 0)
                .unwrap()
        );
    }

    #[test]
    fn reports_all_missing_columns() {
        let err = read_quotes("DATE,OPEN,CLOSE\n2024-01-02 07:00:00,1,1\n".as_bytes()).unwrap_err();
        match err {
            LoadError::Data(DataError::MissingColumns(cols)) => {
                assert_eq!(cols, vec!["HIGH".to_string(), "LOW".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_number_names_row_and_column() {
        let csv = "DATE,OPEN,HIGH,LOW,CLOSE\n2024-01-02 07:00:00,1,x,1,1\n";
        let err = read_quotes(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Number { row: 0, ref column, .. } if column == "HIGH"
        ));
    }

    #[test]
    fn bad_date_is_rejected() {
        let csv = "DATE,OPEN,HIGH,LOW,CLOSE\nyesterday,1,1,1,1\n";
        assert!(matches!(
            read_quotes(csv.as_bytes()).unwrap_err(),
            LoadError::Date { row: 0, .. }
        ));
    }

    #[test]
    fn bare_date_is_midnight() {
        let d = parse_date("2024-03-01").unwrap();
        assert_eq!(d.time(), chrono::NaiveTime::MIN);
        assert!(parse_date("01.03.2024 07:00:00").is_some());
    }

    #[test]
    fn dataset_hash_is_stable_and_content_sensitive() {
        let a = read_quotes(CSV.as_bytes()).unwrap();
        let b = read_quotes(CSV.as_bytes()).unwrap();
        assert_eq!(dataset_hash(&a), dataset_hash(&b));

        let changed = CSV.replace("102.0", "102.5");
        let c = read_quotes(changed.as_bytes()).unwrap();
        assert_ne!(dataset_hash(&a), dataset_hash(&c));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_quotes(Path::new("/nonexistent/quotes.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
