//! Export: CSV and JSON artifact generation.
//!
//! - **Quotes CSV**: a (prepared) quote table, columns in table order
//! - **Annotated CSV**: quote columns followed by the engine's annotation columns
//! - **Trades CSV**: one row per completed round trip
//! - **Summary JSON**: config, run id, dataset hash and performance summary
//!
//! Missing values are written as empty cells.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use bandtrade_core::columns::DATE;
use bandtrade_core::data::QuoteTable;
use bandtrade_core::domain::{Annotation, TradeRecord};
use serde::Serialize;

use crate::config::BacktestConfig;
use crate::report::PerformanceSummary;
use crate::runner::BacktestResult;

/// Current schema version of the summary JSON.
pub const SCHEMA_VERSION: u32 = 1;

/// Timestamp layout for every exported date.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Annotation columns, in export order.
pub const ANNOTATION_COLUMNS: [&str; 9] = [
    "BUY_PRICE",
    "ST_PRICE",
    "SL_PRICE",
    "TP_PRICE",
    "SL_LINE",
    "TP_LINE",
    "COMMISSION",
    "EQUITY",
    "POSITION",
];

// ─── CSV export ─────────────────────────────────────────────────────

/// Export a quote table as CSV.
pub fn export_quotes_csv(table: &QuoteTable) -> Result<String> {
    write_table(table, None)
}

/// Export a quote table with one annotation per row appended as columns.
pub fn export_annotated_csv(table: &QuoteTable, annotations: &[Annotation]) -> Result<String> {
    if table.len() != annotations.len() {
        bail!(
            "annotation count {} does not match table length {}",
            annotations.len(),
            table.len()
        );
    }
    write_table(table, Some(annotations))
}

fn write_table(table: &QuoteTable, annotations: Option<&[Annotation]>) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header: Vec<&str> = vec![DATE];
    header.extend(table.column_names().iter().map(String::as_str));
    if annotations.is_some() {
        header.extend(ANNOTATION_COLUMNS);
    }
    wtr.write_record(&header)?;

    let columns: Vec<&[f64]> = table
        .column_names()
        .iter()
        .map(|name| table.column(name).unwrap_or_default())
        .collect();

    for (row, date) in table.dates().iter().enumerate() {
        let mut record = Vec::with_capacity(header.len());
        record.push(date.format(DATE_FORMAT).to_string());
        record.extend(columns.iter().map(|c| cell(c.get(row).copied())));
        if let Some(a) = annotations.and_then(|all| all.get(row)) {
            record.extend(annotation_cells(a));
        }
        wtr.write_record(&record)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

fn annotation_cells(a: &Annotation) -> [String; 9] {
    [
        cell(a.buy_price),
        cell(a.st_price),
        cell(a.sl_price),
        cell(a.tp_price),
        cell(a.sl_line),
        cell(a.tp_line),
        cell(a.commission),
        cell(a.equity),
        a.position.map(|p| p.to_string()).unwrap_or_default(),
    ]
}

fn cell(value: Option<f64>) -> String {
    match value {
        Some(v) if !v.is_nan() => v.to_string(),
        _ => String::new(),
    }
}

/// Export a trade list as CSV.
pub fn export_trades_csv(trades: &[TradeRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "entry_bar",
        "entry_date",
        "entry_price",
        "entry_commission",
        "exit_bar",
        "exit_date",
        "exit_price",
        "exit_commission",
        "exit_reason",
        "net_pnl",
        "equity_delta",
        "equity_after",
        "bars_held",
    ])?;

    for t in trades {
        wtr.write_record([
            &t.entry_bar.to_string(),
            &t.entry_date.format(DATE_FORMAT).to_string(),
            &t.entry_price.to_string(),
            &format!("{:.2}", t.entry_commission),
            &t.exit_bar.to_string(),
            &t.exit_date.format(DATE_FORMAT).to_string(),
            &t.exit_price.to_string(),
            &format!("{:.2}", t.exit_commission),
            &format!("{:?}", t.exit_reason),
            &format!("{:.2}", t.net_pnl),
            &format!("{:.2}", t.equity_delta),
            &format!("{:.2}", t.equity_after),
            &t.bars_held.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── JSON export ────────────────────────────────────────────────────

#[derive(Serialize)]
struct RunManifest<'a> {
    schema_version: u32,
    run_id: &'a str,
    dataset_hash: &'a str,
    config: &'a BacktestConfig,
    summary: &'a PerformanceSummary,
}

/// Serialize the run's identity and summary to pretty JSON.
pub fn export_summary_json(result: &BacktestResult) -> Result<String> {
    let manifest = RunManifest {
        schema_version: SCHEMA_VERSION,
        run_id: &result.run_id,
        dataset_hash: &result.dataset_hash,
        config: &result.config,
        summary: &result.summary,
    };
    serde_json::to_string_pretty(&manifest).context("failed to serialize run summary to JSON")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a single run.
///
/// Creates `{output_dir}/{run_id prefix}/` containing:
/// - `annotated.csv`: quotes with annotation columns
/// - `trades.csv`: trade tape
/// - `summary.json`: config, ids and summary
///
/// Returns the path to the created directory.
pub fn save_artifacts(result: &BacktestResult, output_dir: &Path) -> Result<PathBuf> {
    let prefix = result.run_id.get(..12).unwrap_or(&result.run_id);
    let run_dir = output_dir.join(prefix);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let annotated = export_annotated_csv(&result.table, &result.run.annotations)?;
    write_file(&run_dir.join("annotated.csv"), &annotated)?;

    let trades = export_trades_csv(&result.trades)?;
    write_file(&run_dir.join("trades.csv"), &trades)?;

    let summary = export_summary_json(result)?;
    write_file(&run_dir.join("summary.json"), &summary)?;

    tracing::info!(dir = %run_dir.display(), "saved artifacts");
    Ok(run_dir)
}

/// Write `contents` to `path`, creating parent directories.
pub fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}
