//! Quote preparation: remove no-trade bars, attach indicator columns.

use crate::config::IndicatorSpec;
use crate::data::QuoteTable;
use crate::error::Error;
use crate::indicators::indicators_for;

/// Drop bars whose open, high, low and close are identical. Returns how many
/// rows were removed.
pub fn drop_flat_bars(table: &mut QuoteTable) -> Result<usize, Error> {
    let flat: Vec<bool> = table.bars()?.iter().map(|b| b.is_flat()).collect();
    let before = table.len();
    table.retain_rows(|row| !flat[row]);
    Ok(before - table.len())
}

/// Produce a simulation-ready copy of `table`.
///
/// Flat bars are removed first, so indicator windows only see bars where
/// something traded. Each indicator is validated, then every band it describes
/// is computed and stored under its resolved column name.
pub fn prepare_quotes(table: &QuoteTable, specs: &[IndicatorSpec]) -> Result<QuoteTable, Error> {
    for (index, spec) in specs.iter().enumerate() {
        spec.validate(index)?;
    }

    let mut prepared = table.clone();
    let dropped = drop_flat_bars(&mut prepared)?;
    if dropped > 0 {
        tracing::warn!(dropped, remaining = prepared.len(), "dropped flat bars");
    }

    let bars = prepared.bars()?;
    for spec in specs {
        for indicator in indicators_for(spec) {
            let values = indicator.compute(&bars);
            prepared.insert_column(indicator.name(), values)?;
        }
    }

    tracing::debug!(
        rows = prepared.len(),
        columns = prepared.column_names().len(),
        "prepared quotes"
    );
    Ok(prepared)
}
