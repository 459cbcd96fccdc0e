//! Row-level cleaning: invalid observations out, chronological order in

use crate::error::{AqError, Result};
use crate::resolve::resolve_datetimes;
use polars::prelude::*;
use tracing::info;

/// Canonical resolved-instant column name.
pub const DATETIME_COL: &str = "datetime";
/// Canonical observation value column name.
pub const VALUE_COL: &str = "value";

/// Row counts around a clean pass. Dropped rows are observability only.
#[derive(Debug, Clone, Copy)]
pub struct CleanReport {
    pub rows_in: usize,
    pub rows_out: usize,
    pub dropped: usize,
}

/// Resolve one UTC instant per row, drop rows with an unresolved instant, a
/// missing value, or a negative value, then sort ascending by instant
/// (stable on ties).
///
/// The resolved instants replace any raw `datetime` column in the output.
pub fn clean(df: &DataFrame) -> Result<(DataFrame, CleanReport)> {
    let instants = resolve_datetimes(df)?;

    let values: Vec<Option<f64>> = df
        .column(VALUE_COL)
        .map_err(|_| {
            AqError::ValidationError(format!("required column {VALUE_COL:?} is missing"))
        })?
        .as_materialized_series()
        .cast(&DataType::Float64)?
        .f64()?
        .into_iter()
        .collect();

    let mut keep: Vec<(i64, usize)> = Vec::with_capacity(df.height());
    for (i, (instant, value)) in instants.iter().zip(&values).enumerate() {
        if let (Some(ms), Some(v)) = (instant, value) {
            if *v >= 0.0 {
                keep.push((*ms, i));
            }
        }
    }
    // sort_by_key is stable, so equal instants preserve input order
    keep.sort_by_key(|&(ms, _)| ms);

    let report = CleanReport {
        rows_in: df.height(),
        rows_out: keep.len(),
        dropped: df.height() - keep.len(),
    };

    let idx = IdxCa::from_vec(
        "idx".into(),
        keep.iter().map(|&(_, i)| i as IdxSize).collect(),
    );
    let mut cleaned = df.take(&idx)?;

    let ordered: Vec<i64> = keep.iter().map(|&(ms, _)| ms).collect();
    let datetime = Column::new(DATETIME_COL.into(), ordered)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
    cleaned.with_column(datetime)?;

    info!(
        rows_in = report.rows_in,
        rows_out = report.rows_out,
        dropped = report.dropped,
        "cleaned raw table"
    );

    Ok((cleaned, report))
}
