//! Calendar and cyclic time encodings
//!
//! Pure per-row derivation with no failure path. The sine-cosine pair keeps
//! hour 23 adjacent to hour 0 instead of a jump across the day boundary.

use crate::clean::DATETIME_COL;
use crate::error::Result;
use chrono::{DateTime, Datelike, Timelike};
use polars::prelude::*;
use std::f64::consts::PI;

pub const HOUR_COL: &str = "hour";
pub const DAYOFWEEK_COL: &str = "dayofweek";
pub const MONTH_COL: &str = "month";
pub const HOUR_SIN_COL: &str = "hour_sin";
pub const HOUR_COS_COL: &str = "hour_cos";

/// Add `hour` (0-23), `dayofweek` (Monday = 0), `month` (1-12), and the
/// cyclic `hour_sin`/`hour_cos` pair, all derived from the resolved instant.
///
/// Daily-granularity sources resolve to midnight, so their hour is 0.
pub fn add_calendar_features(df: &mut DataFrame) -> Result<()> {
    let millis: Vec<Option<i64>> = df
        .column(DATETIME_COL)?
        .as_materialized_series()
        .cast(&DataType::Int64)?
        .i64()?
        .into_iter()
        .collect();

    let n = millis.len();
    let mut hours: Vec<Option<i32>> = Vec::with_capacity(n);
    let mut dayofweeks: Vec<Option<i32>> = Vec::with_capacity(n);
    let mut months: Vec<Option<i32>> = Vec::with_capacity(n);

    for opt in millis.iter().copied() {
        match opt.and_then(DateTime::from_timestamp_millis) {
            Some(dt) => {
                hours.push(Some(dt.hour() as i32));
                dayofweeks.push(Some(dt.weekday().num_days_from_monday() as i32));
                months.push(Some(dt.month() as i32));
            }
            None => {
                hours.push(None);
                dayofweeks.push(None);
                months.push(None);
            }
        }
    }

    let hour_sin: Vec<Option<f64>> = hours
        .iter()
        .map(|h| h.map(|h| (2.0 * PI * h as f64 / 24.0).sin()))
        .collect();
    let hour_cos: Vec<Option<f64>> = hours
        .iter()
        .map(|h| h.map(|h| (2.0 * PI * h as f64 / 24.0).cos()))
        .collect();

    df.with_column(Column::new(HOUR_COL.into(), hours))?;
    df.with_column(Column::new(DAYOFWEEK_COL.into(), dayofweeks))?;
    df.with_column(Column::new(MONTH_COL.into(), months))?;
    df.with_column(Column::new(HOUR_SIN_COL.into(), hour_sin))?;
    df.with_column(Column::new(HOUR_COS_COL.into(), hour_cos))?;

    Ok(())
}
