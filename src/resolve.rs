//! Datetime resolution for heterogeneous raw exports
//!
//! Raw exports vary in where they keep the observation time: a flat labeled
//! column, a composite `period` object (an `interval` pair or a nested
//! from/start sub-object), or a nested `datetime` object. The resolver runs
//! an ordered cascade of independent strategies against the whole table; the
//! first strategy that parses at least one value wins and is applied
//! uniformly. Rows whose individual parse fails stay unresolved and are
//! dropped by the cleaner.

use crate::error::{AqError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use polars::prelude::*;

/// Column-name fragments that mark a column as time-like.
const TIME_KEYWORDS: [&str; 4] = ["utc", "date", "time", "local"];

/// Struct fields that can hold the start of a composite period.
const PERIOD_START_FIELDS: [&str; 3] = ["datetimeFrom", "from", "start"];

/// One resolved UTC instant per row, as epoch milliseconds.
pub type ResolvedInstants = Vec<Option<i64>>;

/// Resolve one UTC instant per row of the raw table.
///
/// Fails with [`AqError::SchemaError`] naming the available columns when
/// every strategy comes up empty.
pub fn resolve_datetimes(df: &DataFrame) -> Result<ResolvedInstants> {
    let strategies: [fn(&DataFrame) -> Option<ResolvedInstants>; 5] = [
        from_time_like_columns,
        from_period_column,
        from_flattened_interval,
        from_datetime_struct,
        from_any_string_column,
    ];

    for strategy in strategies {
        if let Some(resolved) = strategy(df) {
            return Ok(resolved);
        }
    }

    let columns: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    Err(AqError::SchemaError(format!(
        "no datetime-like column found; columns available: {columns:?}"
    )))
}

/// Permissive timestamp parse: RFC 3339, space- or T-separated datetimes
/// with optional subseconds, and bare dates (taken as midnight UTC).
pub fn parse_instant(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).timestamp_millis());
    }

    for fmt in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc).timestamp_millis());
        }
    }

    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y/%m/%d %H:%M:%S",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            let midnight = date.and_hms_opt(0, 0, 0)?;
            return Some(midnight.and_utc().timestamp_millis());
        }
    }

    None
}

/// `Some` iff at least one row resolved; a strategy that parsed nothing
/// must not win the cascade.
fn some_if_any(parsed: ResolvedInstants) -> Option<ResolvedInstants> {
    if parsed.iter().any(|v| v.is_some()) {
        Some(parsed)
    } else {
        None
    }
}

fn parse_string_series(series: &Series) -> Option<ResolvedInstants> {
    let ca = series.str().ok()?;
    some_if_any(ca.into_iter().map(|opt| opt.and_then(parse_instant)).collect())
}

/// Accept columns that are already temporal by reading them as epoch millis.
fn temporal_series_millis(series: &Series) -> Option<ResolvedInstants> {
    let millis = series
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
        .ok()?
        .cast(&DataType::Int64)
        .ok()?;
    let ca = millis.i64().ok()?;
    some_if_any(ca.into_iter().collect())
}

/// First element of each list entry, parsed as an instant.
fn list_first_elements(series: &Series) -> Option<ResolvedInstants> {
    let ca = series.list().ok()?;
    let parsed: ResolvedInstants = ca
        .into_iter()
        .map(|opt| {
            opt.and_then(|inner| {
                let strings = inner.str().ok()?;
                parse_instant(strings.get(0)?)
            })
        })
        .collect();
    some_if_any(parsed)
}

/// Strategy 1: columns whose name contains a time keyword, in column order.
fn from_time_like_columns(df: &DataFrame) -> Option<ResolvedInstants> {
    for column in df.get_columns() {
        let series = column.as_materialized_series();
        let name = series.name().to_lowercase();
        if !TIME_KEYWORDS.iter().any(|k| name.contains(k)) {
            continue;
        }

        let resolved = match series.dtype() {
            DataType::String => parse_string_series(series),
            DataType::Date | DataType::Datetime(_, _) => temporal_series_millis(series),
            _ => None,
        };
        if resolved.is_some() {
            return resolved;
        }
    }
    None
}

/// Strategy 2: composite `period` column (struct or list).
fn from_period_column(df: &DataFrame) -> Option<ResolvedInstants> {
    let series = df.column("period").ok()?.as_materialized_series();
    match series.dtype() {
        DataType::Struct(_) => period_struct_starts(series),
        DataType::List(_) => list_first_elements(series),
        _ => None,
    }
}

/// Start instant of each `period` struct: the first `interval` element when
/// present, otherwise a from/start field (its `utc` sub-field when that
/// field is itself nested).
fn period_struct_starts(series: &Series) -> Option<ResolvedInstants> {
    let st = series.struct_().ok()?;

    if let Ok(interval) = st.field_by_name("interval") {
        let resolved = match interval.dtype() {
            DataType::List(_) => list_first_elements(&interval),
            DataType::String => parse_string_series(&interval),
            _ => None,
        };
        if resolved.is_some() {
            return resolved;
        }
    }

    for field in PERIOD_START_FIELDS {
        let Ok(inner) = st.field_by_name(field) else {
            continue;
        };
        let resolved = match inner.dtype() {
            DataType::Struct(_) => inner
                .struct_()
                .ok()
                .and_then(|s| s.field_by_name("utc").ok())
                .and_then(|utc| parse_string_series(&utc)),
            DataType::List(_) => list_first_elements(&inner),
            DataType::String => parse_string_series(&inner),
            DataType::Date | DataType::Datetime(_, _) => temporal_series_millis(&inner),
            _ => None,
        };
        if resolved.is_some() {
            return resolved;
        }
    }

    None
}

/// Strategy 3: flattened spellings of the interval field, unwrapping
/// single-element lists.
fn from_flattened_interval(df: &DataFrame) -> Option<ResolvedInstants> {
    for name in ["period.interval", "period.interval.0"] {
        let Ok(column) = df.column(name) else {
            continue;
        };
        let series = column.as_materialized_series();
        let resolved = match series.dtype() {
            DataType::List(_) => list_first_elements(series),
            DataType::String => parse_string_series(series),
            _ => None,
        };
        if resolved.is_some() {
            return resolved;
        }
    }
    None
}

/// Strategy 4: nested `datetime` struct exposing a `utc` field.
fn from_datetime_struct(df: &DataFrame) -> Option<ResolvedInstants> {
    let series = df.column("datetime").ok()?.as_materialized_series();
    let st = series.struct_().ok()?;
    let utc = st.field_by_name("utc").ok()?;
    parse_string_series(&utc)
}

/// Strategy 5: permissive parse over every string column in order.
fn from_any_string_column(df: &DataFrame) -> Option<ResolvedInstants> {
    for column in df.get_columns() {
        let series = column.as_materialized_series();
        if series.dtype() != &DataType::String {
            continue;
        }
        if let Some(resolved) = parse_string_series(series) {
            return Some(resolved);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn millis(s: &str) -> i64 {
        parse_instant(s).unwrap()
    }

    /// Build a `period` struct column holding an `interval` list per row.
    fn period_with_intervals(intervals: &[&[&str]]) -> Series {
        let inner: Vec<Series> = intervals
            .iter()
            .map(|iv| Series::new("".into(), *iv))
            .collect();
        let interval = Series::new("interval".into(), inner);
        StructChunked::from_series("period".into(), intervals.len(), [interval].iter())
            .unwrap()
            .into_series()
    }

    #[test]
    fn test_parse_instant_formats() {
        assert_eq!(
            parse_instant("2026-02-06T10:00:00Z"),
            parse_instant("2026-02-06 10:00:00")
        );
        assert_eq!(
            parse_instant("2026-02-06"),
            parse_instant("2026-02-06T00:00:00Z")
        );
        assert_eq!(
            parse_instant("2026-02-06T10:00:00+01:00"),
            parse_instant("2026-02-06T09:00:00Z")
        );
        assert!(parse_instant("not a timestamp").is_none());
        assert!(parse_instant("").is_none());
    }

    #[test]
    fn test_flat_time_like_column_wins() {
        let df = df!(
            "datetime.utc" => &["2026-02-06T10:00:00Z", "2026-02-06T11:00:00Z"],
            "value" => &[12.5, 14.0],
        )
        .unwrap();

        let resolved = resolve_datetimes(&df).unwrap();
        assert_eq!(resolved[0], Some(millis("2026-02-06T10:00:00Z")));
        assert_eq!(resolved[1], Some(millis("2026-02-06T11:00:00Z")));
    }

    #[test]
    fn test_first_time_like_column_in_order() {
        // Both columns are time-like; column order decides.
        let df = df!(
            "date.local" => &["2026-02-06T09:00:00"],
            "date.utc" => &["2026-02-06T10:00:00Z"],
        )
        .unwrap();

        let resolved = resolve_datetimes(&df).unwrap();
        assert_eq!(resolved[0], Some(millis("2026-02-06T09:00:00")));
    }

    #[test]
    fn test_period_interval_takes_start() {
        let period = period_with_intervals(&[
            &["2026-02-06T10:00:00Z", "2026-02-06T11:00:00Z"],
            &["2026-02-06T11:00:00Z", "2026-02-06T12:00:00Z"],
        ]);
        let value = Series::new("value".into(), &[12.5, 14.0]);
        let df = DataFrame::new(vec![period.into(), value.into()]).unwrap();

        let resolved = resolve_datetimes(&df).unwrap();
        assert_eq!(resolved[0], Some(millis("2026-02-06T10:00:00Z")));
        assert_eq!(resolved[1], Some(millis("2026-02-06T11:00:00Z")));
    }

    #[test]
    fn test_period_nested_from_utc() {
        let utc = Series::new(
            "utc".into(),
            &["2026-02-06T10:00:00Z", "2026-02-06T11:00:00Z"],
        );
        let from = StructChunked::from_series("datetimeFrom".into(), 2, [utc].iter())
            .unwrap()
            .into_series();
        let period = StructChunked::from_series("period".into(), 2, [from].iter())
            .unwrap()
            .into_series();
        let df = DataFrame::new(vec![period.into()]).unwrap();

        let resolved = resolve_datetimes(&df).unwrap();
        assert_eq!(resolved[0], Some(millis("2026-02-06T10:00:00Z")));
    }

    #[test]
    fn test_flattened_interval_column() {
        let inner: Vec<Series> = vec![Series::new(
            "".into(),
            &["2026-02-06T10:00:00Z", "2026-02-06T11:00:00Z"],
        )];
        let df = DataFrame::new(vec![
            Series::new("period.interval".into(), inner).into(),
        ])
        .unwrap();

        let resolved = resolve_datetimes(&df).unwrap();
        assert_eq!(resolved[0], Some(millis("2026-02-06T10:00:00Z")));
    }

    #[test]
    fn test_datetime_struct_utc_field() {
        let utc = Series::new("utc".into(), &["2026-02-06T10:00:00Z"]);
        let datetime = StructChunked::from_series("datetime".into(), 1, [utc].iter())
            .unwrap()
            .into_series();
        let df = DataFrame::new(vec![datetime.into()]).unwrap();

        let resolved = resolve_datetimes(&df).unwrap();
        assert_eq!(resolved[0], Some(millis("2026-02-06T10:00:00Z")));
    }

    #[test]
    fn test_fallback_scans_remaining_string_columns() {
        let df = df!(
            "station" => &["st-1", "st-2"],
            "recorded" => &["2026-02-06T10:00:00Z", "garbage"],
        )
        .unwrap();

        let resolved = resolve_datetimes(&df).unwrap();
        assert_eq!(resolved[0], Some(millis("2026-02-06T10:00:00Z")));
        assert_eq!(resolved[1], None);
    }

    #[test]
    fn test_exhausted_cascade_names_columns() {
        let df = df!(
            "value" => &[1.0, 2.0],
            "station" => &["a", "b"],
        )
        .unwrap();

        let err = resolve_datetimes(&df).unwrap_err();
        match err {
            AqError::SchemaError(msg) => {
                assert!(msg.contains("value"), "message should name columns: {msg}");
                assert!(msg.contains("station"));
            }
            other => panic!("expected SchemaError, got {other:?}"),
        }
    }

    #[test]
    fn test_unparseable_rows_stay_unresolved() {
        let df = df!(
            "timestamp" => &["2026-02-06T10:00:00Z", "not-a-time"],
        )
        .unwrap();

        let resolved = resolve_datetimes(&df).unwrap();
        assert!(resolved[0].is_some());
        assert!(resolved[1].is_none());
    }
}
