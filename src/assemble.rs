//! Final column selection and persistence

use crate::clean::{DATETIME_COL, VALUE_COL};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::features::calendar::{
    DAYOFWEEK_COL, HOUR_COL, HOUR_COS_COL, HOUR_SIN_COL, MONTH_COL,
};
use crate::loader::FeatureWriter;
use polars::prelude::*;
use std::path::PathBuf;

/// Outcome of the assemble stage.
#[derive(Debug, Clone)]
pub struct AssembleResult {
    pub path: PathBuf,
    pub rows: usize,
}

/// Select and order the canonical output columns: value, instant, calendar
/// fields, the lag columns actually generated, then configured covariates
/// and the entity key when present in the frame. Rows with any remaining
/// null among the kept columns are dropped.
pub fn select_features(
    df: &DataFrame,
    lag_columns: &[String],
    config: &PipelineConfig,
) -> Result<DataFrame> {
    let mut keep: Vec<String> = [
        VALUE_COL,
        DATETIME_COL,
        HOUR_COL,
        DAYOFWEEK_COL,
        MONTH_COL,
        HOUR_SIN_COL,
        HOUR_COS_COL,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    keep.extend(lag_columns.iter().cloned());

    for covariate in &config.covariates {
        if df.column(covariate).is_ok() && !keep.contains(covariate) {
            keep.push(covariate.clone());
        }
    }
    if let Some(key) = &config.group_key {
        if df.column(key).is_ok() && !keep.contains(key) {
            keep.push(key.clone());
        }
    }

    let selected = df.select(keep)?;
    drop_null_rows(&selected)
}

/// Select, drop incomplete rows, and write the feature table.
pub fn assemble(
    df: &DataFrame,
    lag_columns: &[String],
    config: &PipelineConfig,
) -> Result<AssembleResult> {
    let mut features = select_features(df, lag_columns, config)?;
    let rows = FeatureWriter::write(&mut features, &config.output_path)?;
    Ok(AssembleResult {
        path: config.output_path.clone(),
        rows,
    })
}

fn drop_null_rows(df: &DataFrame) -> Result<DataFrame> {
    let n = df.height();
    let null_masks: Vec<_> = df
        .get_columns()
        .iter()
        .map(|c| c.as_materialized_series().is_null())
        .collect();

    let mut keep: Vec<IdxSize> = Vec::with_capacity(n);
    'rows: for i in 0..n {
        for mask in &null_masks {
            if mask.get(i).unwrap_or(true) {
                continue 'rows;
            }
        }
        keep.push(i as IdxSize);
    }

    if keep.len() == n {
        return Ok(df.clone());
    }
    Ok(df.take(&IdxCa::from_vec("idx".into(), keep))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature_frame() -> DataFrame {
        let datetime = Column::new(
            DATETIME_COL.into(),
            vec![Some(1_000_000i64), Some(2_000_000), Some(3_000_000)],
        )
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
        .unwrap();

        let mut df = df!(
            "value" => &[1.0, 2.0, 3.0],
            "hour" => &[0i32, 1, 2],
            "dayofweek" => &[3i32, 3, 3],
            "month" => &[1i32, 1, 1],
            "hour_sin" => &[0.0, 0.25, 0.5],
            "hour_cos" => &[1.0, 0.96, 0.86],
            "value_lag_1" => &[None, Some(1.0), Some(2.0)],
            "City" => &["Paris", "Paris", "Paris"],
            "raw_leftover" => &["x", "y", "z"],
        )
        .unwrap();
        df.with_column(datetime).unwrap();
        df
    }

    #[test]
    fn test_canonical_column_order() {
        let df = feature_frame();
        let config = PipelineConfig::daily_city("in.csv", "out.parquet");
        let lag_cols = vec!["value_lag_1".to_string()];

        let features = select_features(&df, &lag_cols, &config).unwrap();
        let names: Vec<String> = features
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        assert_eq!(
            names,
            vec![
                "value",
                "datetime",
                "hour",
                "dayofweek",
                "month",
                "hour_sin",
                "hour_cos",
                "value_lag_1",
                "City",
            ]
        );
    }

    #[test]
    fn test_incomplete_rows_dropped() {
        let df = feature_frame();
        let config = PipelineConfig::daily_city("in.csv", "out.parquet");
        let lag_cols = vec!["value_lag_1".to_string()];

        let features = select_features(&df, &lag_cols, &config).unwrap();
        // first row has a null lag
        assert_eq!(features.height(), 2);
        let values: Vec<f64> = features
            .column("value")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(values, vec![2.0, 3.0]);
    }

    #[test]
    fn test_absent_covariates_are_skipped() {
        let df = feature_frame();
        // daily config expects PM10 etc., which this frame does not carry
        let config = PipelineConfig::daily_city("in.csv", "out.parquet");
        let features = select_features(&df, &[], &config).unwrap();
        assert!(features.column("PM10").is_err());
        assert!(features.column("City").is_ok());
    }
}
