//! End-to-end feature build
//!
//! Loader → resolver/cleaner → calendar encoder → lag generator → assembler.
//! One synchronous, whole-table batch per run; the output path is replaced
//! wholesale, so concurrent runs against the same destination must be
//! serialized by the caller.

use crate::assemble;
use crate::clean::{clean, VALUE_COL};
use crate::config::{PipelineConfig, SourceSchema};
use crate::error::{AqError, Result};
use crate::features::calendar::add_calendar_features;
use crate::features::lags::{LagGenerator, LagPolicy};
use crate::loader::RawLoader;
use polars::prelude::*;
use std::path::PathBuf;
use tracing::info;

/// Per-stage row counts from one pipeline run.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub output_path: PathBuf,
    pub raw_rows: usize,
    pub clean_rows: usize,
    pub feature_rows: usize,
    pub dropped_invalid: usize,
}

/// The feature build pipeline.
pub struct FeaturePipeline {
    config: PipelineConfig,
}

impl FeaturePipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the full build: read the raw table, clean it, derive calendar and
    /// lag features, and write the feature table.
    pub fn run(&self) -> Result<BuildReport> {
        let raw = RawLoader::load(&self.config.input_path)?;
        let raw_rows = raw.height();
        info!(
            rows = raw_rows,
            path = %self.config.input_path.display(),
            "loaded raw table"
        );

        let prepared = match self.config.schema {
            SourceSchema::Sensor => raw,
            SourceSchema::DailyCity => Self::prepare_daily(raw)?,
        };

        let (mut table, clean_report) = clean(&prepared)?;

        add_calendar_features(&mut table)?;

        let policy = match &self.config.group_key {
            Some(key) => LagPolicy::Grouped { key: key.clone() },
            None => LagPolicy::Ungrouped,
        };
        let generator = LagGenerator::new(self.config.lag_offsets.clone(), policy);
        let lag_columns = generator.apply(&mut table)?;

        let assembled = assemble::assemble(&table, &lag_columns, &self.config)?;
        info!(
            rows = assembled.rows,
            path = %assembled.path.display(),
            "feature table written"
        );

        Ok(BuildReport {
            output_path: assembled.path,
            raw_rows,
            clean_rows: clean_report.rows_out,
            feature_rows: assembled.rows,
            dropped_invalid: clean_report.dropped,
        })
    }

    /// Adapt the flat daily per-city export to the shared column contract:
    /// `PM2.5` becomes `value`; `Date` resolves through the usual cascade.
    fn prepare_daily(df: DataFrame) -> Result<DataFrame> {
        for required in ["Date", "PM2.5"] {
            if df.column(required).is_err() {
                return Err(AqError::ValidationError(format!(
                    "required column {required:?} is missing from the daily export"
                )));
            }
        }

        let mut out = df;
        let value = out
            .column("PM2.5")?
            .as_materialized_series()
            .cast(&DataType::Float64)?
            .with_name(VALUE_COL.into());
        out.with_column(value)?;
        Ok(out)
    }
}
