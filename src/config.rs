//! Pipeline configuration
//!
//! All paths and parameters are explicit configuration passed into the
//! pipeline entry point; there are no module-level fixed directories, so
//! multiple configurations can run side by side in tests.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw input schema variants the pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceSchema {
    /// Sensor observation export: one numeric `value` per row, with the
    /// observation time in whichever shape the export happened to use
    /// (flat column, `period` object, nested `datetime` object).
    Sensor,
    /// Flat daily per-city table with a `Date` column, a `PM2.5` target,
    /// and pollutant/weather covariates.
    DailyCity,
}

/// Configuration for one feature build run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Raw table to read (format selected by extension).
    pub input_path: PathBuf,

    /// Where the feature table is written (parquet). Replaced wholesale.
    pub output_path: PathBuf,

    /// Which raw schema the input follows.
    pub schema: SourceSchema,

    /// Lag offsets, in chronological steps.
    pub lag_offsets: Vec<usize>,

    /// Entity column partitioning the series into independent per-entity
    /// sub-sequences for lag computation. `None` means one global series.
    pub group_key: Option<String>,

    /// Columns carried through to the feature table when present.
    pub covariates: Vec<String>,
}

impl PipelineConfig {
    /// Configuration for a sensor observation export: one global series,
    /// hourly-style lag offsets.
    pub fn sensor(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input.into(),
            output_path: output.into(),
            schema: SourceSchema::Sensor,
            lag_offsets: vec![1, 3, 24],
            group_key: None,
            covariates: Vec::new(),
        }
    }

    /// Configuration for the flat daily per-city export: lags computed
    /// within each city, pollutant/weather columns passed through.
    pub fn daily_city(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input.into(),
            output_path: output.into(),
            schema: SourceSchema::DailyCity,
            lag_offsets: vec![1, 3, 7],
            group_key: Some("City".to_string()),
            covariates: [
                "PM10",
                "NO2",
                "SO2",
                "CO",
                "O3",
                "Temperature",
                "Humidity",
                "Wind Speed",
                "Country",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }

    /// Builder method to set lag offsets
    pub fn with_lag_offsets(mut self, offsets: Vec<usize>) -> Self {
        self.lag_offsets = offsets;
        self
    }

    /// Builder method to set the entity grouping column
    pub fn with_group_key(mut self, key: impl Into<String>) -> Self {
        self.group_key = Some(key.into());
        self
    }

    /// Builder method to set pass-through covariate columns
    pub fn with_covariates(mut self, covariates: Vec<String>) -> Self {
        self.covariates = covariates;
        self
    }

    /// Builder method to set the output path
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output_path = output.into();
        self
    }
}
