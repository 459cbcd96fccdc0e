//! Air-quality feature pipeline
//!
//! Turns heterogeneous, time-stamped raw air-quality exports into a
//! model-ready tabular feature set:
//!
//! - [`loader`] - raw table reading, feature table writing
//! - [`resolve`] - datetime-resolution cascade over incompatible raw schemas
//! - [`clean`] - invalid-row dropping and chronological sorting
//! - [`features`] - calendar/cyclic encodings and historical lag features
//! - [`assemble`] - canonical column selection and persistence
//! - [`pipeline`] - end-to-end orchestration
//!
//! # Example
//!
//! ```ignore
//! use aq_features::prelude::*;
//!
//! let config = PipelineConfig::sensor("data/raw/openaq_pm25.parquet", "features.parquet");
//! let report = FeaturePipeline::new(config).run()?;
//! println!("{} feature rows written", report.feature_rows);
//! ```

pub mod assemble;
pub mod clean;
pub mod cli;
pub mod config;
pub mod error;
pub mod features;
pub mod loader;
pub mod pipeline;
pub mod resolve;

pub use error::{AqError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::assemble::AssembleResult;
    pub use crate::clean::CleanReport;
    pub use crate::config::{PipelineConfig, SourceSchema};
    pub use crate::error::{AqError, Result};
    pub use crate::features::{lag_column_name, LagGenerator, LagPolicy};
    pub use crate::loader::{FeatureWriter, RawLoader};
    pub use crate::pipeline::{BuildReport, FeaturePipeline};
}
