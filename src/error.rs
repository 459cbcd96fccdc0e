//! Error types for the air-quality feature pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, AqError>;

/// Main error type for the feature pipeline
///
/// Fatal conditions only: row-local problems (an unparseable timestamp, a
/// missing or negative value) are dropped during cleaning and reported as an
/// aggregate count, never as errors.
#[derive(Error, Debug)]
pub enum AqError {
    #[error("Raw file not found: {0}")]
    NotFound(String),

    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<polars::error::PolarsError> for AqError {
    fn from(err: polars::error::PolarsError) -> Self {
        AqError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for AqError {
    fn from(err: serde_json::Error) -> Self {
        AqError::SerializationError(err.to_string())
    }
}
