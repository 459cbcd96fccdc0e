//! Raw table loading and feature table writing
//!
//! Format is selected by file extension alone; there is no content sniffing.

use crate::error::{AqError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Loader for raw observation exports
pub struct RawLoader;

impl RawLoader {
    /// Load a raw table, picking the reader from the file extension.
    pub fn load(path: &Path) -> Result<DataFrame> {
        if !path.exists() {
            return Err(AqError::NotFound(path.display().to_string()));
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => Self::load_delimited(path, b','),
            "tsv" => Self::load_delimited(path, b'\t'),
            "parquet" | "pq" => Self::load_parquet(path),
            other => Err(AqError::SchemaError(format!(
                "unsupported raw file extension {:?}: {}",
                other,
                path.display()
            ))),
        }
    }

    fn load_delimited(path: &Path, separator: u8) -> Result<DataFrame> {
        let file = File::open(path)?;

        let parse_opts = CsvParseOptions::default().with_separator(separator);

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(1000))
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(file)
            .finish()?;

        Ok(df)
    }

    fn load_parquet(path: &Path) -> Result<DataFrame> {
        let file = File::open(path)?;
        Ok(ParquetReader::new(file).finish()?)
    }
}

/// Writer for the final feature table
pub struct FeatureWriter;

impl FeatureWriter {
    /// Write the feature table as parquet, replacing any existing file.
    /// Parent directories are created as needed. Returns the row count.
    pub fn write(df: &mut DataFrame, path: &Path) -> Result<usize> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(path)?;
        ParquetWriter::new(file).finish(df)?;

        Ok(df.height())
    }
}
