//! Error types for the data-loader crate.
//!
//! Everything in here is a load-time failure. Per-query conditions such as
//! "no record with that title" are modelled as `Option`s by the catalog and
//! never show up as a `DataLoadError`.

use crate::types::{ItemId, RowId};
use thiserror::Error;

/// Errors that can occur while loading and validating the engine artifacts
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading a file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The catalog CSV could not be tokenized
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// A JSON artifact could not be decoded
    #[error("JSON error in {file}: {source}")]
    JsonError {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    /// None of the accepted column names for a required field is present
    #[error("Missing column in {file}: expected one of {candidates:?}")]
    MissingColumn {
        file: String,
        candidates: Vec<&'static str>,
    },

    /// Line in a data file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Two catalog rows share the same identifier
    #[error("Duplicate item id {id} at rows {first} and {second}")]
    DuplicateId {
        id: ItemId,
        first: RowId,
        second: RowId,
    },

    /// The feature matrix artifact is structurally broken
    #[error("Invalid feature matrix: {0}")]
    InvalidFeatureMatrix(String),

    /// Catalog rows and feature rows are not positionally aligned
    #[error(
        "Configuration mismatch: catalog has {catalog_rows} rows but feature matrix has {feature_rows}"
    )]
    ConfigurationMismatch {
        catalog_rows: usize,
        feature_rows: usize,
    },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
