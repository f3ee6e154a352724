//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while aggregating a transaction table
///
/// Every variant is recoverable: callers either omit the derived metric
/// or surface the problem next to the partial result.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AggregateError {
    #[error("Missing column: {column}")]
    MissingColumn { column: String },

    #[error("Input table has no rows")]
    EmptyInput,

    #[error("Malformed value {value:?} in column {column} at row {row}: {reason}")]
    MalformedValue {
        column: String,
        /// Zero-based data row index (header excluded)
        row: usize,
        value: String,
        reason: String,
    },
}

impl AggregateError {
    pub fn missing(column: impl Into<String>) -> Self {
        AggregateError::MissingColumn { column: column.into() }
    }
}

/// Errors that can occur while decoding an uploaded table
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV decoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet decoding failed: {0}")]
    Spreadsheet(#[from] calamine::XlsxError),

    #[error("Invalid table format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported file format: .{0} (expected .csv or .xlsx)")]
    UnsupportedFormat(String),
}

/// Errors that can occur while re-encoding a table snapshot
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Spreadsheet encoding failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Table too large for a single sheet: {0}")]
    TooLarge(String),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Failed to export snapshot: {0}")]
    ExportFailed(#[from] ExportError),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

/// Errors that can occur while loading analysis configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}
