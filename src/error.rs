//! Error types for the contraction-qc library.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum QcError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid measurement '{value}' at line {line}, column {col}")]
    InvalidMeasurement {
        value: String,
        line: usize,
        col: usize,
    },

    #[error("Row at line {line} has {found} columns, expected at least {expected}")]
    ShortRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Pacing frequency is not available; provide it explicitly or encode it in the table name")]
    MissingFrequency,

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, QcError>;
