//! Error types for the dualcheck library.
//!
//! Only dataset-level failures live here. Per-record validation errors and
//! reconciliation flags are data, collected into reports and never returned
//! as `Err`.

use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationSummary;

/// Main error type for dualcheck operations.
#[derive(Debug, Error)]
pub enum DualcheckError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The source file does not exist.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Empty file or no rows to process.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Nothing was available to load.
    #[error("No source data: {0}")]
    NoSourceData(String),

    /// Strict mode saw at least one validation error.
    #[error(
        "Validation failed: {} of {} records invalid ({} errors)",
        summary.invalid,
        summary.total,
        summary.error_count
    )]
    ValidationFailed {
        summary: ValidationSummary,
        /// The first few rendered errors.
        sample: Vec<String>,
    },

    /// Dropping rows with missing mandatory values left nulls behind.
    #[error("Missing values remain in mandatory columns at rows: {rows:?}")]
    ExhaustiveDropFailed { rows: Vec<usize> },

    /// A derivation step needs a column that is not in the dataset.
    #[error("Column '{column}' required by step '{step}' is missing")]
    MissingColumn { column: String, step: String },

    /// A date cell could not be coerced during derivation.
    #[error("Record {row}: cannot parse '{value}' as a date")]
    UnparseableDate { row: usize, value: String },

    /// The dataset changed between validation and filtering.
    #[error("Dataset changed since validation (expected fingerprint {expected}, found {found})")]
    IndexDrift { expected: String, found: String },

    /// The input directory watcher failed.
    #[error("Watch error: {0}")]
    Watch(String),

    /// Remote upload was rejected.
    #[error("Upload error: {0}")]
    Upload(String),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML parse error in a configuration file.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// Result type alias for dualcheck operations.
pub type Result<T> = std::result::Result<T, DualcheckError>;
