//! Reconciliation flags.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of discrepancy found after derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    /// An expected derived column is absent.
    MissingDerivedColumn,
    /// A derived value disagrees with its recomputation.
    ValueMismatch,
}

/// One reconciliation discrepancy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFlag {
    /// Row label, or `None` for a missing column.
    pub record_index: Option<usize>,
    pub field: String,
    pub kind: FlagKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub got: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    pub message: String,
}

impl ValidationFlag {
    pub fn missing_column(field: &str) -> Self {
        Self {
            record_index: None,
            field: field.to_string(),
            kind: FlagKind::MissingDerivedColumn,
            got: None,
            expected: None,
            message: format!("Calculated field '{}' is missing from processed data", field),
        }
    }

    pub fn mismatch(record_index: usize, field: &str, got: String, expected: String) -> Self {
        let message = format!("{} incorrect. Got '{}', expected '{}'", field, got, expected);
        Self {
            record_index: Some(record_index),
            field: field.to_string(),
            kind: FlagKind::ValueMismatch,
            got: Some(got),
            expected: Some(expected),
            message,
        }
    }
}

impl fmt::Display for ValidationFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.record_index {
            Some(index) => write!(f, "Record {}: {}", index, self.message),
            None => f.write_str(&self.message),
        }
    }
}
