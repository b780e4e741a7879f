//! Collected validation errors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of a record-level validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Mandatory field absent or blank.
    MissingValue,
    /// Value cannot be read as the expected type.
    TypeMismatch,
    /// Pattern, length, set membership, sign, integrality or temporal format.
    FormatViolation,
    /// Numeric value outside its allowed range.
    RangeViolation,
    /// Zero in a column later used as a denominator.
    DivisionGuardViolation,
    /// Schema column absent from the dataset.
    MissingColumn,
}

impl ErrorKind {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::MissingValue => "Missing Value",
            ErrorKind::TypeMismatch => "Type Mismatch",
            ErrorKind::FormatViolation => "Format Violation",
            ErrorKind::RangeViolation => "Range Violation",
            ErrorKind::DivisionGuardViolation => "Division Guard",
            ErrorKind::MissingColumn => "Missing Column",
        }
    }
}

/// One immutable validation fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Row label, or `None` for dataset-level errors.
    pub record_index: Option<usize>,
    pub field: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl ValidationError {
    pub fn record(index: usize, field: &str, kind: ErrorKind, message: String) -> Self {
        Self {
            record_index: Some(index),
            field: field.to_string(),
            kind,
            message,
        }
    }

    /// A dataset-level error for an absent schema column.
    pub fn missing_column(field: &str) -> Self {
        Self {
            record_index: None,
            field: field.to_string(),
            kind: ErrorKind::MissingColumn,
            message: format!("Missing column: {}", field),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.record_index {
            Some(index) => write!(f, "Record {}: {}", index, self.message),
            None => f.write_str(&self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ValidationError::record(
            3,
            "Grade",
            ErrorKind::FormatViolation,
            "Grade 'BB' is invalid".to_string(),
        );
        assert_eq!(err.to_string(), "Record 3: Grade 'BB' is invalid");
        assert_eq!(
            ValidationError::missing_column("sunrise").to_string(),
            "Missing column: sunrise"
        );
    }
}
