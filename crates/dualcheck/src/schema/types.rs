//! Core type definitions for field rules.

use serde::{Deserialize, Serialize};

/// Whether a field must be present on every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    /// Absent or blank is always an error.
    Mandatory,
    /// Absent values are skipped silently.
    Optional,
}

/// How strictly the logical type is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    /// The value must already carry the type from ingestion.
    Strict,
    /// The value must be convertible to the type.
    #[default]
    Coercible,
}

/// Expected logical type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogicalType {
    /// Free text.
    Text,
    /// Any number.
    Number,
    /// Whole numbers.
    Integer,
    /// Either text or a number.
    TextOrNumber,
    /// Calendar date in a fixed format.
    Date { format: String, label: String },
    /// Date and time in a fixed format.
    DateTime { format: String, label: String },
    /// Clock time in a fixed format, with named exception values.
    Time {
        format: String,
        label: String,
        exceptions: Vec<String>,
    },
}

impl LogicalType {
    pub fn date(format: &str, label: &str) -> Self {
        LogicalType::Date {
            format: format.to_string(),
            label: label.to_string(),
        }
    }

    pub fn date_time(format: &str, label: &str) -> Self {
        LogicalType::DateTime {
            format: format.to_string(),
            label: label.to_string(),
        }
    }

    pub fn time(format: &str, label: &str, exceptions: &[&str]) -> Self {
        LogicalType::Time {
            format: format.to_string(),
            label: label.to_string(),
            exceptions: exceptions.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Short name used in type-mismatch messages.
    pub fn describe(&self) -> &'static str {
        match self {
            LogicalType::Text => "a string",
            LogicalType::Number => "numeric",
            LogicalType::Integer => "an integer",
            LogicalType::TextOrNumber => "string or numeric",
            LogicalType::Date { .. } => "a date",
            LogicalType::DateTime { .. } => "a date-time",
            LogicalType::Time { .. } => "a time",
        }
    }
}
