//! Validation report and summary.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// Counts exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub error_count: usize,
}

/// Result of one validation pass.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Errors in row order, then schema rule order.
    pub errors: Vec<ValidationError>,
    pub valid_count: usize,
    pub invalid_count: usize,
    /// Labels of rows with at least one error.
    pub error_rows: BTreeSet<usize>,
    pub total: usize,
    /// Fingerprint of the dataset that was validated.
    pub fingerprint: String,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn summary(&self) -> ValidationSummary {
        ValidationSummary {
            total: self.total,
            valid: self.valid_count,
            invalid: self.invalid_count,
            error_count: self.errors.len(),
        }
    }

    /// The first `limit` rendered messages.
    pub fn sample(&self, limit: usize) -> Vec<String> {
        self.errors.iter().take(limit).map(ToString::to_string).collect()
    }

    /// Error counts per field, in order of first occurrence.
    pub fn errors_by_field(&self) -> IndexMap<String, usize> {
        let mut counts = IndexMap::new();
        for error in &self.errors {
            *counts.entry(error.field.clone()).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ErrorKind;

    fn report() -> ValidationReport {
        let errors = vec![
            ValidationError::missing_column("sunset"),
            ValidationError::record(0, "Grade", ErrorKind::FormatViolation, "bad grade".into()),
            ValidationError::record(0, "State", ErrorKind::FormatViolation, "bad state".into()),
            ValidationError::record(2, "Grade", ErrorKind::FormatViolation, "bad grade".into()),
        ];
        ValidationReport {
            errors,
            valid_count: 2,
            invalid_count: 2,
            error_rows: BTreeSet::from([0, 2]),
            total: 4,
            fingerprint: "sha256:00".into(),
        }
    }

    #[test]
    fn test_summary_and_sample() {
        let report = report();
        let summary = report.summary();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.error_count, 4);
        assert_eq!(summary.valid + summary.invalid, summary.total);

        let sample = report.sample(2);
        assert_eq!(sample, vec!["Missing column: sunset", "Record 0: bad grade"]);
    }

    #[test]
    fn test_errors_by_field_keeps_first_occurrence_order() {
        let counts = report().errors_by_field();
        let keys: Vec<_> = counts.keys().cloned().collect();
        assert_eq!(keys, vec!["sunset", "Grade", "State"]);
        assert_eq!(counts["Grade"], 2);
    }
}
