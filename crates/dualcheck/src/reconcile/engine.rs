//! Reconciliation of derived columns against independent recomputation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::input::{Dataset, Value};
use crate::schema::columns::{property, weather};
use crate::schema::DatasetKind;

use super::flag::ValidationFlag;
use super::{property as property_checks, weather as weather_checks};

/// Absolute tolerance for numeric derived values.
pub const TOLERANCE: f64 = 0.01;

/// Independent recomputation of one derived column.
pub trait DerivedCheck {
    /// Derived column this check covers.
    fn field(&self) -> &'static str;

    /// Allowed absolute difference; zero means exact.
    fn tolerance(&self) -> f64 {
        0.0
    }

    /// Expected value per row, or `None` when the raw inputs are absent and
    /// the check cannot run.
    fn expected(&self, data: &Dataset) -> Option<Vec<Value>>;
}

/// Reconciles an enriched dataset.
pub struct ReconciliationEngine {
    kind: DatasetKind,
    expected_columns: Vec<String>,
    checks: Vec<Box<dyn DerivedCheck>>,
}

impl ReconciliationEngine {
    /// Engine with the registered checks for a dataset kind.
    pub fn for_kind(kind: DatasetKind) -> Self {
        let (expected, checks) = match kind {
            DatasetKind::PropertySale => (property::EXPECTED_DERIVED, property_checks::checks()),
            DatasetKind::Weather => (weather::EXPECTED_DERIVED, weather_checks::checks()),
        };
        Self {
            kind,
            expected_columns: expected.iter().map(|c| c.to_string()).collect(),
            checks,
        }
    }

    pub fn expected_columns(&self) -> &[String] {
        &self.expected_columns
    }

    /// Run every check. Never fails; discrepancies become flags.
    pub fn reconcile(&self, data: &Dataset) -> ReconciliationReport {
        let mut flags = Vec::new();
        let mut flagged_count = 0;

        for column in &self.expected_columns {
            if !data.has_column(column) {
                flags.push(ValidationFlag::missing_column(column));
                flagged_count += 1;
            }
        }

        for check in &self.checks {
            let Some(observed_col) = data.column_index(check.field()) else {
                continue;
            };
            let Some(expected) = check.expected(data) else {
                continue;
            };

            let tolerance = check.tolerance();
            for ((row, expected), &label) in data.rows.iter().zip(&expected).zip(&data.index) {
                let observed = &row[observed_col];
                if !agrees(observed, expected, tolerance) {
                    flags.push(ValidationFlag::mismatch(
                        label,
                        check.field(),
                        render(observed, tolerance),
                        render(expected, tolerance),
                    ));
                    flagged_count += 1;
                }
            }
        }

        let total = data.row_count();
        let report = ReconciliationReport {
            flags,
            total,
            flagged_count,
            valid_count: total as i64 - flagged_count as i64,
        };

        if report.flagged_count > 0 {
            warn!(
                kind = %self.kind,
                flagged = report.flagged_count,
                flags = report.flags.len(),
                "reconciliation found discrepancies"
            );
        } else {
            info!(kind = %self.kind, total, "reconciliation clean");
        }
        report
    }
}

/// Both missing agree; numbers agree within `tolerance` or when both are the
/// same infinity; anything else compares as trimmed text.
pub fn agrees(observed: &Value, expected: &Value, tolerance: f64) -> bool {
    match (observed.is_null(), expected.is_null()) {
        (true, true) => return true,
        (true, false) | (false, true) => return false,
        _ => {}
    }

    match (observed.coerce_f64(), expected.coerce_f64()) {
        (Some(a), Some(b)) if a.is_finite() && b.is_finite() => (a - b).abs() <= tolerance,
        (Some(a), Some(b)) if a == b => true,
        _ => observed.to_string().trim() == expected.to_string().trim(),
    }
}

fn render(value: &Value, tolerance: f64) -> String {
    match value {
        Value::Null => "missing".to_string(),
        Value::Float(v) if tolerance > 0.0 && v.is_finite() => format!("{:.2}", v),
        other => other.to_string(),
    }
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub flags: Vec<ValidationFlag>,
    pub total: usize,
    /// One per missing column plus one per mismatching row and field.
    pub flagged_count: usize,
    /// `total - flagged_count`; negative when rows fail several checks.
    pub valid_count: i64,
}

impl ReconciliationReport {
    pub fn is_clean(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn summary(&self) -> ReconciliationSummary {
        ReconciliationSummary {
            total: self.total,
            valid: self.valid_count,
            flagged: self.flagged_count,
            flag_count: self.flags.len(),
        }
    }

    /// The first `limit` rendered flags.
    pub fn sample(&self, limit: usize) -> Vec<String> {
        self.flags.iter().take(limit).map(ToString::to_string).collect()
    }

    /// Labels of rows referenced by any flag.
    pub fn flagged_labels(&self) -> BTreeSet<usize> {
        self.flags.iter().filter_map(|f| f.record_index).collect()
    }
}

/// Counts exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    pub total: usize,
    pub valid: i64,
    pub flagged: usize,
    pub flag_count: usize,
}

/// Rows referenced by any flag, ascending by label.
pub fn flagged_rows(data: &Dataset, report: &ReconciliationReport) -> Dataset {
    data.select_labels(&report.flagged_labels())
}
