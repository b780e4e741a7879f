//! Applies a schema to every record of a dataset.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, info, warn};

use crate::error::{DualcheckError, Result};
use crate::input::{Dataset, Value};
use crate::schema::{
    AbsentColumnPolicy, Constraint, DatasetKind, FieldRule, LogicalType, Schema, Strictness,
};

use super::error::{ErrorKind, ValidationError};
use super::report::ValidationReport;

/// Checks records against a schema. Advisory only: never drops rows.
pub struct RecordValidator {
    schema: Schema,
}

impl RecordValidator {
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    /// Validator for the registered schema of `kind`.
    pub fn for_kind(kind: DatasetKind) -> Result<Self> {
        Ok(Self::new(Schema::for_kind(kind)?))
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Validate every record. Errors are ordered by row, then by rule.
    pub fn validate(&self, data: &Dataset) -> ValidationReport {
        let mut errors = Vec::new();
        let mut error_rows = BTreeSet::new();

        let mut bound: Vec<(&FieldRule, Option<usize>)> = Vec::with_capacity(self.schema.rules.len());
        let mut absent = 0;
        for rule in &self.schema.rules {
            match (data.column_index(&rule.name), self.schema.absent_columns) {
                (Some(col), _) => bound.push((rule, Some(col))),
                (None, AbsentColumnPolicy::TreatAsNull) => bound.push((rule, None)),
                (None, AbsentColumnPolicy::SkipAndReport) => {
                    absent += 1;
                    errors.push(ValidationError::missing_column(&rule.name));
                }
            }
        }

        if absent * 2 > self.schema.rules.len() {
            warn!(
                absent,
                expected = self.schema.rules.len(),
                "more than half of the schema columns are missing, skipping record checks"
            );
        } else {
            for (pos, row) in data.rows.iter().enumerate() {
                let label = data.index[pos];
                let before = errors.len();

                for (rule, col) in &bound {
                    let value = col.map(|c| &row[c]).unwrap_or(&Value::Null);
                    for (kind, message) in check_value(rule, value) {
                        errors.push(ValidationError::record(label, &rule.name, kind, message));
                    }
                }

                if errors.len() > before {
                    error_rows.insert(label);
                }
            }
        }

        let total = data.row_count();
        let invalid_count = error_rows.len();
        let report = ValidationReport {
            errors,
            valid_count: total - invalid_count,
            invalid_count,
            error_rows,
            total,
            fingerprint: data.fingerprint(),
        };

        info!(
            kind = %self.schema.kind,
            total,
            valid = report.valid_count,
            invalid = report.invalid_count,
            errors = report.errors.len(),
            "validation complete"
        );
        report
    }
}

/// Remove exactly the rows recorded as invalid.
///
/// Fails with `IndexDrift` if the dataset no longer matches the one the
/// report was produced from.
pub fn filter_valid(mut data: Dataset, report: &ValidationReport) -> Result<Dataset> {
    let found = data.fingerprint();
    if found != report.fingerprint {
        return Err(DualcheckError::IndexDrift {
            expected: report.fingerprint.clone(),
            found,
        });
    }

    let labels = data.index.clone();
    data.retain_rows(|pos, _| !report.error_rows.contains(&labels[pos]));
    debug!(
        removed = report.error_rows.len(),
        remaining = data.row_count(),
        "filtered invalid rows"
    );
    Ok(data)
}

/// All errors one rule produces for one value.
fn check_value(rule: &FieldRule, value: &Value) -> Vec<(ErrorKind, String)> {
    let name = &rule.name;

    if value.is_blank() {
        if rule.is_mandatory() {
            return vec![(
                ErrorKind::MissingValue,
                format!("Mandatory field '{}' is missing or empty", name),
            )];
        }
        return Vec::new();
    }

    if !type_matches(rule, value) {
        let (kind, message) = match &rule.logical_type {
            LogicalType::Date { label, .. } | LogicalType::DateTime { label, .. } => (
                ErrorKind::FormatViolation,
                format!("{} should be in {} format", name, label),
            ),
            LogicalType::Time { label, .. } => (
                ErrorKind::FormatViolation,
                format!("'{}' is not in '{}' format or a valid exception", name, label),
            ),
            other => (
                ErrorKind::TypeMismatch,
                format!("{} should be {}", name, other.describe()),
            ),
        };
        return vec![(kind, message)];
    }

    rule.constraints
        .iter()
        .filter_map(|c| check_constraint(name, c, value))
        .collect()
}

fn type_matches(rule: &FieldRule, value: &Value) -> bool {
    match (&rule.logical_type, rule.strictness) {
        (LogicalType::Text, Strictness::Strict) => matches!(value, Value::Text(_)),
        (LogicalType::Text, Strictness::Coercible) => true,
        (LogicalType::Number, Strictness::Strict) => value.is_numeric(),
        (LogicalType::Number, Strictness::Coercible) => value.coerce_f64().is_some(),
        (LogicalType::Integer, _) => match value {
            Value::Integer(_) => true,
            Value::Float(v) => v.is_finite(),
            Value::Text(s) => s.trim().parse::<i64>().is_ok(),
            _ => false,
        },
        (LogicalType::TextOrNumber, _) => true,
        (LogicalType::Date { format, .. }, _) => {
            matches!(value, Value::Date(_))
                || NaiveDate::parse_from_str(value.to_string().trim(), format).is_ok()
        }
        (LogicalType::DateTime { format, .. }, _) => {
            NaiveDateTime::parse_from_str(&value.to_string(), format).is_ok()
        }
        (LogicalType::Time {
            format, exceptions, ..
        }, _) => {
            let text = value.to_string();
            let text = text.trim();
            exceptions.iter().any(|e| e.eq_ignore_ascii_case(text))
                || NaiveTime::parse_from_str(text, format).is_ok()
        }
    }
}

fn check_constraint(name: &str, constraint: &Constraint, value: &Value) -> Option<(ErrorKind, String)> {
    match constraint {
        Constraint::Pattern { regex, requirement } => {
            let text = value.to_string();
            (!regex.is_match(text.trim())).then(|| {
                (
                    ErrorKind::FormatViolation,
                    format!("{} '{}' is invalid (must {})", name, text, requirement),
                )
            })
        }
        Constraint::Length(n) => (value.to_string().chars().count() != *n).then(|| {
            (
                ErrorKind::FormatViolation,
                format!("{} should be a {}-character code", name, n),
            )
        }),
        Constraint::OneOf {
            values,
            case_insensitive,
        } => {
            let text = value.to_string();
            let found = if *case_insensitive {
                let needle = text.trim().to_lowercase();
                values.iter().any(|v| v.to_lowercase() == needle)
            } else {
                values.iter().any(|v| *v == text)
            };
            (!found).then(|| {
                let allowed: Vec<String> = values.iter().map(|v| format!("'{}'", v)).collect();
                (
                    ErrorKind::FormatViolation,
                    format!("{} must be one of {} (got '{}')", name, allowed.join(", "), text),
                )
            })
        }
        Constraint::Range { min, max } => {
            let v = value.coerce_f64()?;
            let (lo, hi) = (min.resolve(), max.resolve());
            (v < lo || v > hi).then(|| {
                (
                    ErrorKind::RangeViolation,
                    format!("{} ({}) is outside reasonable range [{}, {}]", name, value, lo, hi),
                )
            })
        }
        Constraint::NonNegative => {
            let v = value.coerce_f64()?;
            (v < 0.0).then(|| (ErrorKind::RangeViolation, format!("{} must be non-negative", name)))
        }
        Constraint::NonNegativeInteger => {
            let v = value.coerce_f64()?;
            (v < 0.0 || v.fract() != 0.0).then(|| {
                (
                    ErrorKind::FormatViolation,
                    format!("{} must be a non-negative integer", name),
                )
            })
        }
        Constraint::NonZero { usage } => {
            let v = value.coerce_f64()?;
            (v == 0.0).then(|| {
                (
                    ErrorKind::DivisionGuardViolation,
                    format!("{} cannot be zero (division by zero in {})", name, usage),
                )
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::columns::{property as p, weather as w};

    fn dataset(headers: &[&str], rows: &[&[&str]]) -> Dataset {
        Dataset::from_raw(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    fn rule_errors(rule: FieldRule, value: Value) -> Vec<(ErrorKind, String)> {
        check_value(&rule, &value)
    }

    #[test]
    fn test_missing_mandatory_stops_rule() {
        let rule = FieldRule::mandatory("Acreage", LogicalType::Number).with(Constraint::NonNegative);
        let errors = rule_errors(rule, Value::Text("   ".into()));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, ErrorKind::MissingValue);
        assert_eq!(errors[0].1, "Mandatory field 'Acreage' is missing or empty");
    }

    #[test]
    fn test_optional_null_is_silent() {
        let rule = FieldRule::optional("State", LogicalType::Text)
            .strict()
            .with(Constraint::Length(2));
        assert!(rule_errors(rule, Value::Null).is_empty());
    }

    #[test]
    fn test_strict_number_rejects_text() {
        let rule = FieldRule::mandatory("Neighborhood", LogicalType::Number).strict();
        let errors = rule_errors(rule.clone(), Value::Text("3127".into()));
        assert_eq!(errors[0].0, ErrorKind::TypeMismatch);
        assert_eq!(errors[0].1, "Neighborhood should be numeric");
        assert!(rule_errors(rule, Value::Integer(3127)).is_empty());
    }

    #[test]
    fn test_coercible_number_accepts_text() {
        let rule = FieldRule::mandatory("Sale Price", LogicalType::Number);
        assert!(rule_errors(rule.clone(), Value::Text(" 1200 ".into())).is_empty());
        assert_eq!(
            rule_errors(rule, Value::Text("abc".into()))[0].0,
            ErrorKind::TypeMismatch
        );
    }

    #[test]
    fn test_grade_pattern() {
        let rule = FieldRule::optional("Grade", LogicalType::Text)
            .strict()
            .with(Constraint::pattern("[A-Z][+-]?", "be a grade").unwrap());
        assert!(rule_errors(rule.clone(), Value::Text("B+".into())).is_empty());
        assert!(rule_errors(rule.clone(), Value::Text(" C ".into())).is_empty());
        let errors = rule_errors(rule, Value::Text("b".into()));
        assert_eq!(errors[0].0, ErrorKind::FormatViolation);
    }

    #[test]
    fn test_year_built_range() {
        let rule = FieldRule::mandatory("Year Built", LogicalType::Number).with(Constraint::Range {
            min: crate::schema::Bound::Fixed(1700.0),
            max: crate::schema::Bound::CurrentYear,
        });
        let errors = rule_errors(rule.clone(), Value::Integer(1650));
        assert_eq!(errors[0].0, ErrorKind::RangeViolation);
        assert!(errors[0].1.starts_with("Year Built (1650) is outside reasonable range [1700, "));
        assert!(rule_errors(rule.clone(), Value::Integer(1990)).is_empty());
        assert_eq!(rule_errors(rule, Value::Integer(3000))[0].0, ErrorKind::RangeViolation);
    }

    #[test]
    fn test_division_guard() {
        let rule = FieldRule::mandatory("Finished Area", LogicalType::Number)
            .with(Constraint::non_zero("price per square foot"));
        let errors = rule_errors(rule, Value::Float(0.0));
        assert_eq!(errors[0].0, ErrorKind::DivisionGuardViolation);
        assert_eq!(
            errors[0].1,
            "Finished Area cannot be zero (division by zero in price per square foot)"
        );
    }

    #[test]
    fn test_non_negative_integer() {
        let rule = FieldRule::mandatory("Bedrooms", LogicalType::Number)
            .with(Constraint::NonNegativeInteger);
        assert!(rule_errors(rule.clone(), Value::Float(3.0)).is_empty());
        assert_eq!(rule_errors(rule.clone(), Value::Float(2.5)).len(), 1);
        assert_eq!(rule_errors(rule, Value::Integer(-1)).len(), 1);
    }

    #[test]
    fn test_time_exceptions() {
        let schema = Schema::weather().unwrap();
        let rule = schema.rule(w::MOONRISE).unwrap().clone();
        assert!(rule_errors(rule.clone(), Value::Text("06:42 AM".into())).is_empty());
        assert!(rule_errors(rule.clone(), Value::Text("no moonrise".into())).is_empty());
        let errors = rule_errors(rule, Value::Text("25:00".into()));
        assert_eq!(errors[0].0, ErrorKind::FormatViolation);
        assert_eq!(
            errors[0].1,
            "'moonrise' is not in 'HH:MM AM/PM' format or a valid exception"
        );
    }

    #[test]
    fn test_moon_phase_ignores_case() {
        let schema = Schema::weather().unwrap();
        let rule = schema.rule(w::MOON_PHASE).unwrap().clone();
        assert!(rule_errors(rule.clone(), Value::Text("waxing gibbous".into())).is_empty());
        assert_eq!(rule_errors(rule, Value::Text("Blue Moon".into())).len(), 1);
    }

    #[test]
    fn test_errors_ordered_by_row_then_rule() {
        let validator = RecordValidator::for_kind(DatasetKind::PropertySale).unwrap();
        let data = dataset(
            &[p::GRADE, p::STATE],
            &[&["b", "TNN"], &["A", "TN"], &["z", "T"]],
        );
        let report = validator.validate(&data);

        // Every mandatory column is absent, so every row is invalid.
        assert_eq!(report.invalid_count, 3);
        assert_eq!(report.valid_count, 0);

        let row0: Vec<_> = report
            .errors
            .iter()
            .filter(|e| e.record_index == Some(0))
            .map(|e| e.field.as_str())
            .collect();
        let state_pos = row0.iter().position(|f| *f == p::STATE).unwrap();
        let grade_pos = row0.iter().position(|f| *f == p::GRADE).unwrap();
        assert!(state_pos < grade_pos);

        let last_row0 = report.errors.iter().rposition(|e| e.record_index == Some(0)).unwrap();
        let first_row1 = report.errors.iter().position(|e| e.record_index == Some(1)).unwrap();
        assert!(last_row0 < first_row1);
    }

    #[test]
    fn test_weather_missing_columns_reported_once() {
        let validator = RecordValidator::for_kind(DatasetKind::Weather).unwrap();
        let schema = validator.schema().clone();
        let mut headers: Vec<&str> = schema.field_names();
        headers.retain(|h| *h != w::SUNSET && *h != w::MOONSET);
        let data = Dataset::new(headers.iter().map(|s| s.to_string()).collect(), vec![]);

        let report = validator.validate(&data);
        let missing: Vec<_> = report
            .errors
            .iter()
            .filter(|e| e.kind == ErrorKind::MissingColumn)
            .map(|e| e.field.as_str())
            .collect();
        assert_eq!(missing, vec![w::SUNSET, w::MOONSET]);
        assert!(report.errors.iter().all(|e| e.record_index.is_none()));
    }

    #[test]
    fn test_weather_mostly_missing_skips_records() {
        let validator = RecordValidator::for_kind(DatasetKind::Weather).unwrap();
        let data = dataset(&[w::COUNTRY, w::LOCATION_NAME], &[&["", ""], &["France", "Paris"]]);
        let report = validator.validate(&data);

        assert_eq!(report.errors.len(), 39);
        assert_eq!(report.valid_count + report.invalid_count, 2);
        assert!(report.error_rows.is_empty());
    }

    #[test]
    fn test_filter_valid_detects_drift() {
        let validator = RecordValidator::for_kind(DatasetKind::PropertySale).unwrap();
        let data = dataset(&[p::GRADE], &[&["A"], &["B"]]);
        let report = validator.validate(&data);

        let mut reordered = data.clone();
        reordered.rows.swap(0, 1);
        let err = filter_valid(reordered, &report).unwrap_err();
        assert!(matches!(err, DualcheckError::IndexDrift { .. }));

        let filtered = filter_valid(data, &report).unwrap();
        assert!(filtered.is_empty());
    }
}
