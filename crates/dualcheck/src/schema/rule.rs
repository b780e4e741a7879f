//! Field-level validation contracts.

use chrono::{Datelike, Utc};
use regex::Regex;

use crate::error::Result;

use super::types::{LogicalType, Requirement, Strictness};

/// Upper or lower limit of a numeric range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Fixed(f64),
    /// The calendar year at validation time.
    CurrentYear,
}

impl Bound {
    pub fn resolve(&self) -> f64 {
        match self {
            Bound::Fixed(v) => *v,
            Bound::CurrentYear => Utc::now().year() as f64,
        }
    }
}

/// A structural constraint on a present, correctly typed value.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// The trimmed value must fully match a pattern.
    Pattern { regex: Regex, requirement: String },
    /// Text length must be exactly this many characters.
    Length(usize),
    /// Value must be one of a fixed set.
    OneOf {
        values: Vec<String>,
        case_insensitive: bool,
    },
    /// Numeric value must lie within an inclusive range.
    Range { min: Bound, max: Bound },
    /// Numeric value must be zero or more.
    NonNegative,
    /// Numeric value must be a whole number, zero or more.
    NonNegativeInteger,
    /// Numeric value must not be zero; `usage` names the downstream division.
    NonZero { usage: String },
}

impl Constraint {
    /// Build a full-match pattern constraint. `requirement` completes the
    /// sentence "must ...".
    pub fn pattern(pattern: &str, requirement: &str) -> Result<Self> {
        // Anchored so that a partial match never passes.
        let regex = Regex::new(&format!("^(?:{})$", pattern))?;
        Ok(Constraint::Pattern {
            regex,
            requirement: requirement.to_string(),
        })
    }

    pub fn one_of(values: &[&str]) -> Self {
        Constraint::OneOf {
            values: values.iter().map(|s| s.to_string()).collect(),
            case_insensitive: false,
        }
    }

    pub fn one_of_ignore_case(values: &[&str]) -> Self {
        Constraint::OneOf {
            values: values.iter().map(|s| s.to_string()).collect(),
            case_insensitive: true,
        }
    }

    pub fn non_zero(usage: &str) -> Self {
        Constraint::NonZero {
            usage: usage.to_string(),
        }
    }
}

/// The validation contract for one column.
#[derive(Debug, Clone)]
pub struct FieldRule {
    /// Column name.
    pub name: String,
    /// Mandatory or optional.
    pub requirement: Requirement,
    /// Expected logical type.
    pub logical_type: LogicalType,
    /// How the type is checked.
    pub strictness: Strictness,
    /// Checked in order after the type check passes.
    pub constraints: Vec<Constraint>,
}

impl FieldRule {
    pub fn mandatory(name: &str, logical_type: LogicalType) -> Self {
        Self::new(name, Requirement::Mandatory, logical_type)
    }

    pub fn optional(name: &str, logical_type: LogicalType) -> Self {
        Self::new(name, Requirement::Optional, logical_type)
    }

    fn new(name: &str, requirement: Requirement, logical_type: LogicalType) -> Self {
        Self {
            name: name.to_string(),
            requirement,
            logical_type,
            strictness: Strictness::default(),
            constraints: Vec::new(),
        }
    }

    /// Require the type to be present from ingestion rather than convertible.
    pub fn strict(mut self) -> Self {
        self.strictness = Strictness::Strict;
        self
    }

    /// Add a constraint.
    pub fn with(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn is_mandatory(&self) -> bool {
        self.requirement == Requirement::Mandatory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_is_anchored() {
        let Constraint::Pattern { regex, .. } = Constraint::pattern("[A-Z][+-]?", "x").unwrap() else {
            panic!("expected pattern");
        };
        assert!(regex.is_match("B+"));
        assert!(!regex.is_match("BB"));
        assert!(!regex.is_match("xB"));
    }

    #[test]
    fn test_current_year_bound() {
        let year = Bound::CurrentYear.resolve();
        assert!(year >= 2024.0);
        assert_eq!(Bound::Fixed(1700.0).resolve(), 1700.0);
    }

    #[test]
    fn test_builder() {
        let rule = FieldRule::optional("Neighborhood", LogicalType::Number)
            .strict()
            .with(Constraint::NonNegative);
        assert!(!rule.is_mandatory());
        assert_eq!(rule.strictness, Strictness::Strict);
        assert_eq!(rule.constraints.len(), 1);
    }
}
