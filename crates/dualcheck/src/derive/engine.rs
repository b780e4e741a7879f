//! Runs an ordered plan of derivation steps over a dataset.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::input::Dataset;
use crate::schema::columns::property as p;
use crate::schema::DatasetKind;

use super::steps::DerivationStep;

/// Engine holding a fixed, ordered derivation plan.
pub struct DerivationEngine {
    kind: DatasetKind,
    steps: Vec<DerivationStep>,
}

impl DerivationEngine {
    /// The registered plan for a dataset kind.
    pub fn for_kind(kind: DatasetKind) -> Self {
        let steps = match kind {
            DatasetKind::PropertySale => vec![
                DerivationStep::DropIncompleteRows {
                    columns: p::MANDATORY.iter().map(|c| c.to_string()).collect(),
                },
                DerivationStep::DropColumns {
                    columns: p::DROPPED.iter().map(|c| c.to_string()).collect(),
                },
                DerivationStep::PricePerArea,
                DerivationStep::PropertyAge,
                DerivationStep::SaleYearMonth,
                DerivationStep::LandToBuildingRatio,
                DerivationStep::PriceCategory,
                DerivationStep::OwnerNames,
                DerivationStep::Reindex,
            ],
            // Dedup keys only on raw columns, so running it first keeps the
            // same rows and makes the deviation mean cover exactly the rows
            // that are written out.
            DatasetKind::Weather => vec![
                DerivationStep::RemoveDuplicates,
                DerivationStep::TemperatureCategory,
                DerivationStep::TemperatureDeviation,
                DerivationStep::AirQualityCategory,
            ],
        };
        Self { kind, steps }
    }

    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    pub fn steps(&self) -> &[DerivationStep] {
        &self.steps
    }

    /// Apply every step in order. The first failing step aborts the run.
    pub fn run(&self, mut data: Dataset) -> Result<(Dataset, DerivationReport)> {
        let mut report = DerivationReport::new(data.row_count());

        for step in &self.steps {
            let rows_before = data.row_count();
            let headers_before = data.headers.clone();

            step.apply(&mut data)?;

            let columns_added: Vec<String> = data
                .headers
                .iter()
                .filter(|h| !headers_before.contains(h))
                .cloned()
                .collect();
            let columns_removed: Vec<String> = headers_before
                .into_iter()
                .filter(|h| !data.headers.contains(h))
                .collect();

            let outcome = StepOutcome {
                step: step.name().to_string(),
                description: step.description(),
                rows_before,
                rows_after: data.row_count(),
                columns_added,
                columns_removed,
            };
            debug!(
                step = %outcome.step,
                rows_before = outcome.rows_before,
                rows_after = outcome.rows_after,
                added = ?outcome.columns_added,
                "derivation step applied"
            );
            report.add_outcome(outcome);
        }

        report.rows_out = data.row_count();
        info!(
            kind = %self.kind,
            steps = report.steps_applied,
            rows_in = report.rows_in,
            rows_out = report.rows_out,
            "derivation complete"
        );
        Ok((data, report))
    }
}

/// Result of a derivation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DerivationReport {
    /// Number of steps applied.
    pub steps_applied: usize,

    /// Row count before the first step.
    pub rows_in: usize,

    /// Row count after the last step.
    pub rows_out: usize,

    /// Per-step outcomes, in plan order.
    pub outcomes: Vec<StepOutcome>,
}

impl DerivationReport {
    pub fn new(rows_in: usize) -> Self {
        Self {
            rows_in,
            rows_out: rows_in,
            ..Default::default()
        }
    }

    pub fn add_outcome(&mut self, outcome: StepOutcome) {
        self.steps_applied += 1;
        self.outcomes.push(outcome);
    }

    /// Rows removed across all steps.
    pub fn rows_removed(&self) -> usize {
        self.rows_in.saturating_sub(self.rows_out)
    }

    /// Every column added by the plan, in the order added.
    pub fn columns_added(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .flat_map(|o| o.columns_added.iter().map(String::as_str))
            .collect()
    }
}

/// What a single step changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutcome {
    pub step: String,
    pub description: String,
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_added: Vec<String>,
    pub columns_removed: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Value;
    use crate::schema::columns::weather as w;

    #[test]
    fn test_weather_plan_order() {
        let engine = DerivationEngine::for_kind(DatasetKind::Weather);
        let names: Vec<_> = engine.steps().iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "remove_duplicates",
                "temperature_category",
                "temperature_deviation",
                "air_quality_category"
            ]
        );
    }

    #[test]
    fn test_report_tracks_columns() {
        let data = Dataset::new(
            vec![w::TEMPERATURE_CELSIUS.to_string(), w::AIR_US_EPA_INDEX.to_string()],
            vec![
                vec![Value::Float(12.0), Value::Integer(1)],
                vec![Value::Float(12.0), Value::Integer(1)],
            ],
        );
        let (out, report) = DerivationEngine::for_kind(DatasetKind::Weather).run(data).unwrap();

        assert_eq!(out.row_count(), 1);
        assert_eq!(report.rows_in, 2);
        assert_eq!(report.rows_removed(), 1);
        assert_eq!(
            report.columns_added(),
            vec![w::TEMPERATURE_CATEGORY, w::TEMPERATURE_DEVIATION, w::AIR_QUALITY_CATEGORY]
        );
    }

    #[test]
    fn test_deviation_mean_covers_kept_rows() {
        let data = Dataset::new(
            vec![w::TEMPERATURE_CELSIUS.to_string()],
            vec![
                vec![Value::Float(10.0)],
                vec![Value::Float(10.0)],
                vec![Value::Float(40.0)],
            ],
        );
        let (out, _) = DerivationEngine::for_kind(DatasetKind::Weather).run(data).unwrap();

        assert_eq!(out.row_count(), 2);
        assert_eq!(out.get(0, w::TEMPERATURE_DEVIATION), Some(&Value::Float(-15.0)));
        assert_eq!(out.get(1, w::TEMPERATURE_DEVIATION), Some(&Value::Float(15.0)));
    }

    #[test]
    fn test_missing_mandatory_column_aborts() {
        let data = Dataset::new(vec![p::SALE_PRICE.to_string()], vec![vec![Value::Integer(1)]]);
        let result = DerivationEngine::for_kind(DatasetKind::PropertySale).run(data);
        assert!(result.is_err());
    }
}
