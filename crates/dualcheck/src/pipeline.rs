//! Orchestrates load, validation, derivation, reconciliation and persistence.

use chrono::{DateTime, Local, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{Mode, PipelineConfig};
use crate::derive::{DerivationEngine, DerivationReport};
use crate::error::{DualcheckError, Result};
use crate::input::{CsvLoader, Dataset, Loader, SourceDescriptor};
use crate::output::{output_file_name, BlobSink, LocalCsvSink, PersistOutcome, Sink};
use crate::reconcile::{ReconciliationEngine, ReconciliationReport, ReconciliationSummary};
use crate::schema::DatasetKind;
use crate::validation::{filter_valid, RecordValidator, ValidationReport, ValidationSummary};

/// Pipeline stages, in the order a run can pass through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Load,
    Validate,
    Abort,
    Proceed,
    Derive,
    Reconcile,
    Persist,
}

/// Everything a caller needs to report on a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub kind: DatasetKind,
    pub mode: Mode,
    pub source: String,
    pub started_at: DateTime<Utc>,
    pub validation: ValidationSummary,
    pub validation_sample: Vec<String>,
    pub errors_by_field: IndexMap<String, usize>,
    pub derivation: DerivationReport,
    pub reconciliation: ReconciliationSummary,
    pub reconciliation_sample: Vec<String>,
    pub flagged_rows: Vec<usize>,
    pub persisted: Vec<PersistOutcome>,
    pub stages: Vec<Stage>,
}

impl RunReport {
    /// Pretty-printed JSON form of the report.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// One configured pipeline. Runs are independent of each other.
pub struct Pipeline {
    config: PipelineConfig,
    validator: RecordValidator,
    engine: DerivationEngine,
    reconciler: ReconciliationEngine,
    loader: Box<dyn Loader>,
    sinks: Vec<Box<dyn Sink>>,
}

impl Pipeline {
    /// Pipeline with a CSV loader and the sinks named in the config.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let loader = CsvLoader::with_config(config.loader_config()?);

        let mut sinks: Vec<Box<dyn Sink>> =
            vec![Box::new(LocalCsvSink::new(config.output.local_dir.clone()))];
        if let Some(blob) = &config.output.blob {
            sinks.push(Box::new(BlobSink::from_config(blob)?));
        }

        Ok(Self {
            validator: RecordValidator::for_kind(config.kind)?,
            engine: DerivationEngine::for_kind(config.kind),
            reconciler: ReconciliationEngine::for_kind(config.kind),
            loader: Box::new(loader),
            sinks,
            config,
        })
    }

    /// Replace the loader.
    pub fn with_loader(mut self, loader: impl Loader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    /// Add a sink.
    pub fn with_sink(mut self, sink: impl Sink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Drop every sink, so runs stop after reconciliation.
    pub fn without_sinks(mut self) -> Self {
        self.sinks.clear();
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load the source only.
    pub fn load(&self, source: &SourceDescriptor) -> Result<Dataset> {
        let data = self.loader.load(source)?;
        if data.is_empty() {
            return Err(DualcheckError::NoSourceData(source.to_string()));
        }
        info!(
            source = %source,
            rows = data.row_count(),
            columns = data.column_count(),
            "loaded dataset"
        );
        Ok(data)
    }

    /// Validate without deriving anything.
    pub fn validate(&self, data: &Dataset) -> ValidationReport {
        self.validator.validate(data)
    }

    /// Reconcile an already enriched dataset.
    pub fn reconcile(&self, data: &Dataset) -> ReconciliationReport {
        self.reconciler.reconcile(data)
    }

    /// Load the source and process it.
    pub fn run(&self, source: &SourceDescriptor) -> Result<RunReport> {
        let data = self.load(source)?;
        let (_, report) = self.process(data, &source.to_string())?;
        Ok(report)
    }

    /// Validate, derive, reconcile and persist an in-memory dataset.
    ///
    /// Returns the enriched dataset together with the run report.
    pub fn process(&self, data: Dataset, source: &str) -> Result<(Dataset, RunReport)> {
        let started_at = Utc::now();
        let limit = self.config.report_limit;
        let mut stages = vec![Stage::Load, Stage::Validate];

        let validation = self.validator.validate(&data);
        let summary = validation.summary();

        let data = if validation.is_clean() {
            stages.push(Stage::Proceed);
            data
        } else {
            match self.config.mode {
                Mode::Strict => {
                    warn!(
                        invalid = summary.invalid,
                        errors = summary.error_count,
                        "validation failed, aborting"
                    );
                    return Err(DualcheckError::ValidationFailed {
                        summary,
                        sample: validation.sample(limit),
                    });
                }
                Mode::Lenient => {
                    stages.push(Stage::Proceed);
                    let filtered = filter_valid(data, &validation)?;
                    warn!(
                        invalid = summary.invalid,
                        errors = summary.error_count,
                        remaining = filtered.row_count(),
                        "proceeding despite validation errors"
                    );
                    filtered
                }
            }
        };

        stages.push(Stage::Derive);
        let (data, derivation) = self.engine.run(data)?;

        stages.push(Stage::Reconcile);
        let reconciliation = self.reconciler.reconcile(&data);

        let mut persisted = Vec::with_capacity(self.sinks.len());
        if !self.sinks.is_empty() {
            stages.push(Stage::Persist);
            let file_name = output_file_name(
                self.config.output_stem(),
                self.config.output.timestamped,
                Local::now(),
            );
            for sink in &self.sinks {
                persisted.push(sink.persist(&data, &file_name)?);
            }
        }

        info!(
            kind = %self.config.kind,
            rows = data.row_count(),
            flagged = reconciliation.flagged_count,
            sinks = persisted.len(),
            "pipeline run complete"
        );

        let report = RunReport {
            kind: self.config.kind,
            mode: self.config.mode,
            source: source.to_string(),
            started_at,
            validation: summary,
            validation_sample: validation.sample(limit),
            errors_by_field: validation.errors_by_field(),
            derivation,
            reconciliation: reconciliation.summary(),
            reconciliation_sample: reconciliation.sample(limit),
            flagged_rows: reconciliation.flagged_labels().into_iter().collect(),
            persisted,
            stages,
        };
        Ok((data, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Value;
    use crate::schema::columns::weather as w;

    struct FixedLoader(Dataset);

    impl Loader for FixedLoader {
        fn load(&self, _source: &SourceDescriptor) -> Result<Dataset> {
            Ok(self.0.clone())
        }
    }

    fn empty_weather() -> Dataset {
        Dataset::new(vec![w::COUNTRY.to_string()], Vec::<Vec<Value>>::new())
    }

    #[test]
    fn test_empty_source_is_fatal() {
        let pipeline = Pipeline::new(PipelineConfig::for_kind(DatasetKind::Weather))
            .unwrap()
            .without_sinks()
            .with_loader(FixedLoader(empty_weather()));
        let err = pipeline
            .run(&SourceDescriptor::File("weather.csv".into()))
            .unwrap_err();
        assert!(matches!(err, DualcheckError::NoSourceData(_)));
    }

    #[test]
    fn test_report_json() {
        let config = PipelineConfig::for_kind(DatasetKind::Weather).with_mode(Mode::Lenient);
        let pipeline = Pipeline::new(config)
            .unwrap()
            .without_sinks();
        let data = Dataset::new(
            vec![w::TEMPERATURE_CELSIUS.to_string()],
            vec![vec![Value::Float(12.0)]],
        );
        let (_, report) = pipeline.process(data, "memory").unwrap();

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["kind"], "weather");
        assert_eq!(json["stages"][0], "load");
        assert_eq!(json["stages"].as_array().unwrap().last().unwrap(), "reconcile");
    }

    #[test]
    fn test_strict_abort_carries_sample() {
        let pipeline = Pipeline::new(PipelineConfig::for_kind(DatasetKind::Weather).with_report_limit(2))
            .unwrap()
            .without_sinks();
        let data = Dataset::new(
            vec![w::COUNTRY.to_string()],
            vec![vec![Value::from("France")]],
        );
        match pipeline.process(data, "memory") {
            Err(DualcheckError::ValidationFailed { summary, sample }) => {
                assert_eq!(summary.total, 1);
                assert_eq!(sample.len(), 2);
            }
            other => panic!("expected ValidationFailed, got {:?}", other.map(|(_, r)| r.stages)),
        }
    }
}
