//! Dualcheck: two-stage validation and derivation engine for tabular ETL.
//!
//! A run loads a snapshot, checks every record against a declarative schema,
//! enriches the surviving records with derived columns and then re-derives
//! those columns independently to catch drift between the two.
//!
//! Two dataset kinds are built in: Nashville property sales and weather
//! observations.
//!
//! # Example
//!
//! ```no_run
//! use dualcheck::{DatasetKind, Mode, Pipeline, PipelineConfig, SourceDescriptor};
//!
//! let config = PipelineConfig::for_kind(DatasetKind::Weather).with_mode(Mode::Lenient);
//! let pipeline = Pipeline::new(config).unwrap();
//! let report = pipeline
//!     .run(&SourceDescriptor::from_path("data/incoming"))
//!     .unwrap();
//!
//! println!("valid records: {}", report.validation.valid);
//! println!("reconciliation flags: {}", report.reconciliation.flag_count);
//! ```

pub mod config;
pub mod derive;
pub mod error;
pub mod input;
pub mod output;
pub mod pipeline;
pub mod reconcile;
pub mod schema;
pub mod validation;

pub use config::{Mode, PipelineConfig};
pub use derive::{DerivationEngine, DerivationReport};
pub use error::{DualcheckError, Result};
pub use input::{CsvLoader, Dataset, Loader, SourceDescriptor, Value};
pub use output::{BlobSink, LocalCsvSink, Sink};
pub use pipeline::{Pipeline, RunReport, Stage};
pub use reconcile::{ReconciliationEngine, ReconciliationReport, ValidationFlag};
pub use schema::{DatasetKind, Schema};
pub use validation::{RecordValidator, ValidationError, ValidationReport};
