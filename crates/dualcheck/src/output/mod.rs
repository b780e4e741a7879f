//! Persistence of processed datasets.

mod blob;
mod local;

pub use blob::{BlobSink, SAS_ENV_VAR};
pub use local::LocalCsvSink;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::{DualcheckError, Result};
use crate::input::Dataset;

/// Somewhere a processed dataset can be written.
pub trait Sink {
    /// Short identifier used in reports.
    fn name(&self) -> &str;

    /// Persist `data` under the logical file name `file_name`.
    fn persist(&self, data: &Dataset, file_name: &str) -> Result<PersistOutcome>;
}

/// Where a dataset ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistOutcome {
    pub sink: String,
    pub location: String,
    pub bytes: usize,
}

/// Render a dataset as CSV with a header row. Nulls are empty cells.
pub fn to_csv_bytes(data: &Dataset) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&data.headers)?;
    for row in &data.rows {
        writer.write_record(row.iter().map(ToString::to_string))?;
    }
    writer
        .into_inner()
        .map_err(|e| DualcheckError::Csv(e.into_error().into()))
}

/// `<stem>_<YYYYmmdd_HHMMSS>.csv` when timestamped, otherwise `<stem>.csv`.
/// A trailing `.csv` on `stem` is not repeated.
pub fn output_file_name(stem: &str, timestamped: bool, now: DateTime<Local>) -> String {
    let stem = stem.strip_suffix(".csv").unwrap_or(stem);
    if timestamped {
        format!("{}_{}.csv", stem, now.format("%Y%m%d_%H%M%S"))
    } else {
        format!("{}.csv", stem)
    }
}
