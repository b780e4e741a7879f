//! Local CSV output.

use std::fs;
use std::path::PathBuf;

use tracing::info;

use crate::error::{DualcheckError, Result};
use crate::input::Dataset;

use super::{to_csv_bytes, PersistOutcome, Sink};

/// Writes CSV files into a directory, creating it when needed.
pub struct LocalCsvSink {
    dir: PathBuf,
}

impl LocalCsvSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Sink for LocalCsvSink {
    fn name(&self) -> &str {
        "local"
    }

    fn persist(&self, data: &Dataset, file_name: &str) -> Result<PersistOutcome> {
        fs::create_dir_all(&self.dir).map_err(|e| DualcheckError::Io {
            path: self.dir.clone(),
            source: e,
        })?;

        let path = self.dir.join(file_name);
        let bytes = to_csv_bytes(data)?;
        fs::write(&path, &bytes).map_err(|e| DualcheckError::Io {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), rows = data.row_count(), "wrote processed data");
        Ok(PersistOutcome {
            sink: self.name().to_string(),
            location: path.display().to_string(),
            bytes: bytes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{CsvLoader, Value};
    use tempfile::TempDir;

    #[test]
    fn test_written_file_reads_back() {
        let dir = TempDir::new().unwrap();
        let sink = LocalCsvSink::new(dir.path().join("nested/output"));
        let data = Dataset::new(
            vec!["Owner Name".into(), "Sale Price".into()],
            vec![
                vec![Value::from("SMITH, JOHN"), Value::Integer(120000)],
                vec![Value::Null, Value::Integer(95000)],
            ],
        );

        let outcome = sink.persist(&data, "processed.csv").unwrap();
        assert!(outcome.location.ends_with("processed.csv"));

        let (loaded, _) = CsvLoader::new().load_file(&outcome.location).unwrap();
        assert_eq!(loaded.headers, data.headers);
        assert_eq!(loaded.rows, data.rows);
    }
}
