//! CSV loader with delimiter detection.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{DualcheckError, Result};

use super::dataset::Dataset;
use super::discovery::latest_file;
use super::source::{Loader, SourceDescriptor, SourceMetadata};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b',', b'\t', b';', b'|'];

/// Loader configuration.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            max_rows: None,
            quote: b'"',
        }
    }
}

/// Reads delimited text files into typed datasets.
pub struct CsvLoader {
    config: LoaderConfig,
}

impl CsvLoader {
    pub fn new() -> Self {
        Self::with_config(LoaderConfig::default())
    }

    pub fn with_config(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Load a file and return the dataset and its metadata.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<(Dataset, SourceMetadata)> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DualcheckError::NotFound(path.to_path_buf()));
        }

        let contents = fs::read(path).map_err(|e| DualcheckError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(&contents)?,
        };
        debug!(file = %path.display(), delimiter = %(delimiter as char).escape_default(), "parsing");

        let dataset = self.parse_bytes(&contents, delimiter)?;

        let format = match delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        }
        .to_string();

        let metadata = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            contents.len() as u64,
            format,
            dataset.row_count(),
            dataset.column_count(),
        );

        info!(
            file = %metadata.file,
            rows = metadata.row_count,
            columns = metadata.column_count,
            "loaded source"
        );

        Ok((dataset, metadata))
    }

    /// Parse bytes directly.
    pub fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<Dataset> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(DualcheckError::EmptyData("No columns found".to_string()));
        }

        let width = headers.len();
        let mut rows = Vec::new();
        for (row_idx, record) in reader.records().enumerate() {
            if self.config.max_rows.is_some_and(|max| row_idx >= max) {
                break;
            }

            let record = record?;
            let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
            // Ragged rows are padded with empty cells or truncated.
            row.resize(width, String::new());
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(DualcheckError::EmptyData("No data rows found".to_string()));
        }

        Ok(Dataset::from_raw(headers, rows))
    }
}

impl Default for CsvLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Loader for CsvLoader {
    fn load(&self, source: &SourceDescriptor) -> Result<Dataset> {
        let path = match source {
            SourceDescriptor::File(path) => path.clone(),
            SourceDescriptor::LatestIn(dir) => {
                let path = latest_file(dir)?;
                info!(file = %path.display(), "picked most recent file");
                path
            }
        };
        self.load_file(path).map(|(dataset, _)| dataset)
    }
}

/// Detect the delimiter from the first few non-blank lines.
///
/// The delimiter that appears the same number of times on every line wins;
/// otherwise the one with the highest, least variable count.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let lines: Vec<String> = BufReader::new(bytes)
        .lines()
        .take(10)
        .map_while(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(DualcheckError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best = (b',', 0usize);
    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines.iter().map(|l| count_unquoted(l, delim)).collect();
        let first = counts[0];
        if first == 0 {
            continue;
        }

        let score = if counts.iter().all(|&c| c == first) {
            first * 1000
        } else {
            let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
            let variance = counts.iter().map(|&c| (c as f64 - mean).powi(2)).sum::<f64>()
                / counts.len() as f64;
            if variance < 1.0 { first * 100 } else { first }
        };

        if score > best.1 {
            best = (delim, score);
        }
    }

    Ok(best.0)
}

/// Count delimiter occurrences outside double quotes.
fn count_unquoted(line: &str, delimiter: u8) -> usize {
    let delim = delimiter as char;
    let mut in_quotes = false;
    line.chars()
        .filter(|&ch| {
            if ch == '"' {
                in_quotes = !in_quotes;
            }
            ch == delim && !in_quotes
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Value;
    use std::io::Write;

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter(b"a,b,c\n1,2,3\n4,5,6").unwrap(), b',');
        assert_eq!(detect_delimiter(b"a\tb\tc\n1\t2\t3").unwrap(), b'\t');
        // Commas inside quotes don't count.
        assert_eq!(
            detect_delimiter(b"name;note\n\"Smith, John\";x\n\"Doe, Jane\";y").unwrap(),
            b';'
        );
    }

    #[test]
    fn test_parse_csv() {
        let loader = CsvLoader::new();
        let data = b"name,age,city\nAlice,30,NYC\nBob,25,LA";
        let dataset = loader.parse_bytes(data, b',').unwrap();

        assert_eq!(dataset.headers, vec!["name", "age", "city"]);
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.get(0, "name"), Some(&Value::Text("Alice".into())));
        assert_eq!(dataset.get(1, "age"), Some(&Value::Integer(25)));
    }

    #[test]
    fn test_ragged_rows() {
        let loader = CsvLoader::new();
        let dataset = loader.parse_bytes(b"a,b,c\n1,2\n3,4,5,6", b',').unwrap();
        assert_eq!(dataset.get(0, "c"), Some(&Value::Null));
        assert_eq!(dataset.rows[1].len(), 3);
    }

    #[test]
    fn test_max_rows() {
        let loader = CsvLoader::with_config(LoaderConfig {
            max_rows: Some(2),
            ..Default::default()
        });
        let dataset = loader.parse_bytes(b"a\n1\n2\n3\n", b',').unwrap();
        assert_eq!(dataset.row_count(), 2);
    }

    #[test]
    fn test_header_only_is_empty() {
        let loader = CsvLoader::new();
        assert!(matches!(
            loader.parse_bytes(b"a,b\n", b','),
            Err(DualcheckError::EmptyData(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let loader = CsvLoader::new();
        let err = loader
            .load(&SourceDescriptor::File("/definitely/not/here.csv".into()))
            .unwrap_err();
        assert!(matches!(err, DualcheckError::NotFound(_)));
    }

    #[test]
    fn test_load_file_metadata() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"x\ty\n1\t2\n").unwrap();

        let (dataset, meta) = CsvLoader::new().load_file(file.path()).unwrap();
        assert_eq!(meta.format, "tsv");
        assert_eq!(meta.row_count, 1);
        assert!(meta.hash.starts_with("sha256:"));
        assert_eq!(dataset.headers, vec!["x", "y"]);
    }
}
