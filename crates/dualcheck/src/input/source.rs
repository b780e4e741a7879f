//! Data source descriptors, metadata and the loader seam.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::dataset::Dataset;

/// Where a pipeline run reads its snapshot from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "path", rename_all = "snake_case")]
pub enum SourceDescriptor {
    /// A specific file.
    File(PathBuf),
    /// The most recently modified file in a directory.
    LatestIn(PathBuf),
}

impl SourceDescriptor {
    /// Pick `LatestIn` for directories and `File` for everything else.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.is_dir() {
            SourceDescriptor::LatestIn(path)
        } else {
            SourceDescriptor::File(path)
        }
    }
}

impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceDescriptor::File(p) => write!(f, "{}", p.display()),
            SourceDescriptor::LatestIn(p) => write!(f, "latest file in {}", p.display()),
        }
    }
}

/// Loads a rectangular dataset from somewhere.
pub trait Loader {
    /// Load the dataset the descriptor points at.
    fn load(&self, source: &SourceDescriptor) -> Result<Dataset>;
}

/// Metadata about the source data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, etc.).
    pub format: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the file was loaded.
    pub loaded_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file that has just been loaded.
    pub fn new(
        path: PathBuf,
        hash: String,
        size_bytes: u64,
        format: String,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            format,
            row_count,
            column_count,
            loaded_at: Utc::now(),
        }
    }
}
