//! Pipeline configuration, loadable from TOML.
//!
//! ```toml
//! kind = "weather"
//! mode = "lenient"
//! report_limit = 10
//!
//! [input]
//! path = "data/incoming"
//! max_rows = 100000
//!
//! [output]
//! local_dir = "data/processed"
//! timestamped = true
//!
//! [output.blob]
//! endpoint = "https://account.blob.core.windows.net"
//! container = "processed"
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DualcheckError, Result};
use crate::input::LoaderConfig;
use crate::schema::DatasetKind;

/// What the pipeline does when validation finds errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Abort before derivation.
    #[default]
    Strict,
    /// Drop invalid rows and continue.
    Lenient,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Strict => write!(f, "strict"),
            Mode::Lenient => write!(f, "lenient"),
        }
    }
}

impl FromStr for Mode {
    type Err = DualcheckError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(Mode::Strict),
            "lenient" | "proceed" => Ok(Mode::Lenient),
            _ => Err(DualcheckError::Config(format!(
                "Unknown mode: {}. Use: strict or lenient.",
                s
            ))),
        }
    }
}

/// Where input comes from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// A file, or a directory whose newest file is used.
    pub path: Option<PathBuf>,
    /// Field delimiter; detected when unset.
    pub delimiter: Option<char>,
    /// Read at most this many records from each file.
    pub max_rows: Option<usize>,
}

/// Remote blob storage target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobConfig {
    pub endpoint: String,
    pub container: String,
    /// Falls back to the `DUALCHECK_BLOB_SAS` environment variable.
    #[serde(default, skip_serializing)]
    pub sas_token: Option<String>,
}

/// Where output goes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub local_dir: PathBuf,
    /// File stem; defaults to one derived from the dataset kind.
    pub file_name: Option<String>,
    /// Append `_YYYYmmdd_HHMMSS` to the file stem.
    pub timestamped: bool,
    pub blob: Option<BlobConfig>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            local_dir: PathBuf::from("output"),
            file_name: None,
            timestamped: true,
            blob: None,
        }
    }
}

/// Full configuration for one pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub kind: DatasetKind,
    pub mode: Mode,
    pub input: InputConfig,
    pub output: OutputConfig,
    /// Messages shown from each report.
    pub report_limit: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            kind: DatasetKind::default(),
            mode: Mode::default(),
            input: InputConfig::default(),
            output: OutputConfig::default(),
            report_limit: 10,
        }
    }
}

impl PipelineConfig {
    pub fn for_kind(kind: DatasetKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// Load and check a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| DualcheckError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.check()?;
        Ok(config)
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output.local_dir = dir.into();
        self
    }

    pub fn with_report_limit(mut self, limit: usize) -> Self {
        self.report_limit = limit;
        self
    }

    /// File stem for persisted output.
    pub fn output_stem(&self) -> &str {
        self.output
            .file_name
            .as_deref()
            .unwrap_or_else(|| self.kind.output_stem())
    }

    /// Loader settings derived from the input section.
    pub fn loader_config(&self) -> Result<LoaderConfig> {
        let delimiter = match self.input.delimiter {
            Some(c) if c.is_ascii() => Some(c as u8),
            Some(c) => {
                return Err(DualcheckError::Config(format!(
                    "Delimiter must be a single ASCII character, got '{}'",
                    c
                )));
            }
            None => None,
        };
        Ok(LoaderConfig {
            delimiter,
            max_rows: self.input.max_rows,
            ..Default::default()
        })
    }

    fn check(&self) -> Result<()> {
        self.loader_config()?;
        if let Some(blob) = &self.output.blob {
            if blob.endpoint.trim().is_empty() || blob.container.trim().is_empty() {
                return Err(DualcheckError::Config(
                    "Blob output needs both an endpoint and a container".to_string(),
                ));
            }
        }
        Ok(())
    }
}
