//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use dualcheck::{DatasetKind, Mode};
use std::path::PathBuf;

/// Dualcheck: validate, enrich and reconcile ETL snapshots
#[derive(Parser)]
#[command(name = "dualcheck")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Options shared by every command that builds a pipeline.
#[derive(Args, Clone, Debug, Default)]
pub struct PipelineArgs {
    /// Dataset kind (property-sale or weather)
    #[arg(short, long)]
    pub kind: Option<DatasetKind>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Maximum number of errors or flags to print
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate, derive, reconcile and persist one snapshot
    Run {
        /// Input file, or a directory whose newest file is used
        #[arg(value_name = "SOURCE")]
        source: Option<PathBuf>,

        #[command(flatten)]
        pipeline: PipelineArgs,

        /// What to do with invalid records (strict or lenient)
        #[arg(short, long)]
        mode: Option<Mode>,

        /// Directory for the processed CSV
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write `<stem>.csv` instead of a timestamped name
        #[arg(long)]
        no_timestamp: bool,
    },

    /// Validate a snapshot without deriving anything
    Validate {
        /// Input file, or a directory whose newest file is used
        #[arg(value_name = "SOURCE")]
        source: Option<PathBuf>,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Re-check the derived columns of an already processed file
    Reconcile {
        /// Processed CSV file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Write the flagged rows to this CSV file
        #[arg(long, value_name = "FILE")]
        flagged_out: Option<PathBuf>,
    },

    /// Watch a directory and run the pipeline on each new file
    Watch {
        /// Directory to watch
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,

        /// What to do with invalid records (strict or lenient)
        #[arg(short, long)]
        mode: Option<Mode>,

        /// Directory for processed CSVs
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Milliseconds a new file must stay unchanged before it is processed
        #[arg(long, value_name = "MS", default_value = "2000")]
        settle: u64,

        /// Also process files already present at startup
        #[arg(long)]
        include_existing: bool,
    },
}
