//! CLI command implementations.

pub mod reconcile;
pub mod run;
pub mod validate;
pub mod watch;

use std::path::{Path, PathBuf};

use colored::Colorize;
use dualcheck::reconcile::ReconciliationSummary;
use dualcheck::validation::ValidationSummary;
use dualcheck::{PipelineConfig, SourceDescriptor};

use crate::cli::PipelineArgs;

type CmdResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Start from the config file when given, then apply flags on top.
pub(crate) fn build_config(args: &PipelineArgs) -> CmdResult<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(kind) = args.kind {
        config.kind = kind;
    }
    if let Some(limit) = args.limit {
        config.report_limit = limit;
    }
    Ok(config)
}

/// The positional source wins over `input.path` from the config.
pub(crate) fn resolve_source(
    source: Option<PathBuf>,
    config: &PipelineConfig,
) -> CmdResult<SourceDescriptor> {
    match source.or_else(|| config.input.path.clone()) {
        Some(path) => Ok(SourceDescriptor::from_path(path)),
        None => Err("No input given. Pass a SOURCE path or set input.path in the config.".into()),
    }
}

pub(crate) fn print_header(title: &str, subject: impl AsRef<Path>) {
    println!(
        "{} {}",
        title.cyan().bold(),
        subject.as_ref().display().to_string().white()
    );
    println!();
}

pub(crate) fn print_validation(summary: &ValidationSummary, sample: &[String]) {
    println!("{}", "Validation:".yellow().bold());
    println!("  Records:  {}", summary.total.to_string().white());
    println!("  Valid:    {}", summary.valid.to_string().green());
    println!("  Invalid:  {}", colour_count(summary.invalid));
    println!("  Errors:   {}", colour_count(summary.error_count));
    print_sample(sample, summary.error_count);
}

pub(crate) fn print_reconciliation(summary: &ReconciliationSummary, sample: &[String]) {
    println!("{}", "Reconciliation:".yellow().bold());
    println!("  Records:  {}", summary.total.to_string().white());
    println!("  Flagged:  {}", colour_count(summary.flagged));
    if summary.valid < 0 {
        println!("  Valid:    {}", summary.valid.to_string().red());
    } else {
        println!("  Valid:    {}", summary.valid.to_string().green());
    }
    print_sample(sample, summary.flag_count);
}

fn print_sample(sample: &[String], total: usize) {
    for message in sample {
        println!("    {} {}", "-".dimmed(), message);
    }
    if total > sample.len() {
        println!(
            "    {}",
            format!("... and {} more", total - sample.len()).dimmed()
        );
    }
    println!();
}

fn colour_count(n: usize) -> colored::ColoredString {
    if n == 0 {
        n.to_string().green()
    } else {
        n.to_string().red()
    }
}
