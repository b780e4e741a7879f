//! Run command - the full load, validate, derive, reconcile, persist cycle.

use std::path::PathBuf;

use colored::Colorize;
use dualcheck::{DualcheckError, Mode, Pipeline, RunReport};

use super::{build_config, print_header, print_reconciliation, print_validation, CmdResult};
use crate::cli::PipelineArgs;

pub fn run(
    source: Option<PathBuf>,
    args: PipelineArgs,
    mode: Option<Mode>,
    output: Option<PathBuf>,
    no_timestamp: bool,
) -> CmdResult {
    let mut config = build_config(&args)?;
    if let Some(mode) = mode {
        config.mode = mode;
    }
    if let Some(dir) = output {
        config.output.local_dir = dir;
    }
    if no_timestamp {
        config.output.timestamped = false;
    }

    let source = super::resolve_source(source, &config)?;
    let pipeline = Pipeline::new(config)?;

    match pipeline.run(&source) {
        Ok(report) => {
            if args.json {
                println!("{}", report.to_json()?);
            } else {
                print_report(&report);
            }
            Ok(())
        }
        Err(DualcheckError::ValidationFailed { summary, sample }) if !args.json => {
            print_header("Validation failed for", source.to_string());
            print_validation(&summary, &sample);
            println!(
                "{}",
                "Strict mode: nothing was derived or written. Re-run with --mode lenient to drop invalid records."
                    .yellow()
            );
            Err(format!("{} of {} records invalid", summary.invalid, summary.total).into())
        }
        Err(e) => Err(e.into()),
    }
}

fn print_report(report: &RunReport) {
    print_header(&format!("Processed {} data from", report.kind), &report.source);

    print_validation(&report.validation, &report.validation_sample);

    println!("{}", "Derivation:".yellow().bold());
    println!(
        "  Rows:     {} -> {}",
        report.derivation.rows_in,
        report.derivation.rows_out.to_string().white()
    );
    let added = report.derivation.columns_added();
    if !added.is_empty() {
        println!("  Added:    {}", added.join(", ").green());
    }
    println!();

    print_reconciliation(&report.reconciliation, &report.reconciliation_sample);

    if !report.persisted.is_empty() {
        println!("{}", "Output:".yellow().bold());
        for outcome in &report.persisted {
            println!(
                "  {:<8} {} ({} bytes)",
                outcome.sink,
                outcome.location.white(),
                outcome.bytes
            );
        }
    }
}
