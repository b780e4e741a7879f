//! Reconcile command - re-check derived columns in a processed file.

use std::fs;
use std::path::PathBuf;

use colored::Colorize;
use dualcheck::output::to_csv_bytes;
use dualcheck::reconcile::flagged_rows;
use dualcheck::{Pipeline, SourceDescriptor};

use super::{build_config, print_header, print_reconciliation, CmdResult};
use crate::cli::PipelineArgs;

pub fn run(file: PathBuf, args: PipelineArgs, flagged_out: Option<PathBuf>) -> CmdResult {
    let config = build_config(&args)?;
    let limit = config.report_limit;
    let kind = config.kind;

    let pipeline = Pipeline::new(config)?.without_sinks();
    let data = pipeline.load(&SourceDescriptor::File(file.clone()))?;
    let report = pipeline.reconcile(&data);

    if let Some(path) = &flagged_out {
        let flagged = flagged_rows(&data, &report);
        fs::write(path, to_csv_bytes(&flagged)?)?;
    }

    if args.json {
        let body = serde_json::json!({
            "kind": kind,
            "file": file.display().to_string(),
            "summary": report.summary(),
            "flags": report.flags.iter().take(limit).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        print_header(&format!("Reconciled {} data in", kind), &file);
        print_reconciliation(&report.summary(), &report.sample(limit));
        if let Some(path) = &flagged_out {
            println!(
                "{} {}",
                "Flagged rows written to".cyan(),
                path.display().to_string().white()
            );
        }
    }

    if report.is_clean() {
        Ok(())
    } else {
        Err(format!("{} reconciliation flags", report.flagged_count).into())
    }
}
