//! Validate command - record checks only.

use std::path::PathBuf;

use colored::Colorize;
use dualcheck::Pipeline;

use super::{build_config, print_header, print_validation, CmdResult};
use crate::cli::PipelineArgs;

pub fn run(source: Option<PathBuf>, args: PipelineArgs) -> CmdResult {
    let config = build_config(&args)?;
    let limit = config.report_limit;
    let source = super::resolve_source(source, &config)?;
    let kind = config.kind;

    let pipeline = Pipeline::new(config)?.without_sinks();
    let data = pipeline.load(&source)?;
    let report = pipeline.validate(&data);
    let summary = report.summary();

    if args.json {
        let body = serde_json::json!({
            "kind": kind,
            "source": source.to_string(),
            "summary": summary,
            "errors_by_field": report.errors_by_field(),
            "errors": report.errors.iter().take(limit).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        print_header(&format!("Validated {} data from", kind), source.to_string());
        print_validation(&summary, &report.sample(limit));

        let by_field = report.errors_by_field();
        if !by_field.is_empty() {
            println!("{}", "Errors by field:".yellow().bold());
            for (field, count) in &by_field {
                println!("  {:<24} {}", field, count.to_string().red());
            }
        }
    }

    if report.is_clean() {
        Ok(())
    } else {
        Err(format!("{} of {} records invalid", summary.invalid, summary.total).into())
    }
}
