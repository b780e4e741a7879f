//! Watch command - process each snapshot that lands in a directory.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use dualcheck::input::{list_files, DirectoryWatcher};
use dualcheck::{DualcheckError, Mode, Pipeline, SourceDescriptor};
use tracing::{error, info};

use super::{build_config, CmdResult};
use crate::cli::PipelineArgs;

/// How long to block on the watcher before checking for Ctrl+C.
const TICK: Duration = Duration::from_millis(200);

pub fn run(
    dir: PathBuf,
    args: PipelineArgs,
    mode: Option<Mode>,
    output: Option<PathBuf>,
    settle_ms: u64,
    include_existing: bool,
) -> CmdResult {
    if !dir.is_dir() {
        return Err(format!("Not a directory: {}", dir.display()).into());
    }

    let mut config = build_config(&args)?;
    if let Some(mode) = mode {
        config.mode = mode;
    }
    if let Some(out) = output {
        config.output.local_dir = out;
    }
    let kind = config.kind;
    let output_dir = config.output.local_dir.clone();
    let pipeline = Pipeline::new(config)?;

    let mut watcher = DirectoryWatcher::new(&dir, Duration::from_millis(settle_ms))?;
    if same_dir(&output_dir, watcher.dir()) {
        return Err("Output directory must differ from the watched directory".into());
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || r.store(false, Ordering::SeqCst))?;

    println!(
        "{} {}",
        format!("Watching {} for {} data", watcher.dir().display(), kind).cyan().bold(),
        "(Ctrl+C to stop)".dimmed()
    );

    let mut tally = Tally::default();

    for path in list_files(watcher.dir())? {
        watcher.mark_seen(&path);
        if include_existing {
            process(&pipeline, &path, &mut tally);
        }
    }

    while running.load(Ordering::SeqCst) {
        if let Some(path) = watcher.next_file(TICK)? {
            process(&pipeline, &path, &mut tally);
        }
    }

    println!();
    println!(
        "Stopped. {} processed, {} failed.",
        tally.processed.to_string().green(),
        tally.failed.to_string().red()
    );
    Ok(())
}

#[derive(Default)]
struct Tally {
    processed: usize,
    failed: usize,
}

fn process(pipeline: &Pipeline, path: &Path, tally: &mut Tally) {
    match pipeline.run(&SourceDescriptor::File(path.to_path_buf())) {
        Ok(report) => {
            tally.processed += 1;
            info!(file = %path.display(), "processed");
            println!(
                "  {} {} valid {}/{}, flags {}",
                "ok".green().bold(),
                path.display(),
                report.validation.valid,
                report.validation.total,
                report.reconciliation.flagged
            );
        }
        Err(DualcheckError::ValidationFailed { summary, .. }) => {
            tally.failed += 1;
            println!(
                "  {} {} {} of {} records invalid",
                "rejected".red().bold(),
                path.display(),
                summary.invalid,
                summary.total
            );
        }
        Err(e) => {
            tally.failed += 1;
            error!(file = %path.display(), error = %e, "run failed");
            println!("  {} {} {}", "failed".red().bold(), path.display(), e);
        }
    }
}

/// Whether two paths name the same directory. A missing directory matches
/// nothing.
fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
