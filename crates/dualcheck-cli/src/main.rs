//! Dualcheck CLI - validation and derivation for ETL snapshots.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            source,
            pipeline,
            mode,
            output,
            no_timestamp,
        } => commands::run::run(source, pipeline, mode, output, no_timestamp),

        Commands::Validate { source, pipeline } => commands::validate::run(source, pipeline),

        Commands::Reconcile {
            file,
            pipeline,
            flagged_out,
        } => commands::reconcile::run(file, pipeline, flagged_out),

        Commands::Watch {
            dir,
            pipeline,
            mode,
            output,
            settle,
            include_existing,
        } => commands::watch::run(dir, pipeline, mode, output, settle, include_existing),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
