//! `opsreport` command-line entry point.
//!
//! # Responsibility
//! - Parse arguments and bootstrap file logging when a log directory is given.
//! - Dispatch to the `pivot`, `publish` and `info` commands.
//!
//! # Invariants
//! - Report output goes to stdout, diagnostics to stderr.
//! - The process exit code is derived from [`CliError::exit_code`].

use clap::{Parser, Subcommand};
use opsreport_core::{default_log_level, init_logging};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod error;
mod render;

use error::{CliError, CliExitCode};

/// Priority-ordered pivot reports over periodic operational metrics.
#[derive(Parser)]
#[command(name = "opsreport")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Directory for rolling log files; logging stays off when omitted.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = default_log_level())]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a pivot report from a JSON file or the current snapshot.
    Pivot(commands::pivot::PivotArgs),
    /// Publish a JSON observation file as the current snapshot.
    Publish(commands::publish::PublishArgs),
    /// Show snapshot store usage and the last publish.
    Info(commands::info::InfoArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => CliExitCode::Success.into(),
        Err(err) => {
            eprintln!("error: {err}");
            err.exit_code().into()
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    if let Some(log_dir) = &cli.log_dir {
        init_logging(&cli.log_level, log_dir)?;
    }

    match cli.command {
        Commands::Pivot(args) => commands::pivot::run(args),
        Commands::Publish(args) => commands::publish::run(args),
        Commands::Info(args) => commands::info::run(args),
    }
}
