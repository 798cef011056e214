//! # radicar CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.
//! Uses clap derive macros for argument parsing.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use radicar_cli::inspect::{run_inspect, InspectArgs};
use radicar_cli::report::{run_report, ReportArgs};
use radicar_cli::validate::{run_validate, ValidateArgs};

/// Radicar CLI — operator and auditor tooling for the radicación service.
///
/// Offline number inspection, remote validation, and sequence-audit
/// reports for Colombian municipal planning entities.
#[derive(Parser, Debug)]
#[command(name = "radicar", version = "0.3.2", about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decompose a filing-number string offline.
    Inspect(InspectArgs),

    /// Validate a candidate number against a running service.
    Validate(ValidateArgs),

    /// Fetch the sequence-audit report for an entity and year.
    Report(ReportArgs),
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::debug!("radicar CLI v0.3.2 starting");

    let result = match &cli.command {
        Commands::Inspect(args) => run_inspect(args),
        Commands::Validate(args) => run_validate(args),
        Commands::Report(args) => run_report(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}
