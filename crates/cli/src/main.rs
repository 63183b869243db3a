// SPDX-License-Identifier: MIT

//! `dcrpm`: detect and repair a corrupt, locked, or stale RPM database.
//!
//! Parses flags into a [`dcrpm_core::Config`], runs the remediation state
//! machine to completion (or until the overall deadline expires), prints
//! the run summary, and exits with the status's mapped code.

mod cli;
mod color;
mod exit_error;

use clap::Parser;
use dcrpm_supervisor::ProcessSupervisor;
use exit_error::ExitError;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = cli::Cli::parse();
    init_logging(cli.verbosity);

    match run(&cli) {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            eprintln!("dcrpm: {error}");
            std::process::exit(error.code);
        }
    }
}

#[tokio::main]
async fn run(cli: &cli::Cli) -> Result<i32, ExitError> {
    let config = cli.build_config(true).map_err(ExitError::from)?;

    let runner = ProcessSupervisor::new();
    let machine = dcrpm_remediate::RemediationMachine::new(&runner, &config);
    let transcript = machine.run().await;

    Ok(dcrpm_remediate::report(&transcript, config.json_summary))
}

fn init_logging(verbosity: dcrpm_core::Verbosity) {
    let default_directive = match verbosity {
        dcrpm_core::Verbosity::Quiet => "warn",
        dcrpm_core::Verbosity::Info => "info",
        dcrpm_core::Verbosity::Debug => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}
