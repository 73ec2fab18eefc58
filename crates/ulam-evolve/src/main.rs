//! Command-line driver for the Ulam prime spiral.
//!
//! Each invocation loads the configuration, then runs one subcommand
//! against the artifact directory:
//!
//! - `evolve [COUNT]` (the default) scans the next batch, writes marker
//!   artifacts, appends the run log, rewrites the summary and README
//!   region, and finally advances the counter state.
//! - `init` seeds the counter state.
//! - `render` prints the current grid.
//! - `status` prints the counter and marker totals.
//!
//! # Startup Sequence
//!
//! 1. Parse the command line
//! 2. Load configuration from `ulam-config.yaml` (defaults if absent)
//! 3. Initialize structured logging (tracing)
//! 4. Build the evolution driver and dispatch the subcommand
//!
//! The process exits non-zero if any step fails.

mod cli;
mod error;

use std::path::Path;
use std::process::ExitCode;

use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use ulam_core::config::LoggingConfig;
use ulam_core::{Evolution, UlamConfig};

use crate::cli::{Cli, Command, EvolveArgs, InitArgs};
use crate::error::AppError;

/// Application entry point.
fn main() -> ExitCode {
    let cli = Cli::parse();

    let (config, from_file) = match load_config(&cli.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            init_logging(&LoggingConfig::default());
            error!(error = %e, path = %cli.config.display(), "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config.logging);

    if from_file {
        info!(path = %cli.config.display(), "Configuration loaded");
    } else {
        info!(path = %cli.config.display(), "Config file not found, using defaults");
    }

    let today = Local::now().date_naive();
    match run(&cli.command.unwrap_or_default(), config, today) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "ulam-evolve failed");
            ExitCode::FAILURE
        }
    }
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist. Returns whether the file was read.
fn load_config(path: &Path) -> Result<(UlamConfig, bool), AppError> {
    if path.exists() {
        Ok((UlamConfig::from_file(path)?, true))
    } else {
        // Parsing an empty document still applies environment overrides.
        Ok((UlamConfig::parse("")?, false))
    }
}

/// Dispatch one subcommand.
fn run(command: &Command, config: UlamConfig, today: NaiveDate) -> Result<(), AppError> {
    let evolution = Evolution::new(config)?;
    info!(
        base_dir = %evolution.config().paths.base_dir.display(),
        batch_size = evolution.config().run.batch_size,
        "Evolution driver ready"
    );

    match command {
        Command::Evolve(EvolveArgs { count }) => {
            let batch_size = count.unwrap_or(evolution.config().run.batch_size);
            let outcome = evolution.run(batch_size, today)?;
            println!("{}", outcome.summary);
        }
        Command::Init(InitArgs { start, force }) => {
            let state = evolution.init(*start, today, *force)?;
            println!(
                "Initialized counter at {} in {}",
                state.n,
                evolution.paths().state_file.display()
            );
        }
        Command::Render => {
            println!("{}", evolution.snapshot()?);
        }
        Command::Status => {
            let status = evolution.status()?;
            match status.state.last_updated {
                Some(date) => println!("N={} (last updated {date})", status.state.n),
                None => println!("N={}", status.state.n),
            }
            println!("{} primes on the spiral", status.total_markers);
            if let Some(latest) = status.latest {
                println!("latest: {} at {}", latest.n, latest.coordinate);
            }
        }
    }
    Ok(())
}
