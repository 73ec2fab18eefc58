//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Advance the Ulam prime spiral by one batch of integers.
#[derive(Debug, Parser)]
#[command(name = "ulam-evolve", version)]
pub struct Cli {
    /// Path to the YAML configuration file.
    #[arg(
        long,
        short,
        global = true,
        env = "ULAM_CONFIG",
        default_value = "ulam-config.yaml"
    )]
    pub config: PathBuf,

    /// What to do. Defaults to `evolve` with the configured batch size.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scan the next batch of integers and refresh every artifact.
    Evolve(EvolveArgs),

    /// Create the counter state.
    Init(InitArgs),

    /// Print the current grid without changing anything.
    Render,

    /// Print the counter and marker totals.
    Status,
}

impl Default for Command {
    fn default() -> Self {
        Self::Evolve(EvolveArgs::default())
    }
}

/// Arguments for `evolve`.
#[derive(Debug, Default, Args)]
pub struct EvolveArgs {
    /// Integers to scan. Defaults to `run.batch_size` (50).
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub count: Option<u64>,
}

/// Arguments for `init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Initial counter value; the first run scans from `start + 1`.
    #[arg(long, default_value_t = 1)]
    pub start: u64,

    /// Overwrite an existing counter state.
    #[arg(long)]
    pub force: bool,
}
