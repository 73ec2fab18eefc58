//! Error types for the `ulam-evolve` binary.
//!
//! [`AppError`] is the top-level error type that wraps all possible
//! failure modes during startup and a run.

use ulam_core::{ConfigError, EvolveError};

/// Top-level error for the `ulam-evolve` binary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// A run, render, or initialization failed.
    #[error("evolve error: {source}")]
    Evolve {
        /// The underlying driver error.
        #[from]
        source: EvolveError,
    },
}
