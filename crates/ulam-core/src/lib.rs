//! Counter state, marker persistence, and the evolution driver for the
//! Ulam prime spiral.
//!
//! Each invocation scans the next batch of integers after the persisted
//! counter, records every prime it finds with its spiral coordinate, and
//! regenerates the derived artifacts (run log, summary, README region).
//!
//! # Modules
//!
//! - [`artifacts`] -- Run log, summary, and README region writers.
//! - [`config`] -- Configuration loading from `ulam-config.yaml` into
//!   strongly-typed structs.
//! - [`error`] -- [`StoreError`] for artifact persistence.
//! - [`evolve`] -- Run planning and the [`Evolution`] driver.
//! - [`markers`] -- Marker log and marker files.
//! - [`region`] -- Sentinel-delimited document regions.
//! - [`report`] -- `minijinja` report templates.
//! - [`state`] -- Counter state persistence.
//!
//! [`StoreError`]: error::StoreError
//! [`Evolution`]: evolve::Evolution

pub mod artifacts;
pub mod config;
pub mod error;
pub mod evolve;
pub mod markers;
pub mod region;
pub mod report;
pub mod state;

pub use config::{ArtifactPaths, ConfigError, UlamConfig};
pub use error::StoreError;
pub use evolve::{EvolveError, Evolution, RunOutcome, RunPlan, Status, plan_run, scan_batch};
pub use markers::{MarkerSet, MarkerStore};
