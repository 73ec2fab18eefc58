//! Shared type definitions for the Ulam prime spiral.
//!
//! This crate is the single source of truth for the data model shared by
//! the spiral mapper, the evolution driver, and the command-line binary.
//!
//! # Modules
//!
//! - [`structs`] -- Spiral coordinates, prime markers, and the persisted
//!   counter state.

pub mod structs;

// Re-export all public types at crate root for convenience.
pub use structs::{Coordinate, CounterState, PrimeMarker};
