//! Primality testing, Ulam spiral coordinates, and grid rendering.
//!
//! Everything in this crate is a pure function of its inputs. The evolution
//! driver in `ulam-core` calls into it to decide which integers are prime,
//! where they sit on the spiral, and how the cumulative set of markers looks
//! as a text grid.
//!
//! # Modules
//!
//! - [`error`] -- Error types for spiral computations.
//! - [`grid`] -- [`Viewport`] bounding boxes and text-grid rendering.
//! - [`prime`] -- Trial-division primality.
//! - [`spiral`] -- Integer to spiral coordinate mapping.
//!
//! [`Viewport`]: grid::Viewport

pub mod error;
pub mod grid;
pub mod prime;
pub mod spiral;

// Re-export primary types at crate root.
pub use error::SpiralError;
pub use grid::{DEFAULT_RADIUS, Glyphs, Viewport, render_grid};
pub use prime::is_prime;
pub use spiral::{shell_index, spiral_coordinate};
