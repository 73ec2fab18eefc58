//! Core data structs for the Ulam prime spiral.
//!
//! [`CounterState`] is the only record that carries progress between runs.
//! [`PrimeMarker`] values are immutable once created: the coordinate of a
//! prime is a pure function of the prime itself and never changes.

use core::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A cell on the spiral grid.
///
/// The origin `(0, 0)` holds the value 1. `x` grows to the right and `y`
/// grows upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    /// Horizontal offset from the origin.
    pub x: i64,
    /// Vertical offset from the origin.
    pub y: i64,
}

impl Coordinate {
    /// The center of the spiral.
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// Create a coordinate from its components.
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Whether this coordinate is the spiral center.
    pub const fn is_origin(self) -> bool {
        self.x == 0 && self.y == 0
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A discovered prime and its position on the spiral.
///
/// Serialized flat as `{"n": .., "x": .., "y": ..}`, which is the record
/// format of the marker log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PrimeMarker {
    /// The prime itself.
    pub n: u64,
    /// Its spiral position.
    #[serde(flatten)]
    pub coordinate: Coordinate,
}

impl PrimeMarker {
    /// Create a marker for prime `n` at `coordinate`.
    pub const fn new(n: u64, coordinate: Coordinate) -> Self {
        Self { n, coordinate }
    }

    /// Short human-readable label, used as the marker file body.
    pub fn label(&self) -> String {
        format!("prime {}", self.n)
    }
}

/// Persisted scan progress.
///
/// `n` is the highest integer scanned so far. The record is read at the
/// start of a run and written back, advanced, at the very end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterState {
    /// Highest integer scanned so far.
    pub n: u64,
    /// Date of the last successful run (`YYYY-MM-DD`).
    ///
    /// Absent in hand-seeded state files such as `{"n": 10}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<NaiveDate>,
}

impl CounterState {
    /// Create a counter state stamped with `last_updated`.
    pub const fn new(n: u64, last_updated: NaiveDate) -> Self {
        Self {
            n,
            last_updated: Some(last_updated),
        }
    }
}
