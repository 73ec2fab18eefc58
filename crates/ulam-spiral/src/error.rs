//! Error types for the `ulam-spiral` crate.

/// Errors that can occur while mapping integers onto the spiral.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpiralError {
    /// The spiral starts at 1; 0 has no position.
    #[error("the spiral has no cell for 0")]
    ZeroIndex,

    /// A coordinate does not fit in the output range.
    #[error("spiral coordinate for {n} is out of range")]
    OutOfRange {
        /// The integer whose coordinate overflowed.
        n: u64,
    },
}
