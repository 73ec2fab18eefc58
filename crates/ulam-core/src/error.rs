//! Error types for artifact persistence.
//!
//! Every fallible read or write of a persisted artifact returns
//! [`StoreError`]. I/O failures carry the path that failed so the binary
//! can report something more useful than a bare `os error 2`.

use std::path::PathBuf;

use ulam_spiral::SpiralError;
use ulam_types::Coordinate;

/// Errors that can occur while reading or writing persisted artifacts.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The counter state file does not exist.
    #[error("counter state not found at {}", path.display())]
    StateMissing {
        /// Expected location of the state file.
        path: PathBuf,
    },

    /// The counter state file exists but does not parse.
    #[error("counter state at {} is malformed: {source}", path.display())]
    StateCorrupt {
        /// The state file.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// Refused to overwrite an existing counter state.
    #[error("counter state already exists at {}", path.display())]
    StateExists {
        /// The state file.
        path: PathBuf,
    },

    /// A marker file name does not follow `prime_{n}_{x}_{y}.txt`.
    #[error("malformed marker file name: {name}")]
    MalformedMarkerName {
        /// The offending file name.
        name: String,
    },

    /// A marker log line does not parse.
    #[error("malformed marker log line {line} in {}: {source}", path.display())]
    MalformedMarkerLog {
        /// The marker log.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// A persisted marker disagrees with the spiral mapping.
    #[error("marker for {n} is stored at {stored} but belongs at {expected}")]
    CoordinateMismatch {
        /// The prime.
        n: u64,
        /// Coordinate found on disk.
        stored: Coordinate,
        /// Coordinate computed from `n`.
        expected: Coordinate,
    },

    /// A persisted marker names a composite number.
    #[error("marker for {n} does not name a prime")]
    NotPrime {
        /// The offending value.
        n: u64,
    },

    /// A persisted marker could not be placed on the spiral.
    #[error("spiral error: {source}")]
    Spiral {
        /// The underlying spiral error.
        #[from]
        source: SpiralError,
    },

    /// Serializing a record failed.
    #[error("failed to serialize {what}: {source}")]
    Serialize {
        /// What was being serialized.
        what: &'static str,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// A filesystem operation failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The path being read or written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl StoreError {
    /// Build a closure that wraps an [`std::io::Error`] with `path`.
    pub(crate) fn io(path: &std::path::Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
