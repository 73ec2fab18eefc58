//! Derived text artifacts: the run log, the summary, and the README region.
//!
//! These are regenerated from the marker set and counter state on every
//! run. None of them is read back by the driver.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write as _};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::StoreError;
use crate::region::{RegionError, TemplateRegion};

/// What happened to the README during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadmeUpdate {
    /// The status region was rewritten.
    Updated,
    /// The region already held the new status; nothing was written.
    Unchanged,
    /// There is no README.
    Absent,
    /// The README lacks a usable region.
    Skipped(RegionError),
}

/// Append `entry` to the run log, creating it if needed.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the log cannot be opened or written.
pub fn append_log(path: &Path, entry: &str) -> Result<(), StoreError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(StoreError::io(path))?;
    file.write_all(entry.as_bytes())
        .map_err(StoreError::io(path))?;
    debug!(path = %path.display(), bytes = entry.len(), "Run log appended");
    Ok(())
}

/// Overwrite the summary file with `summary`.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the file cannot be written.
pub fn write_summary(path: &Path, summary: &str) -> Result<(), StoreError> {
    fs::write(path, summary).map_err(StoreError::io(path))?;
    debug!(path = %path.display(), "Summary written");
    Ok(())
}

/// Replace the README region between `start_marker` and `end_marker` with
/// `block`.
///
/// A missing README or a missing/misordered marker is a silent no-op.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if an existing README cannot be read or
/// rewritten.
pub fn update_readme(
    path: &Path,
    start_marker: &str,
    end_marker: &str,
    block: &str,
) -> Result<ReadmeUpdate, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "No README, skipping status update");
            return Ok(ReadmeUpdate::Absent);
        }
        Err(e) => return Err(StoreError::io(path)(e)),
    };

    let region = match TemplateRegion::locate(&content, start_marker, end_marker) {
        Ok(region) => region,
        Err(RegionError::EndBeforeStart) => {
            warn!(path = %path.display(), "README status markers are out of order, skipping");
            return Ok(ReadmeUpdate::Skipped(RegionError::EndBeforeStart));
        }
        Err(reason) => {
            debug!(path = %path.display(), %reason, "README has no status region");
            return Ok(ReadmeUpdate::Skipped(reason));
        }
    };

    if region.body() == block {
        return Ok(ReadmeUpdate::Unchanged);
    }

    let updated = region.replace(block);
    fs::write(path, updated).map_err(StoreError::io(path))?;
    debug!(path = %path.display(), "README status region updated");
    Ok(ReadmeUpdate::Updated)
}
