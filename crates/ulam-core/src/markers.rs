//! Prime marker persistence.
//!
//! Two on-disk forms are kept in step:
//!
//! - the **marker log** (`markers.jsonl`): append-only JSON Lines, one
//!   `{"n":..,"x":..,"y":..}` record per prime. This is the source of truth.
//! - **marker files** (`grid/prime_{n}_{x}_{y}.txt`): one write-once file
//!   per prime whose body is `prime {n}`.
//!
//! When no marker log exists yet, the set is rebuilt from marker file names
//! and the next commit seeds the log with everything found.
//!
//! Log records are re-checked against the spiral mapping, so a line that
//! disagrees with `spiral_coordinate(n)` is rejected. Marker file names from
//! older grids may carry a stale coordinate; those are keyed on the prime and
//! re-mapped.

use std::collections::{BTreeMap, BTreeSet, btree_map};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use ulam_spiral::{is_prime, spiral_coordinate};
use ulam_types::{Coordinate, PrimeMarker};

use crate::error::StoreError;

/// Prefix shared by every marker file name.
const MARKER_FILE_PREFIX: &str = "prime_";

/// Extension shared by every marker file name.
const MARKER_FILE_SUFFIX: &str = ".txt";

/// The cumulative set of discovered primes, keyed by the prime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerSet {
    by_prime: BTreeMap<u64, PrimeMarker>,
}

impl MarkerSet {
    /// Create an empty set.
    pub const fn new() -> Self {
        Self {
            by_prime: BTreeMap::new(),
        }
    }

    /// Insert `marker`. Returns `false` if its prime was already present.
    pub fn insert(&mut self, marker: PrimeMarker) -> bool {
        if self.by_prime.contains_key(&marker.n) {
            return false;
        }
        self.by_prime.insert(marker.n, marker);
        true
    }

    /// Whether prime `n` is in the set.
    pub fn contains(&self, n: u64) -> bool {
        self.by_prime.contains_key(&n)
    }

    /// Number of markers.
    pub fn len(&self) -> usize {
        self.by_prime.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.by_prime.is_empty()
    }

    /// Markers in ascending order of prime.
    pub fn iter(&self) -> btree_map::Values<'_, u64, PrimeMarker> {
        self.by_prime.values()
    }

    /// The largest prime in the set.
    pub fn latest(&self) -> Option<&PrimeMarker> {
        self.by_prime.values().next_back()
    }

    /// Every occupied coordinate.
    pub fn coordinates(&self) -> BTreeSet<Coordinate> {
        self.iter().map(|m| m.coordinate).collect()
    }
}

impl<'a> IntoIterator for &'a MarkerSet {
    type Item = &'a PrimeMarker;
    type IntoIter = btree_map::Values<'a, u64, PrimeMarker>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<PrimeMarker> for MarkerSet {
    fn from_iter<I: IntoIterator<Item = PrimeMarker>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl Extend<PrimeMarker> for MarkerSet {
    fn extend<I: IntoIterator<Item = PrimeMarker>>(&mut self, iter: I) {
        for marker in iter {
            self.insert(marker);
        }
    }
}

/// Where a loaded [`MarkerSet`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerSource {
    /// Read from the marker log.
    Log,
    /// Rebuilt from marker file names; the log does not exist yet.
    FileNames,
    /// Neither a log nor any marker file exists.
    Empty,
}

/// A loaded marker set plus its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerHistory {
    /// Every marker found.
    pub markers: MarkerSet,
    /// Where they were read from.
    pub source: MarkerSource,
}

/// Reads and writes marker artifacts.
#[derive(Debug, Clone)]
pub struct MarkerStore {
    grid_dir: PathBuf,
    log_path: PathBuf,
}

impl MarkerStore {
    /// Create a store over `grid_dir` and the marker log at `log_path`.
    pub const fn new(grid_dir: PathBuf, log_path: PathBuf) -> Self {
        Self { grid_dir, log_path }
    }

    /// Directory holding one marker file per prime.
    pub fn grid_dir(&self) -> &Path {
        &self.grid_dir
    }

    /// Load the full historical marker set.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MalformedMarkerLog`] or
    /// [`StoreError::MalformedMarkerName`] on unparseable records,
    /// [`StoreError::NotPrime`] on records naming a composite,
    /// [`StoreError::CoordinateMismatch`] on log records that contradict the
    /// mapping, and [`StoreError::Io`] on read failure.
    pub fn load(&self) -> Result<MarkerHistory, StoreError> {
        if self.log_path.exists() {
            let markers = self.load_log()?;
            debug!(count = markers.len(), "Markers loaded from log");
            return Ok(MarkerHistory {
                markers,
                source: MarkerSource::Log,
            });
        }

        let markers = self.load_file_names()?;
        let source = if markers.is_empty() {
            MarkerSource::Empty
        } else {
            info!(
                count = markers.len(),
                grid_dir = %self.grid_dir.display(),
                "Marker log missing, rebuilt markers from file names"
            );
            MarkerSource::FileNames
        };
        Ok(MarkerHistory { markers, source })
    }

    /// Persist `fresh` markers.
    ///
    /// Writes a marker file for each, then appends them to the marker log.
    /// When `history` was not read from the log, the log is first seeded
    /// with every historical marker so it becomes complete.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] on any write failure.
    pub fn commit(&self, history: &MarkerHistory, fresh: &[PrimeMarker]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.grid_dir).map_err(StoreError::io(&self.grid_dir))?;

        for marker in fresh {
            self.write_marker_file(marker)?;
        }

        let seed: Vec<&PrimeMarker> = if history.source == MarkerSource::Log {
            Vec::new()
        } else {
            history.markers.iter().collect()
        };
        if seed.is_empty() && fresh.is_empty() {
            return Ok(());
        }

        let mut lines = String::new();
        for marker in seed.into_iter().chain(fresh) {
            let line = serde_json::to_string(marker).map_err(|source| StoreError::Serialize {
                what: "prime marker",
                source,
            })?;
            lines.push_str(&line);
            lines.push('\n');
        }

        let mut log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(StoreError::io(&self.log_path))?;
        log.write_all(lines.as_bytes())
            .map_err(StoreError::io(&self.log_path))?;

        debug!(
            appended = fresh.len(),
            seeded = history.source != MarkerSource::Log,
            "Marker log updated"
        );
        Ok(())
    }

    /// Write the marker file for `marker` unless it already exists.
    fn write_marker_file(&self, marker: &PrimeMarker) -> Result<(), StoreError> {
        let path = self.grid_dir.join(marker_file_name(marker));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => file
                .write_all(marker.label().as_bytes())
                .map_err(StoreError::io(&path)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!(n = marker.n, "Marker file already present");
                Ok(())
            }
            Err(e) => Err(StoreError::io(&path)(e)),
        }
    }

    fn load_log(&self) -> Result<MarkerSet, StoreError> {
        let contents =
            fs::read_to_string(&self.log_path).map_err(StoreError::io(&self.log_path))?;

        let mut markers = MarkerSet::new();
        for (idx, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let marker: PrimeMarker =
                serde_json::from_str(line).map_err(|source| StoreError::MalformedMarkerLog {
                    path: self.log_path.clone(),
                    line: idx.saturating_add(1),
                    source,
                })?;
            verify_marker(&marker)?;
            if !markers.insert(marker) {
                debug!(n = marker.n, "Duplicate marker log record ignored");
            }
        }
        Ok(markers)
    }

    fn load_file_names(&self) -> Result<MarkerSet, StoreError> {
        let entries = match fs::read_dir(&self.grid_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(MarkerSet::new()),
            Err(e) => return Err(StoreError::io(&self.grid_dir)(e)),
        };

        let mut markers = MarkerSet::new();
        for entry in entries {
            let entry = entry.map_err(StoreError::io(&self.grid_dir))?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                warn!(name = ?file_name, "Skipping non UTF-8 file in grid directory");
                continue;
            };
            if let Some(marker) = parse_marker_file_name(name)? {
                markers.insert(realign_marker(marker)?);
            }
        }
        Ok(markers)
    }
}

/// File name for `marker`: `prime_{n}_{x}_{y}.txt`.
pub fn marker_file_name(marker: &PrimeMarker) -> String {
    format!(
        "{MARKER_FILE_PREFIX}{}_{}_{}{MARKER_FILE_SUFFIX}",
        marker.n, marker.coordinate.x, marker.coordinate.y
    )
}

/// Parse a marker file name.
///
/// Returns `Ok(None)` for names that do not start with `prime_`; those are
/// not marker files.
///
/// # Errors
///
/// Returns [`StoreError::MalformedMarkerName`] if the name starts with
/// `prime_` but is not `prime_{n}_{x}_{y}.txt`.
pub fn parse_marker_file_name(name: &str) -> Result<Option<PrimeMarker>, StoreError> {
    let Some(rest) = name.strip_prefix(MARKER_FILE_PREFIX) else {
        return Ok(None);
    };
    let malformed = || StoreError::MalformedMarkerName {
        name: name.to_owned(),
    };

    let stem = rest.strip_suffix(MARKER_FILE_SUFFIX).ok_or_else(malformed)?;
    let mut parts = stem.split('_');
    let (Some(n), Some(x), Some(y), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(malformed());
    };

    let n: u64 = n.parse().map_err(|_e| malformed())?;
    let x: i64 = x.parse().map_err(|_e| malformed())?;
    let y: i64 = y.parse().map_err(|_e| malformed())?;
    Ok(Some(PrimeMarker::new(n, Coordinate::new(x, y))))
}

/// Re-derive the coordinate of a marker read from a file name.
///
/// Older grids were written with a skewed right edge, so their names can
/// carry a coordinate that disagrees with the mapping. The prime is kept and
/// its coordinate recomputed.
fn realign_marker(marker: PrimeMarker) -> Result<PrimeMarker, StoreError> {
    if !is_prime(marker.n) {
        return Err(StoreError::NotPrime { n: marker.n });
    }
    let expected = spiral_coordinate(marker.n)?;
    if expected != marker.coordinate {
        warn!(
            n = marker.n,
            stored = %marker.coordinate,
            expected = %expected,
            "Marker file name disagrees with spiral mapping, using mapped coordinate"
        );
    }
    Ok(PrimeMarker::new(marker.n, expected))
}

/// Check that `marker` names a prime at its spiral coordinate.
fn verify_marker(marker: &PrimeMarker) -> Result<(), StoreError> {
    if !is_prime(marker.n) {
        return Err(StoreError::NotPrime { n: marker.n });
    }
    let expected = spiral_coordinate(marker.n)?;
    if expected != marker.coordinate {
        return Err(StoreError::CoordinateMismatch {
            n: marker.n,
            stored: marker.coordinate,
            expected,
        });
    }
    Ok(())
}
