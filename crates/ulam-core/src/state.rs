//! Counter state persistence.
//!
//! The counter state is the single record that carries scan progress from
//! one run to the next. It is read once at the start of a run and written
//! once, as the final step, after every derived artifact is on disk.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;
use ulam_types::CounterState;

use crate::error::StoreError;

/// Keys owned by [`CounterState`]; everything else in the file is carried
/// through untouched.
const STATE_KEYS: [&str; 2] = ["n", "last_updated"];

/// On-disk form of the counter state: the typed fields first, then any keys
/// another tool left in the file.
#[derive(Serialize)]
struct StateRecord<'a> {
    #[serde(flatten)]
    state: &'a CounterState,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Read the counter state at `path`.
///
/// # Errors
///
/// Returns [`StoreError::StateMissing`] if the file does not exist,
/// [`StoreError::StateCorrupt`] if it does not parse, or
/// [`StoreError::Io`] for any other read failure.
pub fn load_state(path: &Path) -> Result<CounterState, StoreError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(StoreError::StateMissing {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(StoreError::io(path)(e)),
    };

    let state: CounterState =
        serde_json::from_str(&contents).map_err(|source| StoreError::StateCorrupt {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(n = state.n, last_updated = ?state.last_updated, "Counter state loaded");
    Ok(state)
}

/// Overwrite the counter state at `path`.
///
/// Written as four-space indented JSON with a trailing newline. Keys in the
/// existing file that the counter state does not own are kept.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the file cannot be read or written.
pub fn save_state(path: &Path, state: &CounterState) -> Result<(), StoreError> {
    let record = StateRecord {
        state,
        extra: extra_keys(path)?,
    };

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    record
        .serialize(&mut serializer)
        .map_err(|source| StoreError::Serialize {
            what: "counter state",
            source,
        })?;
    buf.push(b'\n');

    fs::write(path, buf).map_err(StoreError::io(path))?;
    debug!(n = state.n, path = %path.display(), "Counter state saved");
    Ok(())
}

/// Keys in the current state file at `path` other than [`STATE_KEYS`].
///
/// A missing or unparseable file has none.
fn extra_keys(path: &Path) -> Result<Map<String, Value>, StoreError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
        Err(e) => return Err(StoreError::io(path)(e)),
    };
    let Ok(mut map) = serde_json::from_str::<Map<String, Value>>(&contents) else {
        debug!(path = %path.display(), "Existing state unreadable, not carrying keys over");
        return Ok(Map::new());
    };
    for key in STATE_KEYS {
        map.remove(key);
    }
    Ok(map)
}

/// Write a fresh counter state, refusing to clobber an existing one.
///
/// # Errors
///
/// Returns [`StoreError::StateExists`] if `path` exists and `force` is
/// false, or [`StoreError::Io`] on write failure.
pub fn create_state(path: &Path, state: &CounterState, force: bool) -> Result<(), StoreError> {
    if !force && path.exists() {
        return Err(StoreError::StateExists {
            path: path.to_path_buf(),
        });
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(StoreError::io(parent))?;
    }
    save_state(path, state)
}
