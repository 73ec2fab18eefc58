//! End-to-end runs of the evolution driver against a temporary directory.
//!
//! Each test builds a fresh artifact layout, seeds whatever state the
//! scenario needs, and inspects the files the driver leaves behind.

// Integration tests use unwrap extensively for clarity -- panicking on
// failure is the correct behavior in test code.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::missing_panics_doc
)]

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use tempfile::TempDir;
use ulam_core::artifacts::ReadmeUpdate;
use ulam_core::config::PathsConfig;
use ulam_core::evolve::{RenderSettings, plan_run};
use ulam_core::markers::marker_file_name;
use ulam_core::region::RegionError;
use ulam_core::report::Reporter;
use ulam_core::{EvolveError, Evolution, MarkerStore, StoreError, UlamConfig, state};
use ulam_spiral::spiral_coordinate;
use ulam_types::{CounterState, PrimeMarker};

const START: &str = "<!-- LATEST_STATUS_START -->";
const END: &str = "<!-- LATEST_STATUS_END -->";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn yesterday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

fn config_for(dir: &Path) -> UlamConfig {
    UlamConfig {
        paths: PathsConfig {
            base_dir: dir.to_path_buf(),
            ..PathsConfig::default()
        },
        ..UlamConfig::default()
    }
}

fn workspace_at(n: u64) -> (TempDir, Evolution) {
    let dir = tempfile::tempdir().unwrap();
    let evolution = Evolution::new(config_for(dir.path())).unwrap();
    state::save_state(
        &evolution.paths().state_file,
        &CounterState::new(n, yesterday()),
    )
    .unwrap();
    (dir, evolution)
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

fn marker_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir.join("grid"))
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    names
}

#[test]
fn batch_from_ten_finds_eleven_and_thirteen() {
    let (dir, evolution) = workspace_at(10);

    let outcome = evolution.run(5, today()).unwrap();

    assert_eq!(outcome.state, CounterState::new(15, today()));
    assert_eq!(outcome.primes_found, 2);
    assert_eq!(outcome.markers_written, 2);
    assert_eq!(outcome.total_markers, 2);

    let m11 = PrimeMarker::new(11, spiral_coordinate(11).unwrap());
    let m13 = PrimeMarker::new(13, spiral_coordinate(13).unwrap());
    assert_eq!(
        marker_files(dir.path()),
        vec![marker_file_name(&m11), marker_file_name(&m13)]
    );
    assert_eq!(read(&dir.path().join("grid/prime_11_2_0.txt")), "prime 11");

    let saved = state::load_state(&dir.path().join("state.json")).unwrap();
    assert_eq!(saved, CounterState::new(15, today()));

    let summary = read(&dir.path().join("summary.txt"));
    assert!(summary.contains("N=15"));
    assert!(summary.contains("2 new primes"));
    assert_eq!(summary, outcome.summary);

    let log = read(&dir.path().join("spiral-log.md"));
    assert!(log.starts_with("| 15 | 2026-10-19 |\n```\n"));
    assert!(log.ends_with("\n``` |\n"));
}

#[test]
fn log_grid_frames_all_markers() {
    let (dir, evolution) = workspace_at(10);
    evolution.run(5, today()).unwrap();

    // 11 -> (2, 0), 13 -> (2, 2): padded box x in [1, 3], y in [-1, 3].
    let log = read(&dir.path().join("spiral-log.md"));
    let grid: Vec<&str> = log
        .lines()
        .skip(2)
        .take_while(|l| !l.starts_with("```"))
        .collect();
    assert_eq!(grid, vec!["   ", " █ ", "   ", " █ ", "   "]);
}

#[test]
fn runs_accumulate() {
    let (dir, evolution) = workspace_at(0);

    let first = evolution.run(50, today()).unwrap();
    assert_eq!(first.primes_found, 15);
    let second = evolution.run(50, today()).unwrap();
    assert_eq!(second.primes_found, 10);
    assert_eq!(second.total_markers, 25);
    assert_eq!(second.state.n, 100);

    assert_eq!(marker_files(dir.path()).len(), 25);
    let log = read(&dir.path().join("spiral-log.md"));
    assert!(log.contains("| 50 | 2026-10-19 |"));
    assert!(log.contains("| 100 | 2026-10-19 |"));

    // The summary reports only the latest batch.
    let summary = read(&dir.path().join("summary.txt"));
    assert!(summary.contains("Today, 10 new primes"));
}

#[test]
fn missing_state_is_fatal_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let evolution = Evolution::new(config_for(dir.path())).unwrap();

    let result = evolution.run(5, today());
    assert!(matches!(
        result,
        Err(EvolveError::Store {
            source: StoreError::StateMissing { .. }
        })
    ));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn corrupt_state_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("state.json"), "{ not json").unwrap();
    let evolution = Evolution::new(config_for(dir.path())).unwrap();

    assert!(matches!(
        evolution.run(5, today()),
        Err(EvolveError::Store {
            source: StoreError::StateCorrupt { .. }
        })
    ));
    assert!(!dir.path().join("spiral-log.md").exists());
}

#[test]
fn malformed_marker_name_aborts_before_state_moves() {
    let (dir, evolution) = workspace_at(10);
    fs::create_dir_all(dir.path().join("grid")).unwrap();
    fs::write(dir.path().join("grid/prime_x_y_z.txt"), "prime ?").unwrap();

    assert!(matches!(
        evolution.run(5, today()),
        Err(EvolveError::Store {
            source: StoreError::MalformedMarkerName { .. }
        })
    ));
    assert_eq!(state::load_state(&dir.path().join("state.json")).unwrap().n, 10);
}

#[test]
fn readme_region_is_refreshed() {
    let (dir, evolution) = workspace_at(10);
    let readme = dir.path().join("README.md");
    let before = "# Prime Spiral\n\nIntro text.\n";
    let after = "\n\n## Notes\nKeep me.\n";
    fs::write(&readme, format!("{before}{START}\n> stale\n{END}{after}")).unwrap();

    let outcome = evolution.run(5, today()).unwrap();
    assert_eq!(outcome.readme, ReadmeUpdate::Updated);

    let content = read(&readme);
    assert_eq!(
        content,
        format!("{before}{START}\n> {}\n{END}{after}", outcome.summary)
    );
}

#[test]
fn readme_without_region_is_left_alone() {
    let (dir, evolution) = workspace_at(10);
    let readme = dir.path().join("README.md");
    fs::write(&readme, format!("# Prime Spiral\n{END}\n")).unwrap();

    let outcome = evolution.run(5, today()).unwrap();
    assert_eq!(outcome.readme, ReadmeUpdate::Skipped(RegionError::MissingStart));
    assert_eq!(read(&readme), format!("# Prime Spiral\n{END}\n"));
}

#[test]
fn no_readme_is_fine() {
    let (_dir, evolution) = workspace_at(10);
    let outcome = evolution.run(5, today()).unwrap();
    assert_eq!(outcome.readme, ReadmeUpdate::Absent);
}

#[test]
fn retry_after_interrupted_run_does_not_duplicate_markers() {
    let (dir, evolution) = workspace_at(10);

    // Simulate a run that wrote its markers and then died before the
    // counter state was saved.
    let store = MarkerStore::new(dir.path().join("grid"), dir.path().join("markers.jsonl"));
    let history = store.load().unwrap();
    let reporter = Reporter::new(&evolution.config().templates).unwrap();
    let plan = plan_run(
        &CounterState::new(10, yesterday()),
        &history.markers,
        5,
        today(),
        &reporter,
        &RenderSettings::default(),
    )
    .unwrap();
    store.commit(&history, &plan.fresh).unwrap();
    assert_eq!(state::load_state(&dir.path().join("state.json")).unwrap().n, 10);

    let outcome = evolution.run(5, today()).unwrap();
    assert_eq!(outcome.primes_found, 2);
    assert_eq!(outcome.markers_written, 0);
    assert_eq!(outcome.total_markers, 2);
    assert_eq!(outcome.state.n, 15);

    let log = read(&dir.path().join("markers.jsonl"));
    assert_eq!(log.lines().count(), 2);
}

#[test]
fn legacy_grid_is_imported() {
    let (dir, evolution) = workspace_at(10);
    let grid = dir.path().join("grid");
    fs::create_dir_all(&grid).unwrap();
    for n in [2_u64, 3, 5, 7] {
        let m = PrimeMarker::new(n, spiral_coordinate(n).unwrap());
        fs::write(grid.join(marker_file_name(&m)), m.label()).unwrap();
    }

    let outcome = evolution.run(5, today()).unwrap();
    assert_eq!(outcome.total_markers, 6);

    let log = read(&dir.path().join("markers.jsonl"));
    let primes: Vec<u64> = log
        .lines()
        .map(|l| serde_json::from_str::<PrimeMarker>(l).unwrap().n)
        .collect();
    assert_eq!(primes, vec![2, 3, 5, 7, 11, 13]);
}

#[test]
fn grid_with_skewed_coordinates_is_imported() {
    let (dir, evolution) = workspace_at(10);
    let grid = dir.path().join("grid");
    fs::create_dir_all(&grid).unwrap();
    for name in ["prime_2_1_-4.txt", "prime_3_1_1.txt", "prime_11_2_-8.txt"] {
        fs::write(grid.join(name), "prime").unwrap();
    }

    let outcome = evolution.run(5, today()).unwrap();
    assert_eq!(outcome.state.n, 15);
    assert_eq!(outcome.primes_found, 2);
    // 11 was already on file, only 13 is new.
    assert_eq!(outcome.markers_written, 1);
    assert_eq!(outcome.total_markers, 4);

    let log: Vec<PrimeMarker> = read(&dir.path().join("markers.jsonl"))
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    let expected: Vec<PrimeMarker> = [2_u64, 3, 11, 13]
        .into_iter()
        .map(|n| PrimeMarker::new(n, spiral_coordinate(n).unwrap()))
        .collect();
    assert_eq!(log, expected);

    // The old files stay where they were.
    assert!(grid.join("prime_2_1_-4.txt").exists());
}

#[test]
fn bare_counter_state_runs() {
    let dir = tempfile::tempdir().unwrap();
    let evolution = Evolution::new(config_for(dir.path())).unwrap();
    fs::write(dir.path().join("state.json"), r#"{"n": 10}"#).unwrap();

    let outcome = evolution.run(5, today()).unwrap();
    assert_eq!(outcome.state, CounterState::new(15, today()));
    assert_eq!(outcome.primes_found, 2);

    let saved = state::load_state(&dir.path().join("state.json")).unwrap();
    assert_eq!(saved, CounterState::new(15, today()));
}

#[test]
fn unknown_state_keys_survive_a_run() {
    let dir = tempfile::tempdir().unwrap();
    let evolution = Evolution::new(config_for(dir.path())).unwrap();
    fs::write(
        dir.path().join("state.json"),
        r#"{"n": 10, "last_updated": "2026-10-18", "owner": "spiral-bot"}"#,
    )
    .unwrap();

    evolution.run(5, today()).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&read(&dir.path().join("state.json"))).unwrap();
    assert_eq!(json["n"], 15);
    assert_eq!(json["last_updated"], "2026-10-19");
    assert_eq!(json["owner"], "spiral-bot");
}

#[test]
fn snapshot_is_idempotent_and_read_only() {
    let (dir, evolution) = workspace_at(0);
    evolution.run(30, today()).unwrap();
    let state_before = read(&dir.path().join("state.json"));
    let log_before = read(&dir.path().join("spiral-log.md"));

    let first = evolution.snapshot().unwrap();
    let second = evolution.snapshot().unwrap();
    assert_eq!(first, second);
    assert!(log_before.contains(&first));

    assert_eq!(read(&dir.path().join("state.json")), state_before);
    assert_eq!(read(&dir.path().join("spiral-log.md")), log_before);
}

#[test]
fn snapshot_of_empty_workspace_is_default_box() {
    let dir = tempfile::tempdir().unwrap();
    let evolution = Evolution::new(config_for(dir.path())).unwrap();
    let grid = evolution.snapshot().unwrap();

    let rows: Vec<&str> = grid.split('\n').collect();
    assert_eq!(rows.len(), 11);
    assert!(rows.iter().all(|r| r.chars().count() == 11));
    assert_eq!(rows[5], "     1     ");
}

#[test]
fn init_then_run() {
    let dir = tempfile::tempdir().unwrap();
    let evolution = Evolution::new(config_for(dir.path())).unwrap();

    let seeded = evolution.init(1, yesterday(), false).unwrap();
    assert_eq!(seeded, CounterState::new(1, yesterday()));
    assert!(dir.path().join("grid").is_dir());
    assert!(matches!(
        evolution.init(1, yesterday(), false),
        Err(EvolveError::Store {
            source: StoreError::StateExists { .. }
        })
    ));

    let outcome = evolution.run_default(today()).unwrap();
    assert_eq!(outcome.state.n, 51);
    // Primes in 2..=51.
    assert_eq!(outcome.primes_found, 15);

    let status = evolution.status().unwrap();
    assert_eq!(status.state.n, 51);
    assert_eq!(status.total_markers, 15);
    assert_eq!(status.latest.map(|m| m.n), Some(47));
}

#[test]
fn state_is_written_with_iso_date() {
    let (dir, evolution) = workspace_at(10);
    evolution.run(5, today()).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&read(&dir.path().join("state.json"))).unwrap();
    assert_eq!(json["n"], 15);
    assert_eq!(json["last_updated"], "2026-10-19");
}
