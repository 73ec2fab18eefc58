//! The evolution driver: one batch scan per run.
//!
//! A run has two halves:
//!
//! 1. **Plan** ([`plan_run`]) -- pure. Takes the current [`CounterState`]
//!    and marker history, scans the next batch, and produces every artifact
//!    the run will write, plus the advanced state.
//!
//! 2. **Commit** ([`Evolution::run`]) -- writes the plan out in a fixed
//!    order: marker artifacts, run log, summary, README region, and the
//!    counter state last. A failure anywhere before the final step leaves
//!    the counter where it was, so the next run re-plans the same batch;
//!    markers already on disk are recognised and not written twice.

use chrono::NaiveDate;
use tracing::{debug, info};
use ulam_spiral::{Glyphs, SpiralError, Viewport, is_prime, render_grid, spiral_coordinate};
use ulam_types::{CounterState, PrimeMarker};

use crate::artifacts::{self, ReadmeUpdate};
use crate::config::{ArtifactPaths, UlamConfig};
use crate::error::StoreError;
use crate::markers::{MarkerSet, MarkerStore};
use crate::report::{ReportError, Reporter};
use crate::state;

/// Errors that can occur during a run.
#[derive(Debug, thiserror::Error)]
pub enum EvolveError {
    /// A batch must scan at least one integer.
    #[error("batch size must be at least 1")]
    InvalidBatchSize,

    /// Advancing the counter would overflow `u64`.
    #[error("counter overflow: cannot advance {n} by {batch_size}")]
    CounterOverflow {
        /// Counter value before the run.
        n: u64,
        /// Requested batch size.
        batch_size: u64,
    },

    /// Mapping a prime onto the spiral failed.
    #[error("spiral error: {source}")]
    Spiral {
        /// The underlying spiral error.
        #[from]
        source: SpiralError,
    },

    /// Reading or writing an artifact failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },

    /// Rendering a report failed.
    #[error("report error: {source}")]
    Report {
        /// The underlying report error.
        #[from]
        source: ReportError,
    },
}

/// How the grid snapshot is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSettings {
    /// Cell glyphs.
    pub glyphs: Glyphs,
    /// Half-width of the grid when there are no markers.
    pub default_radius: i64,
}

impl RenderSettings {
    /// Extract the render settings from `config`.
    pub const fn from_config(config: &UlamConfig) -> Self {
        Self {
            glyphs: config.glyphs.glyphs(),
            default_radius: config.run.default_radius,
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            glyphs: Glyphs::default(),
            default_radius: ulam_spiral::DEFAULT_RADIUS,
        }
    }
}

/// Everything a run will write, computed without touching the disk.
#[derive(Debug, Clone)]
pub struct RunPlan {
    /// Counter state the plan started from.
    pub previous: CounterState,
    /// Counter state after the run.
    pub next_state: CounterState,
    /// Every prime in the batch.
    pub found: Vec<PrimeMarker>,
    /// Primes in the batch that are not yet in the history.
    pub fresh: Vec<PrimeMarker>,
    /// History plus this batch.
    pub markers: MarkerSet,
    /// Area covered by the grid snapshot.
    pub viewport: Viewport,
    /// Grid snapshot of `markers`.
    pub grid: String,
    /// Run-log row.
    pub log_entry: String,
    /// Status sentence.
    pub summary: String,
    /// README region body.
    pub status_block: String,
}

/// Return every prime in `start + 1 ..= start + batch_size` with its
/// spiral coordinate, in ascending order.
///
/// # Errors
///
/// Returns [`EvolveError::InvalidBatchSize`] for an empty batch, or
/// [`EvolveError::CounterOverflow`] if the range leaves `u64`.
pub fn scan_batch(start: u64, batch_size: u64) -> Result<Vec<PrimeMarker>, EvolveError> {
    if batch_size == 0 {
        return Err(EvolveError::InvalidBatchSize);
    }
    let overflow = || EvolveError::CounterOverflow {
        n: start,
        batch_size,
    };
    let first = start.checked_add(1).ok_or_else(overflow)?;
    let last = start.checked_add(batch_size).ok_or_else(overflow)?;

    (first..=last)
        .filter(|&n| is_prime(n))
        .map(|n| -> Result<PrimeMarker, EvolveError> {
            Ok(PrimeMarker::new(n, spiral_coordinate(n)?))
        })
        .collect()
}

/// Draw `markers` as a text grid.
pub fn render_snapshot(markers: &MarkerSet, settings: &RenderSettings) -> (Viewport, String) {
    let occupied = markers.coordinates();
    let viewport = Viewport::around(occupied.iter().copied(), settings.default_radius);
    let grid = render_grid(&viewport, &occupied, &settings.glyphs);
    (viewport, grid)
}

/// Plan one run.
///
/// Scans the `batch_size` integers after `state.n`, merges the primes into
/// `history`, and renders every derived artifact. The summary counts all
/// primes in this batch, not the cumulative total.
///
/// # Errors
///
/// Returns [`EvolveError`] if the batch is empty, the counter would
/// overflow, or a template fails to render.
pub fn plan_run(
    state: &CounterState,
    history: &MarkerSet,
    batch_size: u64,
    today: NaiveDate,
    reporter: &Reporter,
    settings: &RenderSettings,
) -> Result<RunPlan, EvolveError> {
    let found = scan_batch(state.n, batch_size)?;
    let next_n = state
        .n
        .checked_add(batch_size)
        .ok_or(EvolveError::CounterOverflow {
            n: state.n,
            batch_size,
        })?;
    let next_state = CounterState::new(next_n, today);

    let fresh: Vec<PrimeMarker> = found
        .iter()
        .filter(|m| !history.contains(m.n))
        .copied()
        .collect();
    let mut markers = history.clone();
    markers.extend(fresh.iter().copied());

    let (viewport, grid) = render_snapshot(&markers, settings);
    let log_entry = reporter.log_entry(next_n, today, &grid)?;
    let summary = reporter.summary(next_n, found.len(), markers.len())?;
    let status_block = reporter.status_block(&summary)?;

    debug!(
        from = state.n,
        to = next_n,
        found = found.len(),
        fresh = fresh.len(),
        total = markers.len(),
        "Run planned"
    );

    Ok(RunPlan {
        previous: *state,
        next_state,
        found,
        fresh,
        markers,
        viewport,
        grid,
        log_entry,
        summary,
        status_block,
    })
}

/// Result of a committed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Counter state now on disk.
    pub state: CounterState,
    /// Primes in this run's batch.
    pub primes_found: usize,
    /// Markers newly written by this run.
    pub markers_written: usize,
    /// Cumulative marker count.
    pub total_markers: usize,
    /// The status sentence written to the summary file.
    pub summary: String,
    /// What happened to the README.
    pub readme: ReadmeUpdate,
}

/// Current progress, for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    /// Counter state on disk.
    pub state: CounterState,
    /// Cumulative marker count.
    pub total_markers: usize,
    /// Largest prime found so far.
    pub latest: Option<PrimeMarker>,
}

/// Owns the artifact layout and drives runs against it.
#[derive(Debug)]
pub struct Evolution {
    config: UlamConfig,
    paths: ArtifactPaths,
    markers: MarkerStore,
    reporter: Reporter,
    settings: RenderSettings,
}

impl Evolution {
    /// Build a driver from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`EvolveError::Report`] if a configured template does not
    /// compile.
    pub fn new(config: UlamConfig) -> Result<Self, EvolveError> {
        let paths = config.paths.resolve();
        let markers = MarkerStore::new(paths.grid_dir.clone(), paths.marker_log.clone());
        let reporter = Reporter::new(&config.templates)?;
        let settings = RenderSettings::from_config(&config);
        Ok(Self {
            config,
            paths,
            markers,
            reporter,
            settings,
        })
    }

    /// The configuration this driver was built from.
    pub const fn config(&self) -> &UlamConfig {
        &self.config
    }

    /// Resolved artifact locations.
    pub const fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    /// Run one batch of `batch_size` integers, dated `today`.
    ///
    /// # Errors
    ///
    /// Returns [`EvolveError`] on missing or corrupt state, a malformed
    /// marker, any I/O failure, or a template failure. On error the counter
    /// state on disk is unchanged.
    pub fn run(&self, batch_size: u64, today: NaiveDate) -> Result<RunOutcome, EvolveError> {
        let state = state::load_state(&self.paths.state_file)?;
        let history = self.markers.load()?;
        info!(
            n = state.n,
            batch_size,
            known_primes = history.markers.len(),
            "Evolution run starting"
        );

        let plan = plan_run(
            &state,
            &history.markers,
            batch_size,
            today,
            &self.reporter,
            &self.settings,
        )?;

        self.markers.commit(&history, &plan.fresh)?;
        artifacts::append_log(&self.paths.spiral_log, &plan.log_entry)?;
        artifacts::write_summary(&self.paths.summary_file, &plan.summary)?;
        let readme = artifacts::update_readme(
            &self.paths.readme_file,
            &self.config.readme.start_marker,
            &self.config.readme.end_marker,
            &plan.status_block,
        )?;
        state::save_state(&self.paths.state_file, &plan.next_state)?;

        let outcome = RunOutcome {
            state: plan.next_state,
            primes_found: plan.found.len(),
            markers_written: plan.fresh.len(),
            total_markers: plan.markers.len(),
            summary: plan.summary,
            readme,
        };
        info!(
            n = outcome.state.n,
            primes_found = outcome.primes_found,
            total_markers = outcome.total_markers,
            readme = ?outcome.readme,
            "Evolution run complete"
        );
        Ok(outcome)
    }

    /// Run one batch of the configured default size.
    ///
    /// # Errors
    ///
    /// See [`Evolution::run`].
    pub fn run_default(&self, today: NaiveDate) -> Result<RunOutcome, EvolveError> {
        self.run(self.config.run.batch_size, today)
    }

    /// Render the current marker set without changing anything.
    ///
    /// # Errors
    ///
    /// Returns [`EvolveError::Store`] if the markers cannot be loaded.
    pub fn snapshot(&self) -> Result<String, EvolveError> {
        let history = self.markers.load()?;
        let (_, grid) = render_snapshot(&history.markers, &self.settings);
        Ok(grid)
    }

    /// Report the counter and marker totals.
    ///
    /// # Errors
    ///
    /// Returns [`EvolveError::Store`] if state or markers cannot be loaded.
    pub fn status(&self) -> Result<Status, EvolveError> {
        let state = state::load_state(&self.paths.state_file)?;
        let history = self.markers.load()?;
        Ok(Status {
            state,
            total_markers: history.markers.len(),
            latest: history.markers.latest().copied(),
        })
    }

    /// Seed a new counter state at `start` and create the grid directory.
    ///
    /// # Errors
    ///
    /// Returns [`EvolveError::Store`] if a state already exists and `force`
    /// is false, or on I/O failure.
    pub fn init(
        &self,
        start: u64,
        today: NaiveDate,
        force: bool,
    ) -> Result<CounterState, EvolveError> {
        let grid_dir = self.markers.grid_dir();
        std::fs::create_dir_all(grid_dir).map_err(StoreError::io(grid_dir))?;

        let state = CounterState::new(start, today);
        state::create_state(&self.paths.state_file, &state, force)?;
        info!(
            n = start,
            path = %self.paths.state_file.display(),
            "Counter state initialized"
        );
        Ok(state)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use super::*;
    use crate::config::TemplateConfig;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn reporter() -> Reporter {
        Reporter::new(&TemplateConfig::default()).unwrap()
    }

    fn primes(markers: &[PrimeMarker]) -> Vec<u64> {
        markers.iter().map(|m| m.n).collect()
    }

    #[test]
    fn scan_finds_primes_in_range() {
        let found = scan_batch(10, 5).unwrap();
        assert_eq!(primes(&found), vec![11, 13]);
        assert_eq!(found[0].coordinate, spiral_coordinate(11).unwrap());
    }

    #[test]
    fn scan_from_zero_starts_at_one() {
        let found = scan_batch(0, 10).unwrap();
        assert_eq!(primes(&found), vec![2, 3, 5, 7]);
    }

    #[test]
    fn empty_batch_is_rejected() {
        assert!(matches!(
            scan_batch(10, 0),
            Err(EvolveError::InvalidBatchSize)
        ));
    }

    #[test]
    fn overflowing_batch_is_rejected() {
        assert!(matches!(
            scan_batch(u64::MAX - 2, 5),
            Err(EvolveError::CounterOverflow { .. })
        ));
    }

    #[test]
    fn plan_advances_state_and_counts_batch() {
        let state = CounterState::new(10, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        let history: MarkerSet = scan_batch(0, 10).unwrap().into_iter().collect();

        let plan = plan_run(
            &state,
            &history,
            5,
            today(),
            &reporter(),
            &RenderSettings::default(),
        )
        .unwrap();

        assert_eq!(plan.previous, state);
        assert_eq!(plan.next_state, CounterState::new(15, today()));
        assert_eq!(primes(&plan.found), vec![11, 13]);
        assert_eq!(plan.fresh, plan.found);
        assert_eq!(plan.markers.len(), 6);
        assert!(plan.summary.contains("N=15"));
        assert!(plan.summary.contains("2 new primes"));
        assert!(plan.log_entry.starts_with("| 15 | 2026-10-19 |\n```\n"));
        assert!(plan.log_entry.contains(&plan.grid));
        assert_eq!(plan.status_block, format!("\n> {}\n", plan.summary));
    }

    #[test]
    fn plan_skips_markers_already_known() {
        let state = CounterState::new(10, today());
        let history: MarkerSet = scan_batch(10, 5).unwrap().into_iter().collect();

        let plan = plan_run(
            &state,
            &history,
            5,
            today(),
            &reporter(),
            &RenderSettings::default(),
        )
        .unwrap();

        assert_eq!(plan.found.len(), 2);
        assert!(plan.fresh.is_empty());
        assert_eq!(plan.markers, history);
    }

    #[test]
    fn plan_is_deterministic() {
        let state = CounterState::new(40, today());
        let history: MarkerSet = scan_batch(0, 40).unwrap().into_iter().collect();
        let make = || {
            plan_run(
                &state,
                &history,
                50,
                today(),
                &reporter(),
                &RenderSettings::default(),
            )
            .unwrap()
        };
        let (a, b) = (make(), make());
        assert_eq!(a.grid, b.grid);
        assert_eq!(a.log_entry, b.log_entry);
        assert_eq!(a.summary, b.summary);
    }

    #[test]
    fn empty_history_renders_default_box() {
        let (viewport, grid) = render_snapshot(&MarkerSet::new(), &RenderSettings::default());
        assert_eq!(viewport, Viewport::centered(5));
        assert_eq!(grid.lines().count(), 11);
        assert_eq!(grid.matches('1').count(), 1);
        assert!(!grid.contains('\u{2588}'));
    }
}
