//! Configuration loading and typed config structures for the Ulam spiral.
//!
//! The canonical configuration lives in `ulam-config.yaml` next to the
//! state files. This module defines strongly-typed structs that mirror the
//! YAML structure, and provides a loader that reads and validates the file.
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use ulam_spiral::{DEFAULT_RADIUS, Glyphs};

/// Largest accepted `run.default_radius`. The empty-grid box is rendered in
/// full, so this bounds it to about a million cells.
pub const MAX_DEFAULT_RADIUS: i64 = 500;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is not usable.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `ulam-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UlamConfig {
    /// Batch size and rendering parameters.
    #[serde(default)]
    pub run: RunConfig,

    /// Where each artifact lives on disk.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Characters used by the text grid.
    #[serde(default)]
    pub glyphs: GlyphConfig,

    /// Sentinel strings delimiting the README status region.
    #[serde(default)]
    pub readme: ReadmeConfig,

    /// Report templates (`minijinja` syntax).
    #[serde(default)]
    pub templates: TemplateConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl UlamConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `ULAM_BASE_DIR` overrides `paths.base_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.paths.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.run.batch_size == 0 {
            return Err(ConfigError::Invalid {
                reason: "run.batch_size must be at least 1".to_owned(),
            });
        }
        if !(0..=MAX_DEFAULT_RADIUS).contains(&self.run.default_radius) {
            return Err(ConfigError::Invalid {
                reason: format!("run.default_radius must be between 0 and {MAX_DEFAULT_RADIUS}"),
            });
        }
        if self.readme.start_marker.is_empty() || self.readme.end_marker.is_empty() {
            return Err(ConfigError::Invalid {
                reason: "readme markers must not be empty".to_owned(),
            });
        }
        if self.readme.start_marker == self.readme.end_marker {
            return Err(ConfigError::Invalid {
                reason: "readme start and end markers must differ".to_owned(),
            });
        }
        Ok(())
    }
}

/// Per-run parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Integers scanned per run when the CLI does not say otherwise.
    #[serde(default = "default_batch_size")]
    pub batch_size: u64,

    /// Half-width of the grid drawn before any prime is known.
    #[serde(default = "default_radius")]
    pub default_radius: i64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            default_radius: default_radius(),
        }
    }
}

/// Artifact locations, relative to `base_dir` unless absolute.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PathsConfig {
    /// Directory every other path is resolved against.
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Counter state JSON.
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    /// Directory holding one marker file per prime.
    #[serde(default = "default_grid_dir")]
    pub grid_dir: PathBuf,

    /// Append-only JSON Lines marker log.
    #[serde(default = "default_marker_log")]
    pub marker_log: PathBuf,

    /// Append-only Markdown run log.
    #[serde(default = "default_spiral_log")]
    pub spiral_log: PathBuf,

    /// Latest status sentence.
    #[serde(default = "default_summary_file")]
    pub summary_file: PathBuf,

    /// README whose status region is refreshed each run.
    #[serde(default = "default_readme_file")]
    pub readme_file: PathBuf,
}

impl PathsConfig {
    /// Override the base directory from the environment.
    ///
    /// - `ULAM_BASE_DIR` overrides `base_dir`
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ULAM_BASE_DIR") {
            self.base_dir = PathBuf::from(val);
        }
    }

    /// Resolve every path against `base_dir`.
    pub fn resolve(&self) -> ArtifactPaths {
        ArtifactPaths {
            state_file: self.base_dir.join(&self.state_file),
            grid_dir: self.base_dir.join(&self.grid_dir),
            marker_log: self.base_dir.join(&self.marker_log),
            spiral_log: self.base_dir.join(&self.spiral_log),
            summary_file: self.base_dir.join(&self.summary_file),
            readme_file: self.base_dir.join(&self.readme_file),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            state_file: default_state_file(),
            grid_dir: default_grid_dir(),
            marker_log: default_marker_log(),
            spiral_log: default_spiral_log(),
            summary_file: default_summary_file(),
            readme_file: default_readme_file(),
        }
    }
}

/// Fully resolved artifact paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// Counter state JSON.
    pub state_file: PathBuf,
    /// Marker file directory.
    pub grid_dir: PathBuf,
    /// Marker log.
    pub marker_log: PathBuf,
    /// Run log.
    pub spiral_log: PathBuf,
    /// Status sentence.
    pub summary_file: PathBuf,
    /// README.
    pub readme_file: PathBuf,
}

impl ArtifactPaths {
    /// Resolve the default layout under `base_dir`.
    pub fn under(base_dir: &Path) -> Self {
        PathsConfig {
            base_dir: base_dir.to_path_buf(),
            ..PathsConfig::default()
        }
        .resolve()
    }
}

/// Grid glyphs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GlyphConfig {
    /// The spiral center.
    #[serde(default = "default_origin_glyph")]
    pub origin: char,

    /// A prime.
    #[serde(default = "default_filled_glyph")]
    pub filled: char,

    /// Anything else.
    #[serde(default = "default_blank_glyph")]
    pub blank: char,
}

impl GlyphConfig {
    /// Convert to the renderer's glyph set.
    pub const fn glyphs(&self) -> Glyphs {
        Glyphs {
            origin: self.origin,
            filled: self.filled,
            blank: self.blank,
        }
    }
}

impl Default for GlyphConfig {
    fn default() -> Self {
        Self {
            origin: default_origin_glyph(),
            filled: default_filled_glyph(),
            blank: default_blank_glyph(),
        }
    }
}

/// README status region sentinels.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReadmeConfig {
    /// Opening sentinel.
    #[serde(default = "default_start_marker")]
    pub start_marker: String,

    /// Closing sentinel.
    #[serde(default = "default_end_marker")]
    pub end_marker: String,
}

impl Default for ReadmeConfig {
    fn default() -> Self {
        Self {
            start_marker: default_start_marker(),
            end_marker: default_end_marker(),
        }
    }
}

/// Report templates.
///
/// Each is a `minijinja` template. Undefined variables are errors.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplateConfig {
    /// One run-log row. Variables: `n`, `date`, `grid`.
    #[serde(default = "default_log_entry_template")]
    pub log_entry: String,

    /// The status sentence. Variables: `n`, `primes_found`, `total_primes`.
    #[serde(default = "default_summary_template")]
    pub summary: String,

    /// README region body. Variables: `summary`.
    #[serde(default = "default_status_block_template")]
    pub status_block: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            log_entry: default_log_entry_template(),
            summary: default_summary_template(),
            status_block: default_status_block_template(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_batch_size() -> u64 {
    50
}

const fn default_radius() -> i64 {
    DEFAULT_RADIUS
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_state_file() -> PathBuf {
    PathBuf::from("state.json")
}

fn default_grid_dir() -> PathBuf {
    PathBuf::from("grid")
}

fn default_marker_log() -> PathBuf {
    PathBuf::from("markers.jsonl")
}

fn default_spiral_log() -> PathBuf {
    PathBuf::from("spiral-log.md")
}

fn default_summary_file() -> PathBuf {
    PathBuf::from("summary.txt")
}

fn default_readme_file() -> PathBuf {
    PathBuf::from("README.md")
}

const fn default_origin_glyph() -> char {
    '1'
}

const fn default_filled_glyph() -> char {
    '\u{2588}'
}

const fn default_blank_glyph() -> char {
    ' '
}

fn default_start_marker() -> String {
    "<!-- LATEST_STATUS_START -->".to_owned()
}

fn default_end_marker() -> String {
    "<!-- LATEST_STATUS_END -->".to_owned()
}

fn default_log_entry_template() -> String {
    "| {{ n }} | {{ date }} |\n```\n{{ grid }}\n``` |\n".to_owned()
}

fn default_summary_template() -> String {
    concat!(
        "The prime search has reached N={{ n }}. ",
        "Today, {{ primes_found }} new primes (celestial bodies) were discovered ",
        "and added to the constellation map. ",
        "The diagonal clusters characteristic of the Ulam Spiral are becoming ",
        "more visible in the project's grid.",
    )
    .to_owned()
}

fn default_status_block_template() -> String {
    "\n> {{ summary }}\n".to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}
