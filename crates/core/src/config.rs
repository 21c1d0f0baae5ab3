//! Configuration system for noiselab.
//!
//! Config priority: explicit `--config` path > project (./noiselab.toml) > user (~/.config/noiselab/config.toml).
//! The first file found is authoritative: parse errors are reported, never skipped.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the project directory.
pub const PROJECT_CONFIG_FILE: &str = "noiselab.toml";

/// File name inside the user config directory.
pub const USER_CONFIG_FILE: &str = "config.toml";

/// Noise ratios swept by default.
pub const DEFAULT_NOISE_RATIOS: &[f64] = &[0.005, 0.01, 0.02, 0.05, 0.1, 0.2];

/// Algorithm columns rendered in the summary table, in column order.
pub const DEFAULT_ALGORITHMS: &[&str] = &["Graph Tsetlin Machine", "Tsetlin Machine", "Standard Binary Classifier"];

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Failed to read config {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to parse config {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },
}

// ============================================================================
// Dataset Configuration
// ============================================================================

/// Where the base ratings dataset comes from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
  /// Registry name of the dataset (default: "amazon")
  pub name: String,

  /// Download URL override. Plain CSV, `.csv.gz` and `.tar.gz` sources are supported.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub url: Option<String>,

  /// Cache directory override (default: platform cache dir)
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cache_dir: Option<PathBuf>,
}

impl Default for DatasetConfig {
  fn default() -> Self {
    Self {
      name: "amazon".to_string(),
      url: None,
      cache_dir: None,
    }
  }
}

// ============================================================================
// Augmentation Configuration
// ============================================================================

/// How rows are picked for corruption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseSelection {
  /// Exactly floor(ratio * N) distinct rows
  #[default]
  Exact,
  /// Every row independently with probability `ratio`
  Bernoulli,
}

impl std::str::FromStr for NoiseSelection {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "exact" => Ok(NoiseSelection::Exact),
      "bernoulli" => Ok(NoiseSelection::Bernoulli),
      _ => Err(format!("Invalid noise selection: {}", s)),
    }
  }
}

/// How a corrupted label is redrawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseRule {
  /// Uniform draw over the whole domain; may land on the old value
  Resample,
  /// Uniform draw over the domain minus the current value
  #[default]
  Exclusive,
}

impl std::str::FromStr for NoiseRule {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "resample" => Ok(NoiseRule::Resample),
      "exclusive" => Ok(NoiseRule::Exclusive),
      _ => Err(format!("Invalid noise rule: {}", s)),
    }
  }
}

/// Expansion and noise-injection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentConfig {
  /// Noise ratios to generate, each in (0, 1)
  pub ratios: Vec<f64>,

  /// RNG seed shared by shuffle and noise (default: 42)
  pub seed: u64,

  /// Stacked copies of every rating event (default: 1)
  pub replication: usize,

  /// Split comma-separated `user_id` values into one row per user (default: true)
  pub explode_users: bool,

  /// Row selection strategy (default: exact)
  pub selection: NoiseSelection,

  /// Label redraw rule (default: exclusive)
  pub rule: NoiseRule,

  /// Also corrupt the category of selected rows (default: false)
  pub perturb_categories: bool,

  /// Lowest valid rating (default: 1)
  pub rating_min: u8,

  /// Highest valid rating (default: 5)
  pub rating_max: u8,

  /// Directory receiving noisy_dataset_<ratio>.csv files (default: ".")
  pub output_dir: PathBuf,
}

impl Default for AugmentConfig {
  fn default() -> Self {
    Self {
      ratios: DEFAULT_NOISE_RATIOS.to_vec(),
      seed: 42,
      replication: 1,
      explode_users: true,
      selection: NoiseSelection::Exact,
      rule: NoiseRule::Exclusive,
      perturb_categories: false,
      rating_min: 1,
      rating_max: 5,
      output_dir: PathBuf::from("."),
    }
  }
}

// ============================================================================
// Report Configuration
// ============================================================================

/// Summary table settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
  /// Algorithms rendered as table columns, in order
  pub algorithms: Vec<String>,

  /// Decimal places for accuracy cells (default: 2)
  pub precision: usize,

  /// LaTeX caption
  pub caption: String,

  /// LaTeX label
  pub label: String,
}

impl Default for ReportConfig {
  fn default() -> Self {
    Self {
      algorithms: DEFAULT_ALGORITHMS.iter().map(|s| s.to_string()).collect(),
      precision: 2,
      caption: "Mean accuracy (\\%) under increasing label noise".to_string(),
      label: "tab:noise_accuracy".to_string(),
    }
  }
}

// ============================================================================
// Logging Configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
  /// Log level: error, warn, info, debug, trace (default: info)
  pub level: String,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: "info".to_string(),
    }
  }
}

// ============================================================================
// Main Configuration
// ============================================================================

/// noiselab configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Base dataset source
  #[serde(default)]
  pub dataset: DatasetConfig,

  /// Expansion and noise settings
  #[serde(default)]
  pub augment: AugmentConfig,

  /// Summary table settings
  #[serde(default)]
  pub report: ReportConfig,

  /// Logging settings
  #[serde(default)]
  pub logging: LoggingConfig,
}

impl Config {
  /// Load a config file, failing loudly if it is unreadable or malformed.
  pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// First config file that exists: the project file, then the user file.
  pub fn discover(project_path: &Path) -> Option<PathBuf> {
    std::iter::once(Self::project_config_path(project_path))
      .chain(Self::user_config_path())
      .find(|candidate| candidate.is_file())
  }

  /// Resolve the effective config.
  ///
  /// An explicit path wins, then the discovered project or user file, then
  /// defaults. A file that exists but can't be read or parsed is an error; it
  /// never falls through to the next source.
  pub fn resolve(explicit: Option<&Path>, project_path: &Path) -> Result<Self, ConfigError> {
    match explicit.map(Path::to_path_buf).or_else(|| Self::discover(project_path)) {
      Some(path) => Self::load_from(&path),
      None => Ok(Self::default()),
    }
  }

  /// User-level config file: `$NOISELAB_CONFIG_DIR/config.toml`, else
  /// `noiselab/config.toml` under `$XDG_CONFIG_HOME` or the platform config dir.
  pub fn user_config_path() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("NOISELAB_CONFIG_DIR") {
      return Some(PathBuf::from(dir).join(USER_CONFIG_FILE));
    }
    let base = std::env::var_os("XDG_CONFIG_HOME")
      .map(PathBuf::from)
      .or_else(dirs::config_dir)?;
    Some(base.join("noiselab").join(USER_CONFIG_FILE))
  }

  /// Get the project-relative config path
  pub fn project_config_path(project_path: &Path) -> PathBuf {
    project_path.join(PROJECT_CONFIG_FILE)
  }

  /// Generate a default config file as a string
  pub fn generate_template() -> String {
    let ratios = DEFAULT_NOISE_RATIOS
      .iter()
      .map(|r| r.to_string())
      .collect::<Vec<_>>()
      .join(", ");
    let algorithms = DEFAULT_ALGORITHMS
      .iter()
      .map(|a| format!("\"{}\"", a))
      .collect::<Vec<_>>()
      .join(", ");

    format!(
      r#"# noiselab configuration
# Place in ./noiselab.toml (project) or ~/.config/noiselab/config.toml (user)

# ============================================================================
# Dataset
# ============================================================================

[dataset]
# Registry name (see `noiselab datasets`)
name = "amazon"

# Download URL for the raw CSV (.csv, .csv.gz or .tar.gz)
# url = "https://example.org/amazon.csv"

# cache_dir = "/tmp/noiselab-cache"

# ============================================================================
# Augmentation
# ============================================================================

[augment]
ratios = [{ratios}]
seed = 42
replication = 1

# Split comma-separated user_id lists into one row per (user, item) event
explode_users = true

# Row selection: exact (floor(ratio * N) rows) or bernoulli (per-row coin flip)
selection = "exact"

# Redraw rule: resample (may keep the old value) or exclusive (always changes)
rule = "exclusive"

# Also corrupt the category of selected rows
perturb_categories = false
rating_min = 1
rating_max = 5
output_dir = "."

# ============================================================================
# Report
# ============================================================================

[report]
algorithms = [{algorithms}]
precision = 2
label = "tab:noise_accuracy"

# ============================================================================
# Logging
# ============================================================================

[logging]
level = "info"
"#
    )
  }
}
