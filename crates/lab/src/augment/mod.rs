//! Dataset augmentation: long-form expansion plus label-noise injection.
//!
//! For every requested noise ratio the base ratings are expanded, shuffled and
//! corrupted with an RNG seeded from the configured seed, then appended to
//! `noisy_dataset_<ratio>.csv`.

mod expand;
mod noise;

use std::path::{Path, PathBuf};

pub use expand::{ExpandedRecord, RawRecord, expand, explode_users, load_ratings, load_raw, parse_rating, to_ratings};
pub use noise::{NoiseSummary, draw_replacement, exact_count, inject_noise, select_rows, validate_ratio};
use noiselab_core::AugmentConfig;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::csv_io::append_rows;
use crate::{LabError, Result};

/// An expanded table with noise applied at one ratio.
#[derive(Debug, Clone)]
pub struct AugmentedDataset {
  pub ratio: f64,
  pub records: Vec<ExpandedRecord>,
  pub noise: NoiseSummary,
}

/// Outcome of writing one noisy dataset file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AugmentReport {
  pub ratio: f64,
  /// Rating events read from the base dataset
  pub input_rows: usize,
  /// Rows written for this ratio
  pub output_rows: usize,
  pub noise: NoiseSummary,
  pub output: PathBuf,
  /// Whether rows were appended to an existing file
  pub appended: bool,
}

/// Render a ratio the way it appears in output file names (`0.005`, `0.1`).
pub fn format_ratio(ratio: f64) -> String {
  format!("{}", ratio)
}

/// Path of the noisy dataset for `ratio` inside `dir`.
pub fn noisy_output_path(dir: &Path, ratio: f64) -> PathBuf {
  dir.join(format!("noisy_dataset_{}.csv", format_ratio(ratio)))
}

/// Append `records` to the noisy dataset at `path`, writing the header only for a new file.
pub fn append_records(path: &Path, records: &[ExpandedRecord]) -> Result<bool> {
  append_rows(path, records)
}

/// Expand `ratings` and inject noise at `ratio`.
pub fn augment(ratings: &[ExpandedRecord], ratio: f64, config: &AugmentConfig) -> Result<AugmentedDataset> {
  validate_ratio(ratio)?;

  let mut rng = StdRng::seed_from_u64(config.seed);
  let mut records = expand(ratings, config.explode_users, config.replication, &mut rng)?;
  let noise = inject_noise(&mut records, ratio, config, &mut rng)?;

  info!(
    "Augmented {} ratings to {} rows at noise {} ({} labels changed)",
    ratings.len(),
    records.len(),
    format_ratio(ratio),
    noise.ratings_changed
  );

  Ok(AugmentedDataset { ratio, records, noise })
}

/// Produce one noisy dataset file per configured ratio from the base dataset at `input`.
pub fn run_augment(input: &Path, config: &AugmentConfig) -> Result<Vec<AugmentReport>> {
  if config.ratios.is_empty() {
    return Err(LabError::InvalidConfig("no noise ratios configured".to_string()));
  }
  // Validate every ratio before any file is touched
  for &ratio in &config.ratios {
    validate_ratio(ratio)?;
  }

  let ratings = load_ratings(input)?;
  if ratings.is_empty() {
    warn!("No usable ratings in {}", input.display());
  }

  let mut reports = Vec::with_capacity(config.ratios.len());
  for &ratio in &config.ratios {
    let dataset = augment(&ratings, ratio, config)?;
    let output = noisy_output_path(&config.output_dir, ratio);
    let appended = append_records(&output, &dataset.records)?;
    if appended {
      info!("Appended to existing {}", output.display());
    }

    reports.push(AugmentReport {
      ratio,
      input_rows: ratings.len(),
      output_rows: dataset.records.len(),
      noise: dataset.noise,
      output,
      appended,
    });
  }

  Ok(reports)
}
