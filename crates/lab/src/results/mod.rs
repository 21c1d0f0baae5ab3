//! Experiment results log.
//!
//! Training runs append one [`ResultRow`] each to a shared CSV file; the
//! aggregator reads it back, filters by experiment and averages per
//! (algorithm, noise ratio).

mod aggregate;

pub use aggregate::{GroupMean, PivotTable, group_means, pivot};

use crate::csv_io::{append_rows, read_rows};
use crate::{LabError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

/// One training run.
///
/// Column names follow the results file written by the training scripts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
  #[serde(rename = "Algorithm")]
  pub algorithm: String,
  #[serde(rename = "Noise_Ratio")]
  pub noise_ratio: f64,
  #[serde(rename = "T", default)]
  pub threshold: Option<f64>,
  #[serde(rename = "s", default)]
  pub specificity: Option<f64>,
  #[serde(rename = "Max_Included_Literals", default)]
  pub max_included_literals: Option<f64>,
  #[serde(rename = "Epochs", default)]
  pub epochs: Option<f64>,
  #[serde(rename = "Platform", default)]
  pub platform: Option<String>,
  /// Wall-clock training time in seconds
  #[serde(rename = "Total_Time", default)]
  pub total_time: Option<f64>,
  /// Test accuracy in percent
  #[serde(rename = "Accuracy")]
  pub accuracy: f64,
  #[serde(rename = "Exp_id", default)]
  pub exp_id: Option<String>,
}

impl ResultRow {
  /// Minimal row with only the required columns set.
  pub fn new(algorithm: impl Into<String>, noise_ratio: f64, accuracy: f64) -> Self {
    Self {
      algorithm: algorithm.into(),
      noise_ratio,
      threshold: None,
      specificity: None,
      max_included_literals: None,
      epochs: None,
      platform: None,
      total_time: None,
      accuracy,
      exp_id: None,
    }
  }

  /// Rows with a non-finite ratio or accuracy can't be averaged.
  pub fn is_valid(&self) -> bool {
    self.noise_ratio.is_finite() && self.accuracy.is_finite() && !self.algorithm.trim().is_empty()
  }
}

/// Read every row of a results file.
pub fn load_results(path: &Path) -> Result<Vec<ResultRow>> {
  let rows: Vec<ResultRow> = read_rows(path)?;
  info!("Loaded {} result rows from {}", rows.len(), path.display());
  Ok(rows)
}

/// Append one run to the results file, creating it with a header if needed.
pub fn append_result(path: &Path, row: &ResultRow) -> Result<()> {
  if !row.is_valid() {
    return Err(LabError::InvalidConfig(format!(
      "result row needs an algorithm and finite ratio/accuracy, got {:?}",
      row
    )));
  }
  append_rows(path, std::slice::from_ref(row))?;
  debug!("Recorded {} @ {} -> {}", row.algorithm, row.noise_ratio, row.accuracy);
  Ok(())
}

/// Keep only rows of one experiment. `None` keeps everything.
pub fn filter_experiment(rows: Vec<ResultRow>, exp_id: Option<&str>) -> Vec<ResultRow> {
  match exp_id {
    None => rows,
    Some(id) => rows.into_iter().filter(|r| r.exp_id.as_deref() == Some(id)).collect(),
  }
}

/// Distinct experiment ids present in `rows`, sorted.
pub fn experiment_ids(rows: &[ResultRow]) -> Vec<String> {
  rows
    .iter()
    .filter_map(|r| r.exp_id.clone())
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect()
}
