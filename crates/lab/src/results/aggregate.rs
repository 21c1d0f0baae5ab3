//! Grouping and pivoting of result rows.

use super::ResultRow;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::warn;

/// Mean accuracy of one (algorithm, noise ratio) group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMean {
  pub algorithm: String,
  pub noise_ratio: f64,
  pub mean_accuracy: f64,
  /// Mean over the runs that reported a time
  pub mean_total_time: Option<f64>,
  pub runs: usize,
}

#[derive(Debug, Clone, Copy)]
struct Ratio(f64);

impl PartialEq for Ratio {
  fn eq(&self, other: &Self) -> bool {
    self.cmp(other) == Ordering::Equal
  }
}

impl Eq for Ratio {}

impl PartialOrd for Ratio {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for Ratio {
  fn cmp(&self, other: &Self) -> Ordering {
    self.0.total_cmp(&other.0)
  }
}

#[derive(Default)]
struct Accumulator {
  accuracy_sum: f64,
  runs: usize,
  time_sum: f64,
  timed_runs: usize,
}

/// Average accuracy per (algorithm, noise ratio), ordered by algorithm then ratio.
///
/// Rows with a non-finite ratio or accuracy are skipped.
pub fn group_means(rows: &[ResultRow]) -> Vec<GroupMean> {
  let mut groups: BTreeMap<(String, Ratio), Accumulator> = BTreeMap::new();
  let mut skipped = 0usize;

  for row in rows {
    if !row.is_valid() {
      skipped += 1;
      continue;
    }
    let acc = groups.entry((row.algorithm.clone(), Ratio(row.noise_ratio))).or_default();
    acc.accuracy_sum += row.accuracy;
    acc.runs += 1;
    if let Some(time) = row.total_time.filter(|t| t.is_finite()) {
      acc.time_sum += time;
      acc.timed_runs += 1;
    }
  }

  if skipped > 0 {
    warn!("Skipped {} result rows with missing or non-finite values", skipped);
  }

  groups
    .into_iter()
    .map(|((algorithm, Ratio(noise_ratio)), acc)| GroupMean {
      algorithm,
      noise_ratio,
      mean_accuracy: acc.accuracy_sum / acc.runs as f64,
      mean_total_time: (acc.timed_runs > 0).then(|| acc.time_sum / acc.timed_runs as f64),
      runs: acc.runs,
    })
    .collect()
}

/// Accuracy laid out with one row per noise ratio and one column per algorithm.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PivotTable {
  /// Distinct ratios, ascending
  pub noise_ratios: Vec<f64>,
  /// Algorithm names, sorted
  pub algorithms: Vec<String>,
  /// `cells[row][column]`; `None` where no run exists
  pub cells: Vec<Vec<Option<f64>>>,
}

impl PivotTable {
  pub fn from_groups(groups: &[GroupMean]) -> Self {
    let mut noise_ratios: Vec<f64> = groups.iter().map(|g| g.noise_ratio).collect();
    noise_ratios.sort_by(f64::total_cmp);
    noise_ratios.dedup_by(|a, b| a.total_cmp(b) == Ordering::Equal);

    let mut algorithms: Vec<String> = groups.iter().map(|g| g.algorithm.clone()).collect();
    algorithms.sort();
    algorithms.dedup();

    let mut cells = vec![vec![None; algorithms.len()]; noise_ratios.len()];
    for group in groups {
      let row = noise_ratios.partition_point(|r| r.total_cmp(&group.noise_ratio) == Ordering::Less);
      if let Ok(col) = algorithms.binary_search(&group.algorithm) {
        cells[row][col] = Some(group.mean_accuracy);
      }
    }

    Self {
      noise_ratios,
      algorithms,
      cells,
    }
  }

  /// Column index of an algorithm.
  pub fn column(&self, algorithm: &str) -> Option<usize> {
    self.algorithms.iter().position(|a| a == algorithm)
  }

  pub fn get(&self, row: usize, algorithm: &str) -> Option<f64> {
    let col = self.column(algorithm)?;
    self.cells.get(row)?.get(col).copied().flatten()
  }

  pub fn is_empty(&self) -> bool {
    self.noise_ratios.is_empty()
  }
}

/// Pivot group means into a [`PivotTable`].
pub fn pivot(groups: &[GroupMean]) -> PivotTable {
  PivotTable::from_groups(groups)
}
