//! Label-noise injection.
//!
//! Selected rows get their rating redrawn from the rating domain and,
//! optionally, their category redrawn from the categories present in the table.

use super::ExpandedRecord;
use crate::{LabError, Result};
use noiselab_core::{AugmentConfig, NoiseRule, NoiseSelection};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// What a noise pass did to a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoiseSummary {
  /// Rows in the table
  pub total_rows: usize,
  /// Rows picked for corruption
  pub selected: usize,
  /// Selected rows whose rating actually differs afterwards
  pub ratings_changed: usize,
  /// Selected rows whose category actually differs afterwards
  pub categories_changed: usize,
}

impl NoiseSummary {
  /// Fraction of all rows whose rating changed.
  pub fn changed_fraction(&self) -> f64 {
    if self.total_rows == 0 {
      0.0
    } else {
      self.ratings_changed as f64 / self.total_rows as f64
    }
  }
}

/// Reject ratios outside the open interval (0, 1).
pub fn validate_ratio(ratio: f64) -> Result<()> {
  if ratio.is_finite() && ratio > 0.0 && ratio < 1.0 {
    Ok(())
  } else {
    Err(LabError::InvalidNoiseRatio(ratio))
  }
}

/// Absorbs float error in `ratio * len` (0.29 * 100 = 28.999...).
const COUNT_EPSILON: f64 = 1e-9;

/// Number of rows `Exact` selection corrupts: `floor(ratio * len)`.
pub fn exact_count(len: usize, ratio: f64) -> usize {
  ((ratio * len as f64 + COUNT_EPSILON).floor() as usize).min(len)
}

/// Pick the row indices to corrupt, in ascending order.
pub fn select_rows<R: Rng + ?Sized>(len: usize, ratio: f64, selection: NoiseSelection, rng: &mut R) -> Vec<usize> {
  let mut indices = match selection {
    NoiseSelection::Exact => {
      rand::seq::index::sample(rng, len, exact_count(len, ratio)).into_vec()
    }
    NoiseSelection::Bernoulli => (0..len).filter(|_| rng.gen_bool(ratio)).collect(),
  };
  indices.sort_unstable();
  indices
}

/// Draw a replacement label from `domain`.
///
/// Returns `None` when the rule leaves nothing to draw from.
pub fn draw_replacement<T, R>(domain: &[T], current: &T, rule: NoiseRule, rng: &mut R) -> Option<T>
where
  T: Clone + PartialEq,
  R: Rng + ?Sized,
{
  match rule {
    NoiseRule::Resample => domain.choose(rng).cloned(),
    NoiseRule::Exclusive => {
      let candidates: Vec<&T> = domain.iter().filter(|v| *v != current).collect();
      candidates.choose(rng).map(|v| (*v).clone())
    }
  }
}

/// Corrupt `ratio` of the rows in place.
pub fn inject_noise<R: Rng + ?Sized>(
  records: &mut [ExpandedRecord],
  ratio: f64,
  config: &AugmentConfig,
  rng: &mut R,
) -> Result<NoiseSummary> {
  validate_ratio(ratio)?;
  if config.rating_min > config.rating_max {
    return Err(LabError::InvalidConfig(format!(
      "rating_min ({}) exceeds rating_max ({})",
      config.rating_min, config.rating_max
    )));
  }

  let ratings: Vec<u8> = (config.rating_min..=config.rating_max).collect();
  let categories: Vec<String> = records
    .iter()
    .map(|r| r.category.clone())
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect();

  let selected = select_rows(records.len(), ratio, config.selection, rng);
  let mut summary = NoiseSummary {
    total_rows: records.len(),
    selected: selected.len(),
    ..Default::default()
  };

  for idx in selected {
    let record = &mut records[idx];

    if let Some(rating) = draw_replacement(&ratings, &record.rating, config.rule, rng) {
      if rating != record.rating {
        summary.ratings_changed += 1;
      }
      record.rating = rating;
    }

    if config.perturb_categories
      && let Some(category) = draw_replacement(&categories, &record.category, config.rule, rng)
    {
      if category != record.category {
        summary.categories_changed += 1;
      }
      record.category = category;
    }
  }

  debug!(
    "Noise {}: selected {} of {} rows, {} ratings and {} categories changed",
    ratio, summary.selected, summary.total_rows, summary.ratings_changed, summary.categories_changed
  );
  Ok(summary)
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::SeedableRng;
  use rand::rngs::StdRng;

  fn table(n: usize) -> Vec<ExpandedRecord> {
    (0..n)
      .map(|i| ExpandedRecord {
        item: format!("B{:04}", i % 97),
        category: format!("Cat{}", i % 7),
        user: format!("U{}", i % 131),
        rating: (i % 5) as u8 + 1,
      })
      .collect()
  }

  #[test]
  fn test_validate_ratio() {
    assert!(validate_ratio(0.005).is_ok());
    assert!(validate_ratio(0.99).is_ok());
    assert!(validate_ratio(0.0).is_err());
    assert!(validate_ratio(1.0).is_err());
    assert!(validate_ratio(-0.1).is_err());
    assert!(validate_ratio(f64::NAN).is_err());
  }

  #[test]
  fn test_exact_selection_count() {
    let mut rng = StdRng::seed_from_u64(42);
    let rows = select_rows(1000, 0.05, NoiseSelection::Exact, &mut rng);
    assert_eq!(rows.len(), 50);
    assert!(rows.windows(2).all(|w| w[0] < w[1]));
    assert!(rows.iter().all(|&i| i < 1000));

    // floor(0.005 * 999) = 4
    let rows = select_rows(999, 0.005, NoiseSelection::Exact, &mut rng);
    assert_eq!(rows.len(), 4);
  }

  #[test]
  fn test_exact_count_survives_float_error() {
    assert_eq!(exact_count(100, 0.29), 29);
    assert_eq!(exact_count(100, 0.57), 57);
    assert_eq!(exact_count(1000, 0.005), 5);
    assert_eq!(exact_count(10, 0.99), 9);
    assert_eq!(exact_count(0, 0.5), 0);

    let mut rng = StdRng::seed_from_u64(42);
    assert_eq!(select_rows(100, 0.29, NoiseSelection::Exact, &mut rng).len(), 29);
    assert_eq!(select_rows(100, 0.57, NoiseSelection::Exact, &mut rng).len(), 57);
  }

  #[test]
  fn test_bernoulli_selection_near_ratio() {
    let mut rng = StdRng::seed_from_u64(42);
    let rows = select_rows(20_000, 0.1, NoiseSelection::Bernoulli, &mut rng);
    let fraction = rows.len() as f64 / 20_000.0;
    assert!((fraction - 0.1).abs() < 0.01, "fraction {fraction}");
  }

  #[test]
  fn test_exclusive_always_changes() {
    let mut rng = StdRng::seed_from_u64(3);
    let domain = [1u8, 2, 3, 4, 5];
    for current in domain {
      for _ in 0..50 {
        let drawn = draw_replacement(&domain, &current, NoiseRule::Exclusive, &mut rng).unwrap();
        assert_ne!(drawn, current);
      }
    }
    assert_eq!(draw_replacement(&[1u8], &1, NoiseRule::Exclusive, &mut rng), None);
  }

  #[test]
  fn test_default_changes_exactly_selected_ratings() {
    let mut records = table(5000);
    let original = records.clone();

    let summary = inject_noise(&mut records, 0.1, &AugmentConfig::default(), &mut StdRng::seed_from_u64(42)).unwrap();

    assert_eq!(summary.selected, 500);
    assert_eq!(summary.ratings_changed, 500);
    assert_eq!(summary.categories_changed, 0);
    assert!((summary.changed_fraction() - 0.1).abs() < 1e-9);
    assert!(records.iter().zip(&original).all(|(a, b)| a.category == b.category));
  }

  #[test]
  fn test_resample_keeps_row_count_and_domain() {
    let mut records = table(5000);
    let original = records.clone();
    let config = AugmentConfig {
      rule: NoiseRule::Resample,
      ..Default::default()
    };

    let summary = inject_noise(&mut records, 0.1, &config, &mut StdRng::seed_from_u64(42)).unwrap();

    assert_eq!(records.len(), original.len());
    assert_eq!(summary.total_rows, 5000);
    assert_eq!(summary.selected, 500);
    assert!(records.iter().all(|r| (1..=5).contains(&r.rating)));

    let changed = records.iter().zip(&original).filter(|(a, b)| a.rating != b.rating).count();
    assert_eq!(changed, summary.ratings_changed);
    // Resample keeps the old rating one time in five
    let fraction = summary.changed_fraction();
    assert!(fraction <= 0.1 && fraction > 0.06, "fraction {fraction}");

    // Keys are never touched
    assert!(records.iter().zip(&original).all(|(a, b)| a.item == b.item && a.user == b.user));
  }

  #[test]
  fn test_inject_noise_exclusive_changes_exactly_selected() {
    let mut records = table(2000);
    let config = AugmentConfig {
      rule: NoiseRule::Exclusive,
      perturb_categories: true,
      ..Default::default()
    };

    let summary = inject_noise(&mut records, 0.2, &config, &mut StdRng::seed_from_u64(9)).unwrap();
    assert_eq!(summary.selected, 400);
    assert_eq!(summary.ratings_changed, 400);
    assert_eq!(summary.categories_changed, 400);
    assert!((summary.changed_fraction() - 0.2).abs() < 1e-9);
  }

  #[test]
  fn test_inject_noise_rejects_bad_input() {
    let mut records = table(10);
    let mut rng = StdRng::seed_from_u64(1);

    let result = inject_noise(&mut records, 1.5, &AugmentConfig::default(), &mut rng);
    assert!(matches!(result, Err(LabError::InvalidNoiseRatio(_))));

    let config = AugmentConfig {
      rating_min: 5,
      rating_max: 1,
      ..Default::default()
    };
    let result = inject_noise(&mut records, 0.1, &config, &mut rng);
    assert!(matches!(result, Err(LabError::InvalidConfig(_))));
  }

  #[test]
  fn test_inject_noise_on_empty_table() {
    let mut records: Vec<ExpandedRecord> = Vec::new();
    let summary = inject_noise(&mut records, 0.1, &AugmentConfig::default(), &mut StdRng::seed_from_u64(1)).unwrap();
    assert_eq!(summary, NoiseSummary::default());
  }
}
