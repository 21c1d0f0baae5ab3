//! Raw dataset parsing and long-form expansion.

use crate::csv_io::read_rows;
use crate::{LabError, Result};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// One row of the downloaded ratings file. Columns other than these four are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
  pub product_id: String,
  pub category: String,
  pub user_id: String,
  /// Kept as text; the source contains non-numeric ratings
  pub rating: String,
}

/// One rating event: who rated which item, in which category, with what score.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExpandedRecord {
  #[serde(rename = "product_id")]
  pub item: String,
  pub category: String,
  #[serde(rename = "user_id")]
  pub user: String,
  pub rating: u8,
}

/// Parse a rating. Numeric values are truncated toward zero; anything else is rejected.
pub fn parse_rating(raw: &str) -> Option<u8> {
  let value: f64 = raw.trim().parse().ok()?;
  if !value.is_finite() || value < 0.0 || value >= 256.0 {
    return None;
  }
  Some(value.trunc() as u8)
}

/// Read the raw dataset file.
pub fn load_raw(path: &Path) -> Result<Vec<RawRecord>> {
  read_rows(path)
}

/// Convert raw rows into rating events, dropping rows without a usable rating or key.
pub fn to_ratings(raw: Vec<RawRecord>) -> Vec<ExpandedRecord> {
  let total = raw.len();
  let ratings: Vec<ExpandedRecord> = raw
    .into_iter()
    .filter_map(|r| {
      let rating = parse_rating(&r.rating)?;
      if r.product_id.trim().is_empty() || r.user_id.trim().is_empty() {
        return None;
      }
      Some(ExpandedRecord {
        item: r.product_id,
        category: r.category,
        user: r.user_id,
        rating,
      })
    })
    .collect();

  let dropped = total - ratings.len();
  if dropped > 0 {
    warn!("Dropped {} of {} rows with invalid rating or empty key", dropped, total);
  }
  ratings
}

/// Load the base dataset as rating events.
pub fn load_ratings(path: &Path) -> Result<Vec<ExpandedRecord>> {
  let raw = load_raw(path)?;
  info!("Loaded {} raw rows from {}", raw.len(), path.display());
  Ok(to_ratings(raw))
}

/// Split the comma-separated `user` field into one event per user.
///
/// A user listed twice on the same row yields one event.
pub fn explode_users(records: &[ExpandedRecord]) -> Vec<ExpandedRecord> {
  records
    .iter()
    .flat_map(|record| {
      let mut seen = HashSet::new();
      record
        .user
        .split(',')
        .map(str::trim)
        .filter(move |user| !user.is_empty() && seen.insert(*user))
        .map(move |user| ExpandedRecord {
          user: user.to_string(),
          ..record.clone()
        })
    })
    .collect()
}

/// Expand rating events into the long-form table: user explode (one row per
/// user and item), `replication` stacked copies, then a shuffle.
pub fn expand<R: Rng + ?Sized>(
  records: &[ExpandedRecord],
  explode: bool,
  replication: usize,
  rng: &mut R,
) -> Result<Vec<ExpandedRecord>> {
  if replication == 0 {
    return Err(LabError::InvalidConfig("replication must be at least 1".to_string()));
  }

  let exploded;
  let base: &[ExpandedRecord] = if explode {
    exploded = explode_users(records);
    debug!("Exploded {} rows into {} user events", records.len(), exploded.len());
    &exploded
  } else {
    records
  };

  let mut expanded = Vec::with_capacity(base.len() * replication);
  for _ in 0..replication {
    expanded.extend_from_slice(base);
  }
  expanded.shuffle(rng);

  debug!("Expanded {} rows x{} -> {}", base.len(), replication, expanded.len());
  Ok(expanded)
}
