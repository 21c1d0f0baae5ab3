//! Synthetic noisy XOR data.
//!
//! Two symbols from {A, B}; label 0 when they match, 1 otherwise. Each label
//! is flipped independently with probability `noise`.

use crate::csv_io::write_rows;
use crate::{LabError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

pub const SYMBOLS: [char; 2] = ['A', 'B'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XorSample {
  pub x1: char,
  pub x2: char,
  pub label: u8,
}

/// Noise-free XOR label of two symbols.
pub fn xor_label(x1: char, x2: char) -> u8 {
  if x1 == x2 { 0 } else { 1 }
}

/// Generate `count` samples with labels flipped at rate `noise` (`0.0` for a clean set).
pub fn noisy_xor<R: Rng + ?Sized>(count: usize, noise: f64, rng: &mut R) -> Result<Vec<XorSample>> {
  if !(0.0..=1.0).contains(&noise) {
    return Err(LabError::InvalidConfig(format!("XOR noise must be in [0, 1], got {}", noise)));
  }

  let samples = (0..count)
    .map(|_| {
      let x1 = SYMBOLS[rng.gen_range(0..SYMBOLS.len())];
      let x2 = SYMBOLS[rng.gen_range(0..SYMBOLS.len())];
      let mut label = xor_label(x1, x2);
      if rng.gen_bool(noise) {
        label = 1 - label;
      }
      XorSample { x1, x2, label }
    })
    .collect();
  Ok(samples)
}

/// Count samples whose label disagrees with the clean XOR label.
pub fn flipped(samples: &[XorSample]) -> usize {
  samples.iter().filter(|s| s.label != xor_label(s.x1, s.x2)).count()
}

/// Generate and write a sample set as CSV (`x1,x2,label`).
pub fn write_noisy_xor<R: Rng + ?Sized>(path: &Path, count: usize, noise: f64, rng: &mut R) -> Result<usize> {
  let samples = noisy_xor(count, noise, rng)?;
  write_rows(path, &samples)?;
  let flips = flipped(&samples);
  info!("Wrote {} XOR samples ({} flipped) to {}", samples.len(), flips, path.display());
  Ok(flips)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::csv_io::read_rows;
  use rand::SeedableRng;
  use rand::rngs::StdRng;
  use tempfile::TempDir;

  #[test]
  fn test_xor_label() {
    assert_eq!(xor_label('A', 'A'), 0);
    assert_eq!(xor_label('B', 'B'), 0);
    assert_eq!(xor_label('A', 'B'), 1);
    assert_eq!(xor_label('B', 'A'), 1);
  }

  #[test]
  fn test_clean_set_has_no_flips() {
    let samples = noisy_xor(500, 0.0, &mut StdRng::seed_from_u64(42)).unwrap();
    assert_eq!(samples.len(), 500);
    assert_eq!(flipped(&samples), 0);
  }

  #[test]
  fn test_noise_rate() {
    let samples = noisy_xor(20_000, 0.1, &mut StdRng::seed_from_u64(42)).unwrap();
    let rate = flipped(&samples) as f64 / samples.len() as f64;
    assert!((rate - 0.1).abs() < 0.01, "rate {rate}");
  }

  #[test]
  fn test_rejects_bad_noise() {
    let mut rng = StdRng::seed_from_u64(1);
    assert!(noisy_xor(10, 1.5, &mut rng).is_err());
    assert!(noisy_xor(10, -0.1, &mut rng).is_err());
    assert!(noisy_xor(10, f64::NAN, &mut rng).is_err());
  }

  #[test]
  fn test_write_noisy_xor() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("xor.csv");

    let flips = write_noisy_xor(&path, 100, 1.0, &mut StdRng::seed_from_u64(3)).unwrap();
    assert_eq!(flips, 100);

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("x1,x2,label\n"));
    let rows: Vec<XorSample> = read_rows(&path).unwrap();
    assert_eq!(rows.len(), 100);
  }
}
