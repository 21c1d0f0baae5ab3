//! Common fixtures for lab integration tests

use lab::results::{ResultRow, append_result};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write a raw ratings file shaped like the downloaded dataset, with `rows` usable
/// rows plus one row carrying a non-numeric rating.
#[allow(dead_code)]
pub fn write_raw_dataset(dir: &Path, rows: usize) -> PathBuf {
  let mut content = String::from("product_id,product_name,category,discounted_price,rating,rating_count,user_id\n");
  for i in 0..rows {
    let _ = writeln!(
      content,
      "B{:05},\"Product {}, rev {}\",Category{}|Sub{},\"₹{}\",{}.{},\"{},{}\",\"U{},U{}\"",
      i,
      i,
      i % 3,
      i % 6,
      i % 9,
      100 + i,
      i % 5 + 1,
      i % 10,
      i % 7 + 1,
      i * 13 % 1000,
      i,
      i + 1
    );
  }
  content.push_str("B99999,Broken,Category0|Sub0,₹1,|,992,U0\n");

  let path = dir.join("amazon.csv");
  std::fs::write(&path, content).expect("Failed to write dataset");
  path
}

/// Create a results log covering two experiments.
///
/// Experiment `main` has three algorithms at three ratios with two runs each;
/// experiment `pilot` has one algorithm at a ratio `main` never uses.
#[allow(dead_code)]
pub fn write_results(dir: &TempDir) -> PathBuf {
  let path = dir.path().join("results.csv");
  let algorithms = [
    ("Graph Tsetlin Machine", 95.0),
    ("Tsetlin Machine", 92.0),
    ("Standard Binary Classifier", 88.0),
  ];

  for ratio in [0.005, 0.05, 0.2] {
    for (algorithm, base) in algorithms {
      for run in 0..2 {
        let row = ResultRow {
          exp_id: Some("main".to_string()),
          total_time: Some(10.0 + run as f64),
          epochs: Some(10.0),
          platform: Some("CPU".to_string()),
          ..ResultRow::new(algorithm, ratio, base - ratio * 100.0 + run as f64)
        };
        append_result(&path, &row).expect("Failed to append result");
      }
    }
  }

  let pilot = ResultRow {
    exp_id: Some("pilot".to_string()),
    ..ResultRow::new("Tsetlin Machine", 0.3, 61.0)
  };
  append_result(&path, &pilot).expect("Failed to append result");

  path
}
