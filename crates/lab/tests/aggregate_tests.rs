//! Aggregation integration tests
//!
//! Tests: deterministic LaTeX, one row per noise ratio, experiment filtering,
//! missing algorithm columns.

mod common;

use lab::LabError;
use lab::reports::{JsonReport, LatexTable, MarkdownReport};
use lab::results::{filter_experiment, group_means, load_results, pivot};
use noiselab_core::ReportConfig;
use std::path::Path;
use tempfile::TempDir;

fn render(path: &Path, exp_id: Option<&str>, config: &ReportConfig) -> lab::Result<String> {
  let rows = filter_experiment(load_results(path)?, exp_id);
  let table = pivot(&group_means(&rows));
  Ok(LatexTable::render(&table, config)?.content().to_string())
}

fn body_rows(latex: &str) -> Vec<&str> {
  latex
    .lines()
    .filter(|l| l.ends_with("\\\\") && !l.starts_with("\\textbf"))
    .collect()
}

#[test]
fn test_latex_is_deterministic() {
  let temp = TempDir::new().unwrap();
  let path = common::write_results(&temp);
  let config = ReportConfig::default();

  let first = render(&path, Some("main"), &config).unwrap();
  let second = render(&path, Some("main"), &config).unwrap();
  assert_eq!(first, second);
}

#[test]
fn test_one_row_per_noise_ratio() {
  let temp = TempDir::new().unwrap();
  let path = common::write_results(&temp);

  let latex = render(&path, Some("main"), &ReportConfig::default()).unwrap();
  let rows = body_rows(&latex);
  assert_eq!(rows.len(), 3);
  assert!(rows[0].starts_with("0.005 & "));
  assert!(rows[1].starts_with("0.05 & "));
  assert!(rows[2].starts_with("0.2 & "));

  // Two runs averaged: 95 - 0.5 + {0, 1} -> 95.00
  assert!(rows[0].contains("95.00"));
  assert!(latex.contains("\\textbf{Graph Tsetlin Machine} & \\textbf{Tsetlin Machine}"));
}

#[test]
fn test_unfiltered_includes_every_ratio() {
  let temp = TempDir::new().unwrap();
  let path = common::write_results(&temp);
  let config = ReportConfig {
    algorithms: vec!["Tsetlin Machine".to_string(), "Graph Tsetlin Machine".to_string()],
    ..Default::default()
  };

  let latex = render(&path, None, &config).unwrap();
  let rows = body_rows(&latex);
  assert_eq!(rows.len(), 4);
  assert_eq!(rows[3], "0.3 & 61.00 & -- \\\\");
}

#[test]
fn test_missing_algorithm_column() {
  let temp = TempDir::new().unwrap();
  let path = common::write_results(&temp);

  // Only Tsetlin Machine ran in the pilot
  let result = render(&path, Some("pilot"), &ReportConfig::default());
  assert!(matches!(result, Err(LabError::MissingAlgorithm(name)) if name == "Graph Tsetlin Machine"));
}

#[test]
fn test_unknown_experiment_is_empty() {
  let temp = TempDir::new().unwrap();
  let path = common::write_results(&temp);

  let result = render(&path, Some("nope"), &ReportConfig::default());
  assert!(matches!(result, Err(LabError::EmptyResults(_))));
}

#[test]
fn test_markdown_and_json_share_the_pivot() {
  let temp = TempDir::new().unwrap();
  let path = common::write_results(&temp);

  let rows = filter_experiment(load_results(&path).unwrap(), Some("main"));
  let groups = group_means(&rows);
  let table = pivot(&groups);

  let markdown = MarkdownReport::from_groups(&groups, &table, Some("main"), 2);
  assert!(markdown.content().contains("**Runs:** 18"));

  let json_path = temp.path().join("report.json");
  JsonReport::from_groups(&groups, &table, Some("main")).save(&json_path).unwrap();
  let loaded = JsonReport::load(&json_path).unwrap();
  assert_eq!(loaded.pivot, table);
  assert_eq!(loaded.metadata.total_runs, 18);
}
