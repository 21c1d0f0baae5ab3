//! Markdown report generation.

use crate::Result;
use crate::results::{GroupMean, PivotTable};
use chrono::Utc;
use std::fmt::Write as _;
use std::path::Path;

/// Markdown report generator.
pub struct MarkdownReport {
  content: String,
}

impl MarkdownReport {
  /// Create a markdown report from grouped results.
  pub fn from_groups(groups: &[GroupMean], pivot: &PivotTable, exp_id: Option<&str>, precision: usize) -> Self {
    let mut content = String::new();

    Self::write_header(&mut content, groups, exp_id);
    Self::write_pivot_table(&mut content, pivot, precision);
    Self::write_group_details(&mut content, groups, precision);

    Self { content }
  }

  fn write_header(out: &mut String, groups: &[GroupMean], exp_id: Option<&str>) {
    let runs: usize = groups.iter().map(|g| g.runs).sum();

    let _ = writeln!(out, "# Noise Robustness Report");
    let _ = writeln!(out);
    let _ = writeln!(out, "**Generated:** {}", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(out, "**Version:** {}", env!("CARGO_PKG_VERSION"));
    if let Some(id) = exp_id {
      let _ = writeln!(out, "**Experiment:** {}", id);
    }
    let _ = writeln!(out, "**Runs:** {}", runs);
    let _ = writeln!(out);
  }

  fn write_pivot_table(out: &mut String, pivot: &PivotTable, precision: usize) {
    let _ = writeln!(out, "## Mean Accuracy (%)");
    let _ = writeln!(out);

    if pivot.is_empty() {
      let _ = writeln!(out, "_No results._");
      let _ = writeln!(out);
      return;
    }

    let _ = writeln!(out, "| Noise Ratio | {} |", pivot.algorithms.join(" | "));
    let _ = writeln!(out, "|-------------|{}", "---------|".repeat(pivot.algorithms.len()));

    for (ratio, row) in pivot.noise_ratios.iter().zip(&pivot.cells) {
      let cells: Vec<String> = row
        .iter()
        .map(|cell| match cell {
          Some(accuracy) => format!("{:.*}", precision, accuracy),
          None => "-".to_string(),
        })
        .collect();
      let _ = writeln!(out, "| {} | {} |", ratio, cells.join(" | "));
    }
    let _ = writeln!(out);
  }

  fn write_group_details(out: &mut String, groups: &[GroupMean], precision: usize) {
    if groups.is_empty() {
      return;
    }

    let _ = writeln!(out, "## Groups");
    let _ = writeln!(out);
    let _ = writeln!(out, "| Algorithm | Noise Ratio | Runs | Accuracy | Time |");
    let _ = writeln!(out, "|-----------|-------------|------|----------|------|");

    for group in groups {
      let time = group
        .mean_total_time
        .map(|t| format!("{:.2}s", t))
        .unwrap_or_else(|| "-".to_string());
      let _ = writeln!(
        out,
        "| {} | {} | {} | {:.*} | {} |",
        group.algorithm, group.noise_ratio, group.runs, precision, group.mean_accuracy, time
      );
    }
    let _ = writeln!(out);
  }

  /// Save the report to a file.
  pub fn save(&self, path: &Path) -> Result<()> {
    std::fs::write(path, &self.content)?;
    Ok(())
  }

  /// Get the markdown content.
  pub fn content(&self) -> &str {
    &self.content
  }
}
