//! LaTeX accuracy table.

use crate::results::PivotTable;
use crate::{LabError, Result};
use noiselab_core::ReportConfig;
use std::fmt::Write as _;
use std::path::Path;

/// Placeholder for a noise ratio an algorithm was never run at.
const MISSING_CELL: &str = "--";

/// Escape characters with special meaning in LaTeX text.
pub fn escape_latex(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '\\' => out.push_str("\\textbackslash{}"),
      '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
        out.push('\\');
        out.push(c);
      }
      '~' => out.push_str("\\textasciitilde{}"),
      '^' => out.push_str("\\textasciicircum{}"),
      _ => out.push(c),
    }
  }
  out
}

/// A rendered `table` environment, one row per noise ratio and one column per
/// configured algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatexTable {
  content: String,
}

impl LatexTable {
  /// Render `pivot` with the columns named in `config.algorithms`, in that order.
  ///
  /// Fails with [`LabError::MissingAlgorithm`] when a named algorithm has no
  /// results at all.
  pub fn render(pivot: &PivotTable, config: &ReportConfig) -> Result<Self> {
    if config.algorithms.is_empty() {
      return Err(LabError::InvalidConfig("report.algorithms is empty".to_string()));
    }
    if pivot.is_empty() {
      return Err(LabError::EmptyResults(String::new()));
    }

    let mut columns = Vec::with_capacity(config.algorithms.len());
    for algorithm in &config.algorithms {
      let col = pivot
        .column(algorithm)
        .ok_or_else(|| LabError::MissingAlgorithm(algorithm.clone()))?;
      columns.push(col);
    }

    let precision = config.precision;
    let mut out = String::new();

    let _ = writeln!(out, "\\begin{{table}}[ht]");
    let _ = writeln!(out, "\\centering");
    let _ = writeln!(out, "\\caption{{{}}}", config.caption);
    let _ = writeln!(out, "\\label{{{}}}", config.label);
    let _ = writeln!(out, "\\begin{{tabular}}{{|{}}}", "c|".repeat(columns.len() + 1));
    let _ = writeln!(out, "\\hline");

    let mut header = vec!["\\textbf{Noise Ratio}".to_string()];
    header.extend(config.algorithms.iter().map(|a| format!("\\textbf{{{}}}", escape_latex(a))));
    let _ = writeln!(out, "{} \\\\", header.join(" & "));
    let _ = writeln!(out, "\\hline");

    for (row, ratio) in pivot.noise_ratios.iter().enumerate() {
      let mut cells = vec![format!("{}", ratio)];
      for &col in &columns {
        cells.push(match pivot.cells[row][col] {
          Some(accuracy) => format!("{:.*}", precision, accuracy),
          None => MISSING_CELL.to_string(),
        });
      }
      let _ = writeln!(out, "{} \\\\", cells.join(" & "));
      let _ = writeln!(out, "\\hline");
    }

    let _ = writeln!(out, "\\end{{tabular}}");
    let _ = writeln!(out, "\\end{{table}}");

    Ok(Self { content: out })
  }

  /// Save the table to a file.
  pub fn save(&self, path: &Path) -> Result<()> {
    std::fs::write(path, &self.content)?;
    Ok(())
  }

  /// Get the LaTeX source.
  pub fn content(&self) -> &str {
    &self.content
  }
}
