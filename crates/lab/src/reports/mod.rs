//! Renderings of the accuracy pivot.
//!
//! - LaTeX: fixed table template for the paper, deterministic
//! - Markdown: human-readable summary with per-group details
//! - JSON: machine-readable groups and pivot with run metadata

mod json;
mod latex;
mod markdown;

use std::fmt;
use std::str::FromStr;

pub use json::{JsonReport, ReportMetadata};
pub use latex::{LatexTable, escape_latex};
pub use markdown::MarkdownReport;

/// Output format of the `aggregate` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
  #[default]
  Latex,
  Markdown,
  Json,
}

impl FromStr for ReportFormat {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "latex" | "tex" => Ok(Self::Latex),
      "markdown" | "md" => Ok(Self::Markdown),
      "json" => Ok(Self::Json),
      _ => Err(format!("Unknown report format: {}. Use latex, markdown or json", s)),
    }
  }
}

impl fmt::Display for ReportFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Latex => write!(f, "latex"),
      Self::Markdown => write!(f, "markdown"),
      Self::Json => write!(f, "json"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_format_parse() {
    assert_eq!("latex".parse::<ReportFormat>(), Ok(ReportFormat::Latex));
    assert_eq!("MD".parse::<ReportFormat>(), Ok(ReportFormat::Markdown));
    assert_eq!("json".parse::<ReportFormat>(), Ok(ReportFormat::Json));
    assert!("html".parse::<ReportFormat>().is_err());
    assert_eq!(ReportFormat::Markdown.to_string(), "markdown");
  }
}
