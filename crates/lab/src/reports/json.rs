//! JSON report format for aggregated results.

use crate::Result;
use crate::results::{GroupMean, PivotTable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Aggregated results in JSON format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport {
  /// Report metadata
  pub metadata: ReportMetadata,
  /// Per (algorithm, noise ratio) means
  pub groups: Vec<GroupMean>,
  /// Noise ratio x algorithm accuracy matrix
  pub pivot: PivotTable,
}

/// Report metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
  /// Report generation timestamp
  pub timestamp: DateTime<Utc>,
  /// noiselab version
  pub version: String,
  /// Hostname
  #[serde(skip_serializing_if = "Option::is_none")]
  pub hostname: Option<String>,
  /// Experiment filter applied, if any
  #[serde(skip_serializing_if = "Option::is_none")]
  pub exp_id: Option<String>,
  /// Result rows that went into the means
  pub total_runs: usize,
}

impl JsonReport {
  /// Create a report from grouped results.
  pub fn from_groups(groups: &[GroupMean], pivot: &PivotTable, exp_id: Option<&str>) -> Self {
    Self {
      metadata: ReportMetadata {
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        hostname: hostname::get().ok().and_then(|h| h.into_string().ok()),
        exp_id: exp_id.map(str::to_string),
        total_runs: groups.iter().map(|g| g.runs).sum(),
      },
      groups: groups.to_vec(),
      pivot: pivot.clone(),
    }
  }

  /// Serialize to pretty JSON.
  pub fn to_json(&self) -> Result<String> {
    Ok(serde_json::to_string_pretty(self)?)
  }

  /// Save the report to a file.
  pub fn save(&self, path: &Path) -> Result<()> {
    std::fs::write(path, self.to_json()?)?;
    Ok(())
  }

  /// Load a report from a file.
  pub fn load(path: &Path) -> Result<Self> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::results::pivot;
  use tempfile::TempDir;

  fn groups() -> Vec<GroupMean> {
    vec![
      GroupMean {
        algorithm: "TM".to_string(),
        noise_ratio: 0.01,
        mean_accuracy: 95.0,
        mean_total_time: Some(3.0),
        runs: 4,
      },
      GroupMean {
        algorithm: "TM".to_string(),
        noise_ratio: 0.2,
        mean_accuracy: 72.0,
        mean_total_time: None,
        runs: 1,
      },
    ]
  }

  #[test]
  fn test_from_groups() {
    let groups = groups();
    let report = JsonReport::from_groups(&groups, &pivot(&groups), Some("a"));
    assert_eq!(report.metadata.total_runs, 5);
    assert_eq!(report.metadata.exp_id.as_deref(), Some("a"));
    assert_eq!(report.pivot.noise_ratios, vec![0.01, 0.2]);
  }

  #[test]
  fn test_save_and_load() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("report.json");
    let groups = groups();

    let report = JsonReport::from_groups(&groups, &pivot(&groups), None);
    report.save(&path).unwrap();

    let loaded = JsonReport::load(&path).unwrap();
    assert_eq!(loaded.groups, report.groups);
    assert_eq!(loaded.pivot, report.pivot);
    assert!(loaded.metadata.exp_id.is_none());
  }
}
