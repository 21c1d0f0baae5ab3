//! Dataset registry with predefined configurations.

use serde::{Deserialize, Serialize};

/// Base dataset that can be augmented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetDataset {
  #[serde(rename = "amazon")]
  AmazonSales,
}

impl TargetDataset {
  /// Get all available datasets.
  pub fn all() -> &'static [TargetDataset] {
    &[TargetDataset::AmazonSales]
  }

  /// Get the dataset name.
  pub fn name(&self) -> &'static str {
    match self {
      TargetDataset::AmazonSales => "amazon",
    }
  }

  /// Parse from string.
  pub fn from_name(name: &str) -> Option<Self> {
    match name.to_lowercase().as_str() {
      "amazon" | "amazon-sales" | "amazon_sales" => Some(TargetDataset::AmazonSales),
      _ => None,
    }
  }
}

impl std::fmt::Display for TargetDataset {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.name())
  }
}

impl std::str::FromStr for TargetDataset {
  type Err = String;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    TargetDataset::from_name(s).ok_or_else(|| format!("Unknown dataset: {}", s))
  }
}

/// Configuration for a base dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSpec {
  /// Dataset identifier
  pub dataset: TargetDataset,
  /// File name of the ratings table inside the cache
  pub file_name: String,
  /// Upstream Kaggle handle (`owner/slug`)
  pub kaggle_handle: String,
  /// One-line description
  pub description: String,
  /// Direct download URL, when one is known
  pub default_url: Option<String>,
}

impl DatasetSpec {
  /// Kaggle page of the dataset.
  pub fn kaggle_url(&self) -> String {
    format!("https://www.kaggle.com/datasets/{}", self.kaggle_handle)
  }
}

/// Registry of all base datasets.
pub struct DatasetRegistry;

impl DatasetRegistry {
  /// Get configuration for a specific dataset.
  pub fn get(dataset: TargetDataset) -> DatasetSpec {
    match dataset {
      TargetDataset::AmazonSales => Self::amazon_spec(),
    }
  }

  /// Get all dataset configurations.
  pub fn all() -> Vec<DatasetSpec> {
    TargetDataset::all().iter().map(|d| Self::get(*d)).collect()
  }

  fn amazon_spec() -> DatasetSpec {
    DatasetSpec {
      dataset: TargetDataset::AmazonSales,
      file_name: "amazon.csv".to_string(),
      kaggle_handle: "karkavelrajaj/amazon-sales-dataset".to_string(),
      description: "Amazon product ratings and reviews (product_id, category, user_id, rating)".to_string(),
      // Kaggle serves zip archives behind authentication
      default_url: None,
    }
  }
}
