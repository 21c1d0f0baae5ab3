//! Label-noise robustness lab for product-rating datasets
//!
//! This crate prepares noisy copies of a ratings dataset and summarizes the
//! accuracy of classifiers trained on them.
//!
//! ## Key Concepts
//!
//! - **Augmenter**: expands raw ratings into a long-form table and corrupts a
//!   fraction (the noise ratio) of its labels
//! - **Results**: experiment rows appended by training runs, grouped by
//!   algorithm and noise ratio
//! - **Reports**: LaTeX (paper-ready), Markdown and JSON renderings of the
//!   accuracy pivot
//! - **Datasets**: download and cache management for the base dataset

pub mod augment;
pub mod csv_io;
pub mod datasets;
pub mod reports;
pub mod results;
pub mod synthetic;

pub use augment::{AugmentReport, AugmentedDataset, ExpandedRecord, NoiseSummary, RawRecord, augment, run_augment};
pub use datasets::{DatasetCache, DatasetRegistry, TargetDataset};
pub use reports::{JsonReport, LatexTable, MarkdownReport, ReportFormat};
pub use results::{GroupMean, PivotTable, ResultRow};
pub use synthetic::{XorSample, noisy_xor};

use thiserror::Error;

/// Lab-specific errors
#[derive(Debug, Error)]
pub enum LabError {
  #[error("Download error: {0}")]
  Download(String),

  #[error("Unknown dataset: {0}")]
  UnknownDataset(String),

  #[error("Noise ratio must be a finite value in (0, 1), got {0}")]
  InvalidNoiseRatio(f64),

  #[error("Invalid configuration: {0}")]
  InvalidConfig(String),

  #[error("Algorithm column missing from results: {0}")]
  MissingAlgorithm(String),

  #[error("No result rows to aggregate{0}")]
  EmptyResults(String),

  #[error(transparent)]
  Config(#[from] noiselab_core::ConfigError),

  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  #[error("CSV error: {0}")]
  Csv(#[from] csv::Error),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("HTTP error: {0}")]
  Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, LabError>;
