//! Base dataset management.
//!
//! Handles downloading, decompressing and caching the ratings dataset the
//! augmenter starts from.

mod cache;
mod registry;

use std::path::PathBuf;

pub use cache::{CachedDataset, Compression, DatasetCache};
pub use registry::{DatasetRegistry, DatasetSpec, TargetDataset};

use crate::Result;

/// Get the default cache directory for base datasets.
pub fn default_cache_dir() -> PathBuf {
  dirs::cache_dir()
    .unwrap_or_else(|| PathBuf::from(".cache"))
    .join("noiselab")
    .join("datasets")
}

/// Prepare a dataset (download if needed, return the path of its CSV).
pub async fn prepare_dataset(
  dataset: TargetDataset,
  url: Option<&str>,
  cache_dir: Option<PathBuf>,
  force: bool,
) -> Result<PathBuf> {
  let cache_dir = cache_dir.unwrap_or_else(default_cache_dir);
  let cache = DatasetCache::new(cache_dir);
  cache.ensure(dataset, url, force).await
}
