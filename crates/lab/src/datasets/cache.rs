//! Dataset downloading and cache management.

use super::registry::{DatasetRegistry, DatasetSpec, TargetDataset};
use crate::{LabError, Result};
use flate2::read::GzDecoder;
use futures::{Stream, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tar::Archive;
use tracing::{debug, info, warn};

/// How a downloaded source is packed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
  Plain,
  Gzip,
  TarGz,
}

impl Compression {
  /// Guess from the URL path suffix.
  pub fn from_url(url: &str) -> Self {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_lowercase();
    if path.ends_with(".tar.gz") || path.ends_with(".tgz") {
      Compression::TarGz
    } else if path.ends_with(".gz") {
      Compression::Gzip
    } else {
      Compression::Plain
    }
  }
}

/// Cache manager for base datasets.
pub struct DatasetCache {
  cache_dir: PathBuf,
}

impl DatasetCache {
  /// Create a new cache manager.
  pub fn new(cache_dir: PathBuf) -> Self {
    Self { cache_dir }
  }

  pub fn cache_dir(&self) -> &Path {
    &self.cache_dir
  }

  fn dataset_dir(&self, dataset: TargetDataset) -> PathBuf {
    self.cache_dir.join(dataset.name())
  }

  /// Get the path where a dataset's CSV would be cached.
  pub fn dataset_path(&self, dataset: TargetDataset) -> PathBuf {
    let spec = DatasetRegistry::get(dataset);
    self.dataset_dir(dataset).join(spec.file_name)
  }

  /// Check if a dataset is already cached.
  pub fn is_cached(&self, dataset: TargetDataset) -> bool {
    self.dataset_path(dataset).is_file()
  }

  /// Ensure a dataset is available (download if needed or forced).
  pub async fn ensure(&self, dataset: TargetDataset, url: Option<&str>, force: bool) -> Result<PathBuf> {
    let path = self.dataset_path(dataset);
    if self.is_cached(dataset) && !force {
      info!("Using cached dataset: {}", path.display());
      return Ok(path);
    }

    let spec = DatasetRegistry::get(dataset);
    let url = match url.map(str::to_string).or_else(|| spec.default_url.clone()) {
      Some(url) => url,
      None => {
        return Err(LabError::Download(format!(
          "no download URL for {}; fetch {} from {} and pass --input, or set [dataset].url",
          dataset,
          spec.file_name,
          spec.kaggle_url()
        )));
      }
    };

    info!("Downloading dataset: {}", dataset);
    self.download_dataset(&spec, &url, &path).await?;
    Ok(path)
  }

  async fn download_dataset(&self, spec: &DatasetSpec, url: &str, dest: &Path) -> Result<()> {
    let dir = self.dataset_dir(spec.dataset);
    fs::create_dir_all(&dir)?;

    let download_path = dir.join(format!("{}.download", spec.file_name));
    let staged = dir.join(format!("{}.staged", spec.file_name));

    let result = match download_file(url, &download_path).await {
      Ok(()) => install(Compression::from_url(url), &download_path, &staged, &spec.file_name, dest),
      Err(e) => Err(e),
    };
    discard(&download_path);
    discard(&staged);
    result?;

    info!("Dataset cached at: {}", dest.display());
    Ok(())
  }

  /// Remove one cached dataset. Returns whether anything was on disk.
  pub fn remove(&self, dataset: TargetDataset) -> Result<bool> {
    let dir = self.dataset_dir(dataset);
    if !dir.exists() {
      return Ok(false);
    }
    fs::remove_dir_all(&dir)?;
    info!("Removed cached {} ({})", dataset, dir.display());
    Ok(true)
  }

  /// Remove every registered dataset and return how many were removed.
  ///
  /// The cache directory itself goes only once nothing else is left in it.
  pub fn clean_all(&self) -> Result<usize> {
    let mut removed = 0;
    for dataset in TargetDataset::all() {
      if self.remove(*dataset)? {
        removed += 1;
      }
    }

    if let Ok(mut entries) = fs::read_dir(&self.cache_dir) {
      if entries.next().is_none() {
        fs::remove_dir(&self.cache_dir)?;
      } else {
        debug!("Keeping {}: holds files not managed by the cache", self.cache_dir.display());
      }
    }
    Ok(removed)
  }

  /// Cached datasets with their on-disk size.
  pub fn list_cached(&self) -> Vec<CachedDataset> {
    TargetDataset::all()
      .iter()
      .filter_map(|&dataset| {
        let path = self.dataset_path(dataset);
        let meta = fs::metadata(&path).ok().filter(|m| m.is_file())?;
        Some(CachedDataset {
          dataset,
          path,
          bytes: meta.len(),
        })
      })
      .collect()
  }
}

/// A dataset present in the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedDataset {
  pub dataset: TargetDataset,
  pub path: PathBuf,
  pub bytes: u64,
}

/// Unpack a finished download into `staged`, then move it over `dest`.
///
/// `dest` is untouched unless every step succeeds.
fn install(compression: Compression, download: &Path, staged: &Path, file_name: &str, dest: &Path) -> Result<()> {
  match compression {
    Compression::Plain => fs::rename(download, staged)?,
    Compression::Gzip => decompress_gzip(download, staged)?,
    Compression::TarGz => extract_csv(download, file_name, staged)?,
  }
  fs::rename(staged, dest)?;
  Ok(())
}

/// Best-effort removal of a scratch file.
fn discard(path: &Path) {
  match fs::remove_file(path) {
    Ok(()) => debug!("Removed {}", path.display()),
    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
    Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
  }
}

/// Fetch `url` into `dest`, failing on a non-2xx status or a short body.
async fn download_file(url: &str, dest: &Path) -> Result<()> {
  info!("Downloading from: {}", url);

  let response = reqwest::get(url).await?;
  let status = response.status();
  if !status.is_success() {
    return Err(LabError::Download(format!("{} answered HTTP {}", url, status)));
  }

  let expected = response.content_length();
  let pb = match expected {
    Some(len) => {
      let pb = ProgressBar::new(len);
      if let Ok(style) = ProgressStyle::with_template("{bar:40.cyan/blue} {bytes}/{total_bytes} {bytes_per_sec} ({eta})") {
        pb.set_style(style);
      }
      pb
    }
    None => ProgressBar::new_spinner(),
  };

  let written = write_stream(response.bytes_stream(), File::create(dest)?, &pb).await;
  pb.finish_and_clear();
  let written = written?;

  if let Some(len) = expected
    && written != len
  {
    return Err(LabError::Download(format!(
      "{} ended after {} of {} bytes",
      url, written, len
    )));
  }
  debug!("Downloaded {} bytes to {}", written, dest.display());
  Ok(())
}

/// Copy a chunk stream into `writer` and flush it. Returns the byte count.
async fn write_stream<S, B, E, W>(stream: S, writer: W, pb: &ProgressBar) -> Result<u64>
where
  S: Stream<Item = std::result::Result<B, E>>,
  B: AsRef<[u8]>,
  LabError: From<E>,
  W: Write,
{
  let mut stream = std::pin::pin!(stream);
  let mut writer = BufWriter::new(writer);
  let mut written: u64 = 0;

  while let Some(chunk) = stream.next().await {
    let chunk = chunk?;
    writer.write_all(chunk.as_ref())?;
    written += chunk.as_ref().len() as u64;
    pb.set_position(written);
  }
  writer.flush()?;
  Ok(written)
}

/// Decompress a single gzip file.
fn decompress_gzip(source: &Path, dest: &Path) -> Result<()> {
  debug!("Decompressing {} to {}", source.display(), dest.display());
  let mut decoder = GzDecoder::new(File::open(source)?);
  let mut writer = BufWriter::new(File::create(dest)?);
  io::copy(&mut decoder, &mut writer)?;
  writer.flush()?;
  Ok(())
}

/// Pull the ratings CSV out of a gzipped tarball.
///
/// An entry named `file_name` wins; otherwise the first `.csv` entry is used.
fn extract_csv(tarball: &Path, file_name: &str, dest: &Path) -> Result<()> {
  info!("Extracting {} from {}", file_name, tarball.display());

  let candidate = dest.with_extension("candidate");
  let mut have_candidate = false;

  let mut archive = Archive::new(GzDecoder::new(File::open(tarball)?));
  for entry in archive.entries()? {
    let mut entry = entry?;
    let entry_path = entry.path()?.into_owned();
    let Some(name) = entry_path.file_name().and_then(|n| n.to_str()) else {
      continue;
    };

    if name == file_name {
      entry.unpack(dest)?;
      if have_candidate {
        let _ = fs::remove_file(&candidate);
      }
      return Ok(());
    }
    if !have_candidate && name.to_lowercase().ends_with(".csv") {
      entry.unpack(&candidate)?;
      have_candidate = true;
      debug!("Keeping {} as fallback", entry_path.display());
    }
  }

  if have_candidate {
    warn!("{} not found in archive, using first CSV entry", file_name);
    fs::rename(&candidate, dest)?;
    return Ok(());
  }

  Err(LabError::Download(format!(
    "archive {} contains no CSV file",
    tarball.display()
  )))
}
