//! CSV reading and append-if-exists writing shared by the augmenter and the results log.

use crate::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, File, OpenOptions};
use std::io::BufWriter;
use std::path::Path;
use tracing::debug;

/// Read every row of a headed CSV file.
pub fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
  let mut reader = csv::Reader::from_path(path)?;
  let mut rows = Vec::new();
  for row in reader.deserialize() {
    rows.push(row?);
  }
  debug!("Read {} rows from {}", rows.len(), path.display());
  Ok(rows)
}

/// Append rows to a CSV file, writing the header only when the file is new or empty.
///
/// Returns `true` when rows were appended to existing content.
pub fn append_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<bool> {
  let existed = path.exists() && fs::metadata(path)?.len() > 0;
  ensure_parent(path)?;

  let file = OpenOptions::new().create(true).append(true).open(path)?;
  let mut writer = csv::WriterBuilder::new()
    .has_headers(!existed)
    .from_writer(BufWriter::new(file));
  for row in rows {
    writer.serialize(row)?;
  }
  writer.flush()?;

  debug!(
    "{} {} rows to {}",
    if existed { "Appended" } else { "Wrote" },
    rows.len(),
    path.display()
  );
  Ok(existed)
}

/// Write rows to a fresh CSV file, replacing any previous content.
pub fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
  ensure_parent(path)?;
  let mut writer = csv::Writer::from_writer(BufWriter::new(File::create(path)?));
  for row in rows {
    writer.serialize(row)?;
  }
  writer.flush()?;
  Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    fs::create_dir_all(parent)?;
  }
  Ok(())
}
