//! NDJSON export of an aggregated coproduct: one line per merged term.
//!
//! An export is well formed when every line carries the same mode, keys
//! are strictly increasing (the order `Delta` iterates in), and every tree
//! in a line parses back. Writing enforces the first two and returns the
//! SHA-256 of the exact bytes; reading enforces all three.

use crate::record::DeltaRecord;
use cotree_kernel::DeltaMode;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Errors from NDJSON export and import.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{target}: {source}")]
    Io {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },

    #[error("line {line}: key `{key}` does not sort after `{previous}`")]
    OutOfOrder {
        line: usize,
        key: String,
        previous: String,
    },

    #[error("line {line}: mode {found} differs from {expected}")]
    MixedModes {
        line: usize,
        expected: DeltaMode,
        found: DeltaMode,
    },

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Running check of mode agreement and key order.
#[derive(Default)]
struct Shape {
    mode: Option<DeltaMode>,
    last_key: Option<String>,
}

impl Shape {
    fn admit(&mut self, line: usize, record: &DeltaRecord) -> Result<(), StoreError> {
        let expected = *self.mode.get_or_insert(record.mode);
        if expected != record.mode {
            return Err(StoreError::MixedModes {
                line,
                expected,
                found: record.mode,
            });
        }
        if let Some(previous) = &self.last_key
            && record.key.as_str() <= previous.as_str()
        {
            return Err(StoreError::OutOfOrder {
                line,
                key: record.key.clone(),
                previous: previous.clone(),
            });
        }
        self.last_key = Some(record.key.clone());
        Ok(())
    }
}

fn io_at(target: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        target: target.display().to_string(),
        source,
    }
}

/// Write `records` as NDJSON and return the hex SHA-256 of the bytes written.
pub fn write_records(
    writer: &mut impl Write,
    records: &[DeltaRecord],
) -> Result<String, StoreError> {
    let mut shape = Shape::default();
    let mut hasher = Sha256::new();
    for (i, record) in records.iter().enumerate() {
        shape.admit(i + 1, record)?;
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        hasher.update(&line);
        writer.write_all(&line).map_err(|source| StoreError::Io {
            target: format!("record {}", i + 1),
            source,
        })?;
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Digest `write_records` would return, without writing anything.
pub fn records_digest(records: &[DeltaRecord]) -> Result<String, StoreError> {
    write_records(&mut std::io::sink(), records)
}

/// Load an export, rejecting anything `write_records` could not have produced.
/// Blank lines are ignored.
pub fn read_records(reader: impl BufRead) -> Result<Vec<DeltaRecord>, StoreError> {
    let mut shape = Shape::default();
    let mut records = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line.map_err(|source| StoreError::Io {
            target: format!("line {line_no}"),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let malformed = |message: String| StoreError::Malformed {
            line: line_no,
            message,
        };
        let record: DeltaRecord =
            serde_json::from_str(&line).map_err(|e| malformed(e.to_string()))?;
        record.trees().map_err(|e| malformed(e.to_string()))?;
        shape.admit(line_no, &record)?;
        records.push(record);
    }
    Ok(records)
}

pub fn read_records_from_path(path: impl AsRef<Path>) -> Result<Vec<DeltaRecord>, StoreError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(io_at(path))?;
    read_records(BufReader::new(file))
}

/// Write an export to `path`. The bytes land in a hidden sibling first and
/// are renamed over `path` only once synced, so readers never observe a
/// partial file.
pub fn write_records_to_path(
    path: impl AsRef<Path>,
    records: &[DeltaRecord],
) -> Result<String, StoreError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(io_at(parent))?;
    }

    let staging = staging_path(path);
    let result = stage(&staging, records)
        .and_then(|digest| fs::rename(&staging, path).map(|()| digest).map_err(io_at(path)));
    if result.is_err() {
        let _ = fs::remove_file(&staging);
    }
    let digest = result?;

    debug!(path = %path.display(), records = records.len(), %digest, "wrote coproduct");
    Ok(digest)
}

fn stage(staging: &Path, records: &[DeltaRecord]) -> Result<String, StoreError> {
    let mut writer = BufWriter::new(File::create(staging).map_err(io_at(staging))?);
    let digest = write_records(&mut writer, records)?;
    let file = writer
        .into_inner()
        .map_err(|e| io_at(staging)(e.into_error()))?;
    file.sync_all().map_err(io_at(staging))?;
    Ok(digest)
}

static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "delta".into(), |n| n.to_string_lossy().into_owned());
    let seq = STAGING_SEQ.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{name}.{}.{seq}.partial", std::process::id()))
}
