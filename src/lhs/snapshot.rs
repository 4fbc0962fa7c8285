//! Persisted LHS tables.
//!
//! A snapshot is a MessagePack document `{ format_version, key_digits,
//! entries }` with entries sorted by key, so identical tables produce
//! identical bytes. Writes go through a temp file in the target directory
//! and are renamed into place, so a concurrent reader never sees a partial
//! file.

use std::io::Write;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{LhsTable, MAX_KEY_DIGITS, TableParams};
use crate::error::SearchError;
use crate::numeric::MobiusTransform;

/// Bumped whenever the on-disk layout changes.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct SnapshotFile {
    format_version: u32,
    key_digits: u32,
    entries: Vec<(i64, MobiusTransform)>,
}

impl LhsTable {
    /// Encode the table as snapshot bytes.
    pub fn to_snapshot_bytes(&self) -> Result<Vec<u8>, rmp_serde::encode::Error> {
        let mut entries: Vec<(i64, MobiusTransform)> = self.iter().map(|(k, t)| (k, *t)).collect();
        entries.sort_unstable_by_key(|(k, _)| *k);
        rmp_serde::to_vec(&SnapshotFile {
            format_version: SNAPSHOT_FORMAT_VERSION,
            key_digits: self.key_digits(),
            entries,
        })
    }

    /// Decode snapshot bytes. The error string describes what is wrong.
    pub fn from_snapshot_bytes(bytes: &[u8]) -> Result<Self, String> {
        let file: SnapshotFile =
            rmp_serde::from_slice(bytes).map_err(|e| format!("undecodable snapshot: {e}"))?;
        if file.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(format!(
                "unsupported snapshot format version {} (expected {})",
                file.format_version, SNAPSHOT_FORMAT_VERSION
            ));
        }
        if file.key_digits > MAX_KEY_DIGITS {
            return Err(format!(
                "key digits {} exceed the maximum of {MAX_KEY_DIGITS}",
                file.key_digits
            ));
        }
        let mut entries = FxHashMap::default();
        entries.reserve(file.entries.len());
        for (key, transform) in file.entries {
            if entries.insert(key, transform).is_some() {
                return Err(format!("duplicate key {key}"));
            }
        }
        Ok(Self::from_entries(file.key_digits, entries))
    }

    /// Write the table to `path` atomically, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), SearchError> {
        let write_err = |reason: String| SearchError::SnapshotWrite {
            path: path.to_path_buf(),
            reason,
        };
        let bytes = self.to_snapshot_bytes().map_err(|e| write_err(e.to_string()))?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| write_err(e.to_string()))?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| write_err(e.to_string()))?;
        tmp.write_all(&bytes).map_err(|e| write_err(e.to_string()))?;
        tmp.persist(path).map_err(|e| write_err(e.error.to_string()))?;

        info!(path = %path.display(), entries = self.len(), bytes = bytes.len(), "saved LHS table snapshot");
        Ok(())
    }

    /// Load a snapshot. Its threshold and key set are trusted as-is.
    pub fn load(path: &Path) -> Result<Self, SearchError> {
        let bytes = std::fs::read(path).map_err(|source| SearchError::SnapshotUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_snapshot_bytes(&bytes).map_err(|reason| SearchError::SnapshotCorrupt {
            path: path.to_path_buf(),
            reason,
        })?;
        info!(path = %path.display(), entries = table.len(), "loaded LHS table snapshot");
        Ok(table)
    }

    /// Reuse the snapshot at `path` verbatim when it exists; otherwise build
    /// the table from `params` and persist it there for later runs.
    pub fn build_or_load(path: &Path, params: &TableParams) -> Result<Self, SearchError> {
        if path.exists() {
            debug!(path = %path.display(), "reusing existing LHS table snapshot");
            return Self::load(path);
        }
        let table = Self::from_params(params)?;
        table.save(path)?;
        Ok(table)
    }
}
