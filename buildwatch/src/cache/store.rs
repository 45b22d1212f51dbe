//! Disk persistence for the metadata and owner caches.
//!
//! Two snapshot files live in the configured cache directory:
//! `metadata.cache` (job identity to status) and `owners.cache` (job
//! identity to owner). The job-list cache is deliberately not persisted:
//! its entries go stale within seconds.
//!
//! Persistence is best-effort in both directions. A missing, unreadable, or
//! undeserializable file loads as an empty map; a failed write is logged and
//! dropped. Writes go to a temporary file first and are renamed over the
//! target so a crash mid-write cannot corrupt an existing snapshot.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::Cache;

/// File name of the persisted job metadata snapshot.
pub const METADATA_CACHE_FILE: &str = "metadata.cache";

/// File name of the persisted job owner snapshot.
pub const OWNER_CACHE_FILE: &str = "owners.cache";

/// Errors raised while reading or writing cache snapshots.
///
/// These never escape the store's public API: `load` and `save` degrade and
/// log instead. The type exists so the file helpers can use `?` internally
/// and so tests can exercise them directly.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Loads and saves cache snapshots under one directory.
#[derive(Debug)]
pub struct CacheStore {
    metadata_path: PathBuf,
    owner_path: PathBuf,
}

impl CacheStore {
    /// Create a store rooted at `cache_dir`, creating the directory if
    /// missing. Creation failure is logged and tolerated; later saves will
    /// fail and be logged too.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        let cache_dir = cache_dir.into();
        if !cache_dir.exists() {
            if let Err(error) = fs::create_dir_all(&cache_dir) {
                warn!(
                    dir = %cache_dir.display(),
                    error = %error,
                    "Failed to create cache directory"
                );
            }
        }

        Self {
            metadata_path: cache_dir.join(METADATA_CACHE_FILE),
            owner_path: cache_dir.join(OWNER_CACHE_FILE),
        }
    }

    /// Populate the in-memory caches from disk.
    ///
    /// Each mapping degrades independently: a corrupt metadata file does not
    /// prevent the owner file from loading.
    pub fn load(&self, cache: &Cache) {
        match read_snapshot(&self.metadata_path) {
            Ok(Some(entries)) => {
                info!(entries = entries.len(), "Loaded job metadata cache");
                cache.metadata().restore(entries);
            }
            Ok(None) => debug!(path = %self.metadata_path.display(), "No metadata cache file"),
            Err(error) => warn!(
                path = %self.metadata_path.display(),
                error = %error,
                "Ignoring unreadable metadata cache file"
            ),
        }

        match read_snapshot(&self.owner_path) {
            Ok(Some(entries)) => {
                info!(entries = entries.len(), "Loaded job owner cache");
                cache.owners().restore(entries);
            }
            Ok(None) => debug!(path = %self.owner_path.display(), "No owner cache file"),
            Err(error) => warn!(
                path = %self.owner_path.display(),
                error = %error,
                "Ignoring unreadable owner cache file"
            ),
        }
    }

    /// Flush the in-memory caches to disk, overwriting both files.
    ///
    /// I/O failures are logged and dropped.
    pub fn save(&self, cache: &Cache) {
        debug!("Flushing job metadata cache to disk");
        if let Err(error) = write_snapshot(&self.metadata_path, &cache.metadata().snapshot()) {
            warn!(
                path = %self.metadata_path.display(),
                error = %error,
                "Failed to write metadata cache file"
            );
        }

        debug!("Flushing job owner cache to disk");
        if let Err(error) = write_snapshot(&self.owner_path, &cache.owners().snapshot()) {
            warn!(
                path = %self.owner_path.display(),
                error = %error,
                "Failed to write owner cache file"
            );
        }
    }
}

/// Read a snapshot file. `Ok(None)` means the file does not exist.
fn read_snapshot<T: DeserializeOwned>(path: &Path) -> Result<Option<Vec<T>>, PersistenceError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&contents)?))
}

/// Write a snapshot via a temporary file and atomic rename.
fn write_snapshot<T: Serialize>(path: &Path, entries: &[T]) -> Result<(), PersistenceError> {
    let contents = serde_json::to_string(entries)?;
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, contents)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
