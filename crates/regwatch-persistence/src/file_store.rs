//! File-backed version store with crash-safe writes.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use regwatch_models::PageVersion;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::store::{check_capture_order, evict_to_cap, lock_unpoisoned, VersionStore};

/// File-backed version store.
///
/// Each URL's history is one JSON array file:
/// ```text
/// base_path/
/// └── versions/
///     ├── 9f86d081884c7d65.....json   (sha256 of the url)
///     └── 60303ae22b998861.....json
/// ```
///
/// Writes go to a temp file in the same directory and are renamed into
/// place, so a crash mid-save never leaves a partial history visible.
pub struct FileVersionStore {
    base_path: PathBuf,
    max_versions: usize,
    /// Serializes read-modify-write cycles against the history files.
    /// The detection service already serializes per URL; this guard covers
    /// callers that write to the store directly from multiple threads.
    write_guard: Mutex<()>,
}

impl FileVersionStore {
    /// Creates a store rooted at `base_path` with the given retention cap.
    ///
    /// Directories are created lazily on first save.
    pub fn new(base_path: impl Into<PathBuf>, max_versions: usize) -> Self {
        Self {
            base_path: base_path.into(),
            max_versions,
            write_guard: Mutex::new(()),
        }
    }

    fn versions_dir(&self) -> PathBuf {
        self.base_path.join("versions")
    }

    /// Path of the history file for a URL. URLs are keyed by exact string
    /// match; the file name is the SHA-256 of the url, which is filesystem
    /// safe regardless of the url's characters.
    fn history_path(&self, url: &str) -> PathBuf {
        let digest = Sha256::digest(url.as_bytes());
        self.versions_dir().join(format!("{:x}.json", digest))
    }

    fn read_history(&self, url: &str) -> Result<Vec<PageVersion>> {
        let path = self.history_path(url);
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            // Only a genuinely missing file is an empty history; a
            // permission error must not masquerade as a first capture.
            Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::ReadError { path, source }),
        };
        let history = serde_json::from_str(&data)?;
        Ok(history)
    }

    /// Writes the history file atomically: temp file in the same directory,
    /// flushed, then renamed over the target.
    fn write_history(&self, url: &str, history: &[PageVersion]) -> Result<()> {
        let path = self.history_path(url);
        let dir = self.versions_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|source| StoreError::DirectoryError {
                path: dir.clone(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(history)?;
        let mut temp_file =
            tempfile::NamedTempFile::new_in(&dir).map_err(|source| StoreError::WriteError {
                path: path.clone(),
                source,
            })?;
        temp_file
            .write_all(json.as_bytes())
            .and_then(|_| temp_file.flush())
            .map_err(|source| StoreError::WriteError {
                path: path.clone(),
                source,
            })?;
        temp_file.persist(&path).map_err(|e| StoreError::WriteError {
            path,
            source: e.error,
        })?;

        Ok(())
    }
}

impl VersionStore for FileVersionStore {
    fn latest_version(&self, url: &str) -> Result<Option<PageVersion>> {
        let history = self.read_history(url)?;
        Ok(history.into_iter().last())
    }

    fn save_version(&self, version: PageVersion) -> Result<()> {
        let _guard = lock_unpoisoned(&self.write_guard);

        let mut history = self.read_history(&version.url)?;
        check_capture_order(&history, &version)?;

        let url = version.url.clone();
        history.push(version);
        let evicted = evict_to_cap(&mut history, self.max_versions);
        self.write_history(&url, &history)?;

        if evicted > 0 {
            debug!(url = %url, evicted, "evicted versions past retention cap");
        }
        info!(url = %url, versions = history.len(), "saved page version");
        Ok(())
    }

    fn version_history(&self, url: &str, max_versions: usize) -> Result<Vec<PageVersion>> {
        let history = self.read_history(url)?;
        Ok(history.into_iter().rev().take(max_versions).collect())
    }
}

/// Returns the history file path a store rooted at `base_path` would use
/// for `url`. Exposed for operational tooling (inspection, migration).
pub fn history_file_for(base_path: &Path, url: &str) -> PathBuf {
    FileVersionStore::new(base_path, 1).history_path(url)
}
