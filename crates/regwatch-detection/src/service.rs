//! Change detection orchestration.
//!
//! [`ChangeDetectionService`] is the public entry point the scraper
//! pipeline calls once per (run, URL): it fetches the latest stored
//! version, compares it against the incoming content, decides whether to
//! persist a new version, and returns the scored result for alerting.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use regwatch_models::{content_hash, ChangeType, PageVersion, SignificantChangesResult};
use regwatch_persistence::{FileVersionStore, MemoryVersionStore, StoreError, VersionStore};
use tracing::{debug, info};

use crate::classifier::DiffClassifier;
use crate::config::ChangeDetectionConfig;
use crate::error::{DetectionError, Result};
use crate::scorer::SignificanceScorer;

/// Orchestrates diff classification, significance scoring, and version
/// persistence per URL.
///
/// Calls for the same URL are serialized through a per-URL lock so that
/// read-compare-save runs as a critical section; calls for different URLs
/// proceed independently. The service holds no background threads and
/// performs no retries; a failed save is fatal for that call.
pub struct ChangeDetectionService {
    store: Arc<dyn VersionStore>,
    classifier: DiffClassifier,
    scorer: SignificanceScorer,
    /// Per-URL critical-section locks.
    url_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ChangeDetectionService {
    /// Creates a service over an existing store.
    ///
    /// The store owns its retention cap; callers constructing their own
    /// store should build it with
    /// [`ChangeDetectionConfig::effective_retention`]. Fails fast on an
    /// invalid config.
    pub fn new(config: ChangeDetectionConfig, store: Arc<dyn VersionStore>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            classifier: DiffClassifier::new(&config),
            scorer: SignificanceScorer::new(&config),
            store,
            url_locks: Mutex::new(HashMap::new()),
        })
    }

    /// Creates a service backed by an in-memory store.
    pub fn in_memory(config: ChangeDetectionConfig) -> Result<Self> {
        let store = Arc::new(MemoryVersionStore::new(config.effective_retention()));
        Self::new(config, store)
    }

    /// Creates a service backed by a file store rooted at `base_path`.
    pub fn with_file_store(config: ChangeDetectionConfig, base_path: impl Into<PathBuf>) -> Result<Self> {
        let store = Arc::new(FileVersionStore::new(base_path, config.effective_retention()));
        Self::new(config, store)
    }

    /// Detects changes for `url` and records the new snapshot.
    ///
    /// Exactly one version is saved per invocation, except when the
    /// incoming content hashes identically to the latest stored version:
    /// that path writes nothing, so unchanged pages never grow the
    /// history. A version is persisted even for changes below the
    /// significance threshold; the next comparison must run against
    /// current state.
    pub fn detect_and_record(
        &self,
        url: &str,
        new_html: &str,
        new_text: &str,
    ) -> Result<SignificantChangesResult> {
        if new_text.trim().is_empty() && !new_html.trim().is_empty() {
            // The renderer produced a document but extraction came back
            // empty; reporting "no change" here would silently mask a
            // broken extractor.
            return Err(DetectionError::Analysis {
                url: url.to_string(),
                message: "extractor returned empty text for a non-empty document".to_string(),
            });
        }

        let lock = self.url_lock(url);
        let result = {
            let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            self.compare_and_record(url, new_text)
        };
        drop(lock);
        self.prune_url_lock(url);
        result
    }

    /// Read-compare-save for one URL. Runs under that URL's lock.
    fn compare_and_record(&self, url: &str, new_text: &str) -> Result<SignificantChangesResult> {
        let previous = match self.store.latest_version(url) {
            Ok(version) => version,
            // "Not found" means first capture, not a failure
            Err(StoreError::NotFound { .. }) => None,
            Err(err) => return Err(err.into()),
        };

        let previous = match previous {
            Some(previous) => previous,
            None => {
                let version = PageVersion::new(url, new_text);
                self.store.save_version(version)?;
                info!(url = %url, "recorded first capture");
                return Ok(SignificantChangesResult::not_significant(ChangeType::None));
            }
        };

        if previous.content_hash == content_hash(new_text) {
            debug!(url = %url, "content hash unchanged, skipping diff");
            return Ok(SignificantChangesResult::not_significant(ChangeType::None));
        }

        let analysis = self.classifier.classify(Some(&previous.text_content), new_text);
        let result = self.scorer.score(&previous.text_content, new_text, &analysis);

        let version = PageVersion::new(url, new_text).with_change(analysis.change_type);
        self.store.save_version(version)?;

        if result.has_significant_changes {
            info!(
                url = %url,
                change_type = %result.change_type,
                score = result.weighted_score,
                "significant change detected"
            );
        } else {
            debug!(url = %url, change_type = %result.change_type, "change below significance threshold");
        }

        Ok(result)
    }

    /// Returns up to `max_versions` stored versions for the URL, newest
    /// first.
    pub fn version_history(&self, url: &str, max_versions: usize) -> Result<Vec<PageVersion>> {
        Ok(self.store.version_history(url, max_versions)?)
    }

    /// The underlying version store.
    pub fn store(&self) -> &dyn VersionStore {
        self.store.as_ref()
    }

    fn url_lock(&self, url: &str) -> Arc<Mutex<()>> {
        let mut locks = self
            .url_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(url.to_string()).or_default().clone()
    }

    /// Drops the registry entry once no caller holds the lock anymore,
    /// so the map stays bounded by the number of in-flight URLs rather
    /// than every URL ever seen. Clones are only handed out under the
    /// registry lock, so a strong count of 1 means the map holds the
    /// last reference.
    fn prune_url_lock(&self, url: &str) {
        let mut locks = self
            .url_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(entry) = locks.get(url) {
            if Arc::strong_count(entry) == 1 {
                locks.remove(url);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn tracked_url_locks(&self) -> usize {
        self.url_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}
