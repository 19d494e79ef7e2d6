//! The version store seam and the in-memory implementation.

use std::collections::HashMap;
use std::sync::Mutex;

use regwatch_models::PageVersion;
use tracing::debug;

use crate::error::{Result, StoreError};

/// Durable, ordered, bounded history of page versions per URL.
///
/// Implementations own the retention cap: `save_version` appends and then
/// evicts the oldest versions until the per-URL bound holds. Saves for the
/// same URL must be atomic with respect to each other; saves for different
/// URLs are independent. Reads on a URL with no history succeed with an
/// empty result, never an error.
pub trait VersionStore: Send + Sync {
    /// Returns the most recent version for the URL, or `None` if the URL
    /// has never been captured.
    fn latest_version(&self, url: &str) -> Result<Option<PageVersion>>;

    /// Appends a version to the URL's history, evicting the oldest
    /// version(s) if the retention cap would be exceeded.
    fn save_version(&self, version: PageVersion) -> Result<()>;

    /// Returns up to `max_versions` versions for the URL, newest first.
    fn version_history(&self, url: &str, max_versions: usize) -> Result<Vec<PageVersion>>;
}

/// Rejects appends that would break the strictly-increasing capture order.
///
/// Equal timestamps are tolerated; two captures can land within clock
/// resolution.
pub(crate) fn check_capture_order(history: &[PageVersion], incoming: &PageVersion) -> Result<()> {
    if let Some(head) = history.last() {
        if incoming.captured_at < head.captured_at {
            return Err(StoreError::InvalidData(format!(
                "out-of-order capture for {}: {} precedes stored head {}",
                incoming.url, incoming.captured_at, head.captured_at
            )));
        }
    }
    Ok(())
}

/// Evicts the oldest versions until the history fits the retention cap.
/// Returns the number of versions evicted.
pub(crate) fn evict_to_cap(history: &mut Vec<PageVersion>, max_versions: usize) -> usize {
    let mut evicted = 0;
    while history.len() > max_versions {
        history.remove(0);
        evicted += 1;
    }
    evicted
}

/// In-memory version store.
///
/// Useful for tests and for callers that handle durability themselves.
/// Histories are partitioned by URL key; the single interior mutex only
/// guards the map itself.
pub struct MemoryVersionStore {
    histories: Mutex<HashMap<String, Vec<PageVersion>>>,
    max_versions: usize,
}

impl MemoryVersionStore {
    /// Creates an empty store with the given retention cap.
    pub fn new(max_versions: usize) -> Self {
        Self {
            histories: Mutex::new(HashMap::new()),
            max_versions,
        }
    }

    /// Number of versions currently held for the URL.
    pub fn history_len(&self, url: &str) -> usize {
        let histories = lock_unpoisoned(&self.histories);
        histories.get(url).map(Vec::len).unwrap_or(0)
    }
}

impl VersionStore for MemoryVersionStore {
    fn latest_version(&self, url: &str) -> Result<Option<PageVersion>> {
        let histories = lock_unpoisoned(&self.histories);
        Ok(histories.get(url).and_then(|h| h.last().cloned()))
    }

    fn save_version(&self, version: PageVersion) -> Result<()> {
        let mut histories = lock_unpoisoned(&self.histories);
        let history = histories.entry(version.url.clone()).or_default();
        check_capture_order(history, &version)?;
        history.push(version);
        let evicted = evict_to_cap(history, self.max_versions);
        if evicted > 0 {
            debug!(evicted, "evicted versions past retention cap");
        }
        Ok(())
    }

    fn version_history(&self, url: &str, max_versions: usize) -> Result<Vec<PageVersion>> {
        let histories = lock_unpoisoned(&self.histories);
        let history = match histories.get(url) {
            Some(h) => h,
            None => return Ok(Vec::new()),
        };
        Ok(history.iter().rev().take(max_versions).cloned().collect())
    }
}

/// Acquires a mutex, recovering the data if a previous holder panicked.
/// Version histories stay internally consistent because every mutation is
/// a single push/truncate under the lock.
pub(crate) fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(url: &str, text: &str) -> PageVersion {
        PageVersion::new(url, text)
    }

    #[test]
    fn test_latest_version_absent() {
        let store = MemoryVersionStore::new(10);
        assert!(store.latest_version("https://example.gov").unwrap().is_none());
    }

    #[test]
    fn test_history_absent_is_empty() {
        let store = MemoryVersionStore::new(10);
        assert!(store.version_history("https://example.gov", 5).unwrap().is_empty());
    }

    #[test]
    fn test_save_and_latest() {
        let store = MemoryVersionStore::new(10);
        store.save_version(version("u", "first")).unwrap();
        store.save_version(version("u", "second")).unwrap();

        let latest = store.latest_version("u").unwrap().unwrap();
        assert_eq!(latest.text_content, "second");
    }

    #[test]
    fn test_history_newest_first_and_truncated() {
        let store = MemoryVersionStore::new(10);
        for i in 0..5 {
            store.save_version(version("u", &format!("text {}", i))).unwrap();
        }

        let history = store.version_history("u", 3).unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].text_content, "text 4");
        assert_eq!(history[2].text_content, "text 2");
    }

    #[test]
    fn test_retention_evicts_oldest() {
        let store = MemoryVersionStore::new(3);
        for i in 0..7 {
            store.save_version(version("u", &format!("text {}", i))).unwrap();
        }

        let history = store.version_history("u", 10).unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].text_content, "text 6");
        assert_eq!(history[2].text_content, "text 4");
    }

    #[test]
    fn test_retention_preserves_capture_order() {
        let store = MemoryVersionStore::new(3);
        for i in 0..5 {
            store.save_version(version("u", &format!("text {}", i))).unwrap();
        }

        let history = store.version_history("u", 10).unwrap();
        for pair in history.windows(2) {
            assert!(pair[0].captured_at >= pair[1].captured_at);
        }
    }

    #[test]
    fn test_urls_partition_independently() {
        let store = MemoryVersionStore::new(2);
        store.save_version(version("a", "a1")).unwrap();
        store.save_version(version("b", "b1")).unwrap();
        store.save_version(version("a", "a2")).unwrap();

        assert_eq!(store.history_len("a"), 2);
        assert_eq!(store.history_len("b"), 1);
    }

    #[test]
    fn test_out_of_order_append_rejected() {
        let store = MemoryVersionStore::new(10);
        let early = version("u", "early");
        let late = version("u", "late");

        store.save_version(late).unwrap();
        let mut stale = early;
        stale.captured_at = stale.captured_at - chrono::Duration::seconds(60);

        let result = store.save_version(stale);
        assert!(matches!(result, Err(StoreError::InvalidData(_))));
    }
}
