//! Version history persistence for regwatch.
//!
//! This crate provides the [`VersionStore`] seam the detection core writes
//! through, plus two implementations:
//!
//! - [`FileVersionStore`]: one JSON history file per URL, written with
//!   atomic temp-file-then-rename operations (crash-safe)
//! - [`MemoryVersionStore`]: in-process storage for tests and callers that
//!   handle durability themselves
//!
//! Both enforce the retention cap (oldest versions evicted first) and the
//! per-URL capture-order invariant.
//!
//! # Example
//!
//! ```no_run
//! use regwatch_models::PageVersion;
//! use regwatch_persistence::{FileVersionStore, VersionStore};
//!
//! let store = FileVersionStore::new("/var/lib/regwatch", 10);
//! store.save_version(PageVersion::new("https://example.gov/rules", "text")).unwrap();
//! let latest = store.latest_version("https://example.gov/rules").unwrap();
//! assert!(latest.is_some());
//! ```

pub mod error;
pub mod file_store;
pub mod store;

pub use error::{Result, StoreError};
pub use file_store::FileVersionStore;
pub use store::{MemoryVersionStore, VersionStore};
