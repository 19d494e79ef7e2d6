//! Change detection and significance scoring for regwatch.
//!
//! Given two textual snapshots of a monitored page (old vs. new), this
//! crate decides whether the difference is noise or a regulatory-relevant
//! change, classifies the change's type and importance, and maintains a
//! bounded version history per URL through `regwatch-persistence`.
//!
//! - **config**: [`ChangeDetectionConfig`], validated once at load time
//! - **classifier**: [`DiffClassifier`], segment-level diff classification
//! - **scorer**: [`SignificanceScorer`], keyword-weighted significance
//! - **service**: [`ChangeDetectionService`], the per-URL orchestration
//!   entry point the scraper pipeline calls
//! - **keywords**: the default regulatory vocabulary
//!
//! # Example
//!
//! ```no_run
//! use regwatch_detection::{ChangeDetectionConfig, ChangeDetectionService};
//!
//! let service = ChangeDetectionService::with_file_store(
//!     ChangeDetectionConfig::default(),
//!     "/var/lib/regwatch",
//! ).unwrap();
//!
//! let result = service
//!     .detect_and_record("https://example.gov/rules", "<html>...</html>", "Extracted text...")
//!     .unwrap();
//! if result.has_significant_changes {
//!     println!("{}", result.summary);
//! }
//! ```

pub mod classifier;
pub mod config;
pub mod error;
pub mod keywords;
pub mod scorer;
pub mod service;


// Re-export public types
pub use classifier::DiffClassifier;
pub use config::{ChangeDetectionConfig, ConfigError, KeywordWeight};
pub use error::{DetectionError, Result};
pub use keywords::default_significant_keywords;
pub use scorer::SignificanceScorer;
pub use service::ChangeDetectionService;

// Re-export the model and store types callers interact with
pub use regwatch_models::{
    ChangeAnalysisResult, ChangeType, PageVersion, SignificantChangesResult,
};
pub use regwatch_persistence::{FileVersionStore, MemoryVersionStore, VersionStore};
