//! Core data models for regwatch.
//!
//! This crate provides the canonical data types shared by the persistence
//! and detection crates:
//!
//! - **version**: [`PageVersion`], one captured snapshot of a URL, plus the
//!   stable content hash used for cheap equality checks
//! - **change**: [`ChangeType`] and [`ChangeAnalysisResult`], the output of
//!   diff classification
//! - **significance**: [`SignificantChangesResult`], the scored judgment
//!   handed to alerting
//!
//! `PageVersion` is the only durable entity; the analysis and significance
//! results are pure function outputs and are never persisted.

pub mod change;
pub mod significance;
pub mod version;

// Re-export main types
pub use change::{ChangeAnalysisResult, ChangeType};
pub use significance::SignificantChangesResult;
pub use version::{content_hash, PageVersion, VersionId};
