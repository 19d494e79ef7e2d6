//! Error types for the detection crate.

use thiserror::Error;

use crate::config::ConfigError;
use regwatch_persistence::StoreError;

/// Errors that can occur during change detection.
///
/// A failed detection is always surfaced as an error, never folded into a
/// "no change" result: alerting must be able to tell "nothing changed"
/// apart from "couldn't tell".
#[derive(Error, Debug)]
pub enum DetectionError {
    /// Version store I/O failure. Never retried here; retry policy belongs
    /// to the storage backend adapter.
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),

    /// Invalid configuration, raised at construction time.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Classification or scoring failed on malformed input.
    #[error("analysis failed for {url}: {message}")]
    Analysis { url: String, message: String },
}

/// Result type for detection operations.
pub type Result<T> = std::result::Result<T, DetectionError>;
