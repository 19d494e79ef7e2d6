//! Error types for version storage operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during version storage operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to read from the file system.
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write to the file system.
    #[error("failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize or deserialize version data.
    #[error("failed to serialize version data: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// No version history exists for the URL.
    #[error("no version history for url: {url}")]
    NotFound { url: String },

    /// Version data violates a store invariant.
    #[error("invalid version data: {0}")]
    InvalidData(String),
}

/// Result type alias for version storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::NotFound {
            url: "https://example.gov".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "no version history for url: https://example.gov"
        );

        let err = StoreError::InvalidData("out-of-order capture".to_string());
        assert_eq!(err.to_string(), "invalid version data: out-of-order capture");
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: StoreError = json_err.into();
        assert!(matches!(err, StoreError::SerializeError(_)));
    }
}
