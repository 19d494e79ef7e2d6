//! Captured page snapshots.
//!
//! A [`PageVersion`] is one captured textual rendering of a URL at a point
//! in time. Versions for a URL form an ordered, bounded history; a version
//! is never mutated after creation and is destroyed only by retention
//! eviction.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::change::ChangeType;

/// Maximum length of the derived content summary, in characters.
const SUMMARY_MAX_CHARS: usize = 200;

/// Unique identifier for a captured version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(String);

impl VersionId {
    /// Creates a new random ID.
    pub fn new() -> Self {
        Self(format!("ver-{}", Uuid::new_v4()))
    }

    /// Creates an ID from an existing string (for deserialization/testing).
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for VersionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One captured snapshot of a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageVersion {
    /// Unique identifier for this version.
    pub id: VersionId,

    /// URL this snapshot was captured from. Identity key: versions form an
    /// ordered sequence per URL. Exact string match, no normalization.
    pub url: String,

    /// SHA-256 hex digest of the whitespace-collapsed text content.
    /// Used for cheap equality checks before running a full diff.
    pub content_hash: String,

    /// When this snapshot was captured.
    pub captured_at: DateTime<Utc>,

    /// Full extracted text of the page.
    pub text_content: String,

    /// Short derived excerpt of the content.
    pub content_summary: String,

    /// Classification relative to the immediately preceding version.
    #[serde(default)]
    pub change_from_previous: ChangeType,

    /// Collaborator-supplied schema-less metadata (e.g. document extractor
    /// output). Empty for ordinary captures.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, String>,
}

impl PageVersion {
    /// Creates a new version for the given URL and extracted text.
    ///
    /// Computes the content hash and summary; `change_from_previous`
    /// defaults to [`ChangeType::None`].
    pub fn new(url: impl Into<String>, text_content: impl Into<String>) -> Self {
        let text_content = text_content.into();
        Self {
            id: VersionId::new(),
            url: url.into(),
            content_hash: content_hash(&text_content),
            captured_at: Utc::now(),
            content_summary: summarize_content(&text_content),
            text_content,
            change_from_previous: ChangeType::None,
            extra: HashMap::new(),
        }
    }

    /// Sets the classification relative to the previous version.
    pub fn with_change(mut self, change: ChangeType) -> Self {
        self.change_from_previous = change;
        self
    }

    /// Attaches a metadata entry.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Size of the stored text content in bytes.
    pub fn content_size(&self) -> usize {
        self.text_content.len()
    }
}

/// Computes the stable content hash for a text snapshot.
///
/// The text is whitespace-collapsed first, so reflows and indentation
/// changes hash identically. SHA-256 hex, stable across processes (the
/// hash is persisted alongside the version).
pub fn content_hash(text: &str) -> String {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let digest = Sha256::digest(normalized.as_bytes());
    format!("{:x}", digest)
}

/// Derives the short excerpt stored as `content_summary`.
fn summarize_content(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= SUMMARY_MAX_CHARS {
        return collapsed;
    }
    let truncated: String = collapsed.chars().take(SUMMARY_MAX_CHARS).collect();
    format!("{}...", truncated.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_id_prefix() {
        let id = VersionId::new();
        assert!(id.as_str().starts_with("ver-"));
    }

    #[test]
    fn test_new_version_defaults() {
        let version = PageVersion::new("https://example.gov/rules", "Some rule text.");
        assert_eq!(version.url, "https://example.gov/rules");
        assert_eq!(version.change_from_previous, ChangeType::None);
        assert!(version.extra.is_empty());
        assert_eq!(version.content_hash, content_hash("Some rule text."));
    }

    #[test]
    fn test_content_hash_ignores_whitespace() {
        assert_eq!(
            content_hash("A  must\tcomply\n\nwith X."),
            content_hash("A must comply with X.")
        );
    }

    #[test]
    fn test_content_hash_differs_on_content() {
        assert_ne!(content_hash("old text"), content_hash("new text"));
    }

    #[test]
    fn test_summary_short_content_unchanged() {
        let version = PageVersion::new("u", "Short content.");
        assert_eq!(version.content_summary, "Short content.");
    }

    #[test]
    fn test_summary_truncated() {
        let long = "word ".repeat(100);
        let version = PageVersion::new("u", long);
        assert!(version.content_summary.chars().count() <= SUMMARY_MAX_CHARS + 3);
        assert!(version.content_summary.ends_with("..."));
    }

    #[test]
    fn test_with_change_and_extra() {
        let version = PageVersion::new("u", "text")
            .with_change(ChangeType::Major)
            .with_extra("source", "pdf-extractor");
        assert_eq!(version.change_from_previous, ChangeType::Major);
        assert_eq!(version.extra.get("source").map(String::as_str), Some("pdf-extractor"));
    }

    #[test]
    fn test_serde_skips_empty_extra() {
        let version = PageVersion::new("u", "text");
        let json = serde_json::to_string(&version).unwrap();
        assert!(!json.contains("extra"));
    }
}
