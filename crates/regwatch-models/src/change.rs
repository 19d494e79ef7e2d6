//! Change classification types.
//!
//! [`ChangeType`] is the ordinal taxonomy of diff magnitude;
//! [`ChangeAnalysisResult`] is the classifier's full output for one
//! old/new snapshot pair.

use serde::{Deserialize, Serialize};

/// Ordinal classification of how much a page changed between snapshots.
///
/// Ordering is significant: `None < Format < Minor < Major < Complete`.
/// The numeric importance level is derived from this ordering alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// No meaningful change (identical content, first capture, or
    /// insufficient signal).
    #[default]
    None,
    /// Formatting-level noise: whitespace, punctuation, near-identical
    /// segment edits.
    Format,
    /// A small fraction of the content changed.
    Minor,
    /// A substantial fraction of the content changed.
    Major,
    /// The page was rewritten or replaced.
    Complete,
}

impl ChangeType {
    /// Returns the importance level for this change type.
    ///
    /// Monotonic with the enum ordering: None=0, Format=1, Minor=2,
    /// Major=3, Complete=4. Independent of the weighted keyword score.
    pub fn importance_level(&self) -> u8 {
        match self {
            ChangeType::None => 0,
            ChangeType::Format => 1,
            ChangeType::Minor => 2,
            ChangeType::Major => 3,
            ChangeType::Complete => 4,
        }
    }
}

impl PartialOrd for ChangeType {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ChangeType {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.importance_level().cmp(&other.importance_level())
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeType::None => write!(f, "none"),
            ChangeType::Format => write!(f, "format"),
            ChangeType::Minor => write!(f, "minor"),
            ChangeType::Major => write!(f, "major"),
            ChangeType::Complete => write!(f, "complete"),
        }
    }
}

/// Result of classifying the diff between two text snapshots.
///
/// Ephemeral: always recomputable from the version history plus
/// configuration, never persisted.
#[derive(Debug, Clone, Default)]
pub struct ChangeAnalysisResult {
    /// Classified magnitude of the change.
    pub change_type: ChangeType,
    /// Segments present in the new text but not the old.
    pub added_count: usize,
    /// Segments present in the old text but not the new.
    pub removed_count: usize,
    /// Same-position segments that differ beyond the similarity floor.
    pub modified_count: usize,
    /// Fraction of content that differs, in [0, 1].
    pub change_percentage: f64,
    /// Labels of changed segments in document order, each prefixed with
    /// its per-section kind (`added: `, `removed: `, `modified: `).
    pub changed_sections: Vec<String>,
}

impl ChangeAnalysisResult {
    /// Result for inputs with nothing to diff against (first capture,
    /// content below the minimum length, or identical content).
    pub fn unchanged() -> Self {
        Self::default()
    }

    /// Total number of segments flagged added, removed, or modified.
    pub fn changed_segments(&self) -> usize {
        self.added_count + self.removed_count + self.modified_count
    }
}
