//! Scored significance judgment for a detected change.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::change::ChangeType;

/// Business-relevant judgment of a classified change, consumed by alerting.
///
/// Ephemeral: derived from a pair of snapshots plus configuration, never
/// persisted independently.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignificantChangesResult {
    /// Whether the change clears the configured significance threshold.
    pub has_significant_changes: bool,
    /// Classified magnitude of the change.
    pub change_type: ChangeType,
    /// Importance derived from the change type alone (0..=4).
    pub importance_level: u8,
    /// Normalized keyword-weighted score in [0, 1]. Informational; the
    /// primary signal is `change_type`, this is the significance gate.
    pub weighted_score: f64,
    /// Templated one-line summary of the change.
    pub summary: String,
    /// Every changed section with its classification.
    pub detailed_description: String,
    /// Keyword-matched terms that appeared in the new snapshot.
    pub added_terms: BTreeSet<String>,
    /// Keyword-matched terms that disappeared from the old snapshot.
    pub removed_terms: BTreeSet<String>,
    /// Categories of the matched keywords (e.g. "penalty", "deadline").
    pub changed_categories: BTreeSet<String>,
}

impl SignificantChangesResult {
    /// Result for calls where nothing significant happened (first capture,
    /// identical content, or a change below the threshold).
    pub fn not_significant(change_type: ChangeType) -> Self {
        Self {
            has_significant_changes: false,
            change_type,
            importance_level: change_type.importance_level(),
            ..Self::default()
        }
    }
}
