//! Significance scoring for classified changes.
//!
//! Translates a [`ChangeAnalysisResult`] plus the actual text deltas into a
//! business-relevant judgment: a keyword-weighted score gated by the
//! configured threshold, and human-readable summaries for alerting.

use std::collections::{BTreeSet, HashMap};

use regex::Regex;
use regwatch_models::{ChangeAnalysisResult, ChangeType, SignificantChangesResult};
use tracing::debug;

use crate::config::ChangeDetectionConfig;

/// Number of matched terms quoted in the one-line summary.
const SUMMARY_TERM_COUNT: usize = 3;

/// Scores classified changes against the configured keyword table.
pub struct SignificanceScorer {
    /// Lowercased keyword -> (weight, category).
    keywords: HashMap<String, (f64, Option<String>)>,
    significance_threshold: f64,
    /// Word tokenizer for vocabulary deltas.
    token_re: Regex,
}

impl SignificanceScorer {
    /// Creates a scorer from the detection config.
    pub fn new(config: &ChangeDetectionConfig) -> Self {
        let keywords = config
            .significant_keywords
            .iter()
            .map(|kw| {
                (
                    kw.keyword.to_lowercase(),
                    (kw.weight, kw.category.clone()),
                )
            })
            .collect();
        Self {
            keywords,
            significance_threshold: config.significance_threshold,
            token_re: Regex::new(r"[a-z0-9]+(?:'[a-z0-9]+)*").expect("static regex"),
        }
    }

    /// Scores the change from `old_text` to `new_text`.
    ///
    /// A [`ChangeType::None`] analysis short-circuits to a non-significant
    /// result without computing the weighted score.
    pub fn score(
        &self,
        old_text: &str,
        new_text: &str,
        analysis: &ChangeAnalysisResult,
    ) -> SignificantChangesResult {
        if analysis.change_type == ChangeType::None {
            return SignificantChangesResult::not_significant(ChangeType::None);
        }

        let old_vocab = self.vocabulary(old_text);
        let new_vocab = self.vocabulary(new_text);
        let added_delta: Vec<&String> = new_vocab.difference(&old_vocab).collect();
        let removed_delta: Vec<&String> = old_vocab.difference(&new_vocab).collect();
        let total_delta = added_delta.len() + removed_delta.len();

        let mut added_terms = BTreeSet::new();
        let mut removed_terms = BTreeSet::new();
        let mut changed_categories = BTreeSet::new();
        let mut matched_weight = 0.0;

        for term in added_delta {
            if let Some((weight, category)) = self.keywords.get(term) {
                matched_weight += weight;
                added_terms.insert(term.clone());
                if let Some(category) = category {
                    changed_categories.insert(category.clone());
                }
            }
        }
        for term in removed_delta {
            if let Some((weight, category)) = self.keywords.get(term) {
                matched_weight += weight;
                removed_terms.insert(term.clone());
                if let Some(category) = category {
                    changed_categories.insert(category.clone());
                }
            }
        }

        // Normalized by the size of the vocabulary delta so the score is
        // roughly independent of document length.
        let weighted_score = if total_delta == 0 {
            0.0
        } else {
            (matched_weight / total_delta as f64).clamp(0.0, 1.0)
        };
        let has_significant_changes = weighted_score >= self.significance_threshold;

        debug!(
            change_type = %analysis.change_type,
            weighted_score,
            matched = added_terms.len() + removed_terms.len(),
            "scored change"
        );

        SignificantChangesResult {
            has_significant_changes,
            change_type: analysis.change_type,
            importance_level: analysis.change_type.importance_level(),
            weighted_score,
            summary: self.summarize(analysis, &added_terms),
            detailed_description: describe(analysis),
            added_terms,
            removed_terms,
            changed_categories,
        }
    }

    /// Lowercased word set of a text.
    fn vocabulary(&self, text: &str) -> BTreeSet<String> {
        let lowered = text.to_lowercase();
        self.token_re
            .find_iter(&lowered)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Templated one-line summary.
    fn summarize(&self, analysis: &ChangeAnalysisResult, added_terms: &BTreeSet<String>) -> String {
        let top_terms = if added_terms.is_empty() {
            "none".to_string()
        } else {
            added_terms
                .iter()
                .take(SUMMARY_TERM_COUNT)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!(
            "{} change detected: {} sections changed ({:.0}%), matched keywords: {}",
            analysis.change_type,
            analysis.changed_segments(),
            analysis.change_percentage * 100.0,
            top_terms
        )
    }
}

/// Lists every changed section with its classification.
fn describe(analysis: &ChangeAnalysisResult) -> String {
    let mut description = format!(
        "{} change: {} added, {} removed, {} modified section(s), {:.1}% of content",
        analysis.change_type,
        analysis.added_count,
        analysis.removed_count,
        analysis.modified_count,
        analysis.change_percentage * 100.0
    );
    for section in &analysis.changed_sections {
        description.push_str("\n  - ");
        description.push_str(section);
    }
    description
}
