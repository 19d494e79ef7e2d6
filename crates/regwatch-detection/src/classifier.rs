//! Diff classification between two text snapshots.
//!
//! The classifier decides what *kind* of change occurred, independent of
//! business importance. Comparison granularity is the segment: a
//! paragraph-level unit split on blank-line boundaries.

use std::collections::{HashMap, HashSet};

use regex::Regex;
use regwatch_models::{ChangeAnalysisResult, ChangeType};

use crate::config::ChangeDetectionConfig;

/// Maximum length of a derived segment label, in characters.
const LABEL_MAX_CHARS: usize = 60;

/// A paragraph-level comparison unit.
#[derive(Debug)]
struct Segment {
    /// Raw segment text (used for token-overlap comparison).
    text: String,
    /// Whitespace-collapsed, case-preserved text (used for equality).
    normalized: String,
    /// Short label derived from the first line, used as the section
    /// identifier in `changed_sections`.
    label: String,
}

/// Classifies the difference between two snapshots into a
/// [`ChangeType`] with segment-level counts.
pub struct DiffClassifier {
    min_content_length: usize,
    format_threshold: f64,
    minor_threshold: f64,
    major_threshold: f64,
    similarity_floor: f64,
    /// Splits text into segments on blank-line boundaries.
    splitter: Regex,
}

impl DiffClassifier {
    /// Creates a classifier from the detection config.
    pub fn new(config: &ChangeDetectionConfig) -> Self {
        Self {
            min_content_length: config.min_content_length,
            format_threshold: config.format_threshold,
            minor_threshold: config.minor_threshold,
            major_threshold: config.major_threshold,
            similarity_floor: config.similarity_floor,
            // \s covers \r for CRLF input
            splitter: Regex::new(r"\n\s*\n").expect("static regex"),
        }
    }

    /// Classifies the change from `old_text` to `new_text`.
    ///
    /// `old_text` of `None` means first capture: there is nothing to diff
    /// against and the result is [`ChangeType::None`] with zero counts.
    /// New content shorter than the configured minimum is treated the same
    /// way (insufficient signal, not an error).
    pub fn classify(&self, old_text: Option<&str>, new_text: &str) -> ChangeAnalysisResult {
        let old_text = match old_text {
            Some(text) => text,
            None => return ChangeAnalysisResult::unchanged(),
        };
        if new_text.chars().count() < self.min_content_length {
            return ChangeAnalysisResult::unchanged();
        }

        let old_segments = self.segment(old_text);
        let new_segments = self.segment(new_text);

        let mut old_counts: HashMap<&str, usize> = HashMap::new();
        for seg in &old_segments {
            *old_counts.entry(seg.normalized.as_str()).or_insert(0) += 1;
        }
        let mut new_counts: HashMap<&str, usize> = HashMap::new();
        for seg in &new_segments {
            *new_counts.entry(seg.normalized.as_str()).or_insert(0) += 1;
        }

        // A segment is an orphan if its normalized text has no unconsumed
        // counterpart on the other side. Matching is multiset-aware, so a
        // surplus duplicate paragraph still counts as added or removed.
        // Orphans at the same ordinal position are candidates for
        // "modified" pairing.
        let old_orphan: Vec<bool> = old_segments
            .iter()
            .map(|s| match new_counts.get_mut(s.normalized.as_str()) {
                Some(n) if *n > 0 => {
                    *n -= 1;
                    false
                }
                _ => true,
            })
            .collect();
        let new_orphan: Vec<bool> = new_segments
            .iter()
            .map(|s| match old_counts.get_mut(s.normalized.as_str()) {
                Some(n) if *n > 0 => {
                    *n -= 1;
                    false
                }
                _ => true,
            })
            .collect();

        let shared = old_segments.len().min(new_segments.len());
        let mut paired_old = vec![false; old_segments.len()];
        let mut paired_new = vec![false; new_segments.len()];
        let mut modified_new = vec![false; new_segments.len()];
        let mut modified_count = 0;
        let mut weighted_changes = 0.0;

        for i in 0..shared {
            if !(old_orphan[i] && new_orphan[i]) {
                continue;
            }
            let overlap = token_overlap(&old_segments[i].text, &new_segments[i].text);
            if overlap <= 0.0 {
                // Unrelated content at the same position: counts as an
                // add plus a remove below.
                continue;
            }
            paired_old[i] = true;
            paired_new[i] = true;
            if overlap < self.similarity_floor {
                // A lightly edited paragraph contributes its dissimilarity,
                // not a full segment: a literal count would classify every
                // single-paragraph edit as a complete rewrite. At or above
                // the floor the pair counts as identical and contributes
                // nothing.
                weighted_changes += 1.0 - overlap;
                modified_count += 1;
                modified_new[i] = true;
            }
        }

        let mut changed_sections = Vec::new();
        let mut added_count = 0;
        for (j, seg) in new_segments.iter().enumerate() {
            if modified_new[j] {
                changed_sections.push(format!("modified: {}", seg.label));
            } else if new_orphan[j] && !paired_new[j] {
                added_count += 1;
                changed_sections.push(format!("added: {}", seg.label));
            }
        }
        let mut removed_count = 0;
        for (i, seg) in old_segments.iter().enumerate() {
            if old_orphan[i] && !paired_old[i] {
                removed_count += 1;
                changed_sections.push(format!("removed: {}", seg.label));
            }
        }

        let denominator = new_segments.len().max(1) as f64;
        let change_percentage =
            (((added_count + removed_count) as f64 + weighted_changes) / denominator)
                .clamp(0.0, 1.0);

        ChangeAnalysisResult {
            change_type: self.bucket(change_percentage),
            added_count,
            removed_count,
            modified_count,
            change_percentage,
            changed_sections,
        }
    }

    /// Maps a change percentage onto the ordinal taxonomy. Boundaries are
    /// inclusive on the upper end of each bucket.
    fn bucket(&self, percentage: f64) -> ChangeType {
        if percentage <= 0.0 {
            ChangeType::None
        } else if percentage <= self.format_threshold {
            ChangeType::Format
        } else if percentage <= self.minor_threshold {
            ChangeType::Minor
        } else if percentage <= self.major_threshold {
            ChangeType::Major
        } else {
            ChangeType::Complete
        }
    }

    /// Splits text into paragraph-level segments on blank-line boundaries.
    fn segment(&self, text: &str) -> Vec<Segment> {
        self.splitter
            .split(text)
            .filter_map(|chunk| {
                let normalized = collapse_whitespace(chunk);
                if normalized.is_empty() {
                    return None;
                }
                let label = derive_label(chunk);
                Some(Segment {
                    text: chunk.to_string(),
                    normalized,
                    label,
                })
            })
            .collect()
    }
}

/// Collapses runs of whitespace to single spaces, preserving case.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Derives a short section label from the segment's first line.
fn derive_label(segment: &str) -> String {
    let first_line = segment
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("");
    let collapsed = collapse_whitespace(first_line);
    if collapsed.chars().count() <= LABEL_MAX_CHARS {
        return collapsed;
    }
    let truncated: String = collapsed.chars().take(LABEL_MAX_CHARS).collect();
    format!("{}...", truncated.trim_end())
}

/// Jaccard index of the two segments' lowercased word sets.
fn token_overlap(a: &str, b: &str) -> f64 {
    let tokens_a = word_set(a);
    let tokens_b = word_set(b);
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }
    let intersection = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count();
    intersection as f64 / union as f64
}

fn word_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> DiffClassifier {
        DiffClassifier::new(&ChangeDetectionConfig::new().with_min_content_length(10))
    }

    #[test]
    fn test_first_capture_is_none() {
        let result = classifier().classify(None, "Brand new page content here.");
        assert_eq!(result.change_type, ChangeType::None);
        assert_eq!(result.changed_segments(), 0);
    }

    #[test]
    fn test_short_content_is_none() {
        let config = ChangeDetectionConfig::new().with_min_content_length(100);
        let classifier = DiffClassifier::new(&config);
        let result = classifier.classify(Some("Old regulation text."), "tiny");
        assert_eq!(result.change_type, ChangeType::None);
    }

    #[test]
    fn test_identical_text_is_none() {
        let text = "Section 1. All operators must register.\n\nSection 2. Fees apply.";
        let result = classifier().classify(Some(text), text);
        assert_eq!(result.change_type, ChangeType::None);
        assert_eq!(result.change_percentage, 0.0);
    }

    #[test]
    fn test_whitespace_reflow_is_none() {
        let old = "Section 1. All operators   must register.";
        let new = "Section 1. All operators must\nregister.";
        let result = classifier().classify(Some(old), new);
        assert_eq!(result.change_type, ChangeType::None);
    }

    #[test]
    fn test_added_segment_detected() {
        let old = "Section 1. Operators must register.";
        let new = "Section 1. Operators must register.\n\nSection 2. A new penalty applies.";
        let result = classifier().classify(Some(old), new);

        assert_eq!(result.added_count, 1);
        assert_eq!(result.removed_count, 0);
        assert!(result.change_type > ChangeType::None);
        assert!(result
            .changed_sections
            .iter()
            .any(|s| s.starts_with("added: ")));
    }

    #[test]
    fn test_removed_segment_detected() {
        let old = "Section 1. Operators must register.\n\nSection 2. Fees apply.";
        let new = "Section 1. Operators must register.";
        let result = classifier().classify(Some(old), new);

        assert_eq!(result.removed_count, 1);
        assert!(result
            .changed_sections
            .iter()
            .any(|s| s.starts_with("removed: ")));
    }

    #[test]
    fn test_deleted_duplicate_paragraph_counts_as_removed() {
        let para = "Operators must file the annual report.";
        let old = format!("{}\n\n{}", para, para);
        let result = classifier().classify(Some(&old), para);

        assert_eq!(result.removed_count, 1);
        assert_eq!(result.added_count, 0);
        assert!(result.change_type > ChangeType::None);
        assert!(result
            .changed_sections
            .iter()
            .any(|s| s.starts_with("removed: ")));
    }

    #[test]
    fn test_added_duplicate_paragraph_counts_as_added() {
        let para = "Operators must file the annual report.";
        let new = format!("{}\n\n{}", para, para);
        let result = classifier().classify(Some(para), &new);

        assert_eq!(result.added_count, 1);
        assert_eq!(result.removed_count, 0);
    }

    #[test]
    fn test_one_word_edit_above_similarity_floor_is_none() {
        // 19 of 21 union tokens shared, overlap just above the 0.9 floor
        let old = "alpha bravo charlie delta echo foxtrot golf hotel india juliet \
                   kilo lima mike november oscar papa quebec romeo sierra tango";
        let new = "alpha bravo charlie delta echo foxtrot golf hotel india juliet \
                   kilo lima mike november oscar papa quebec romeo sierra uniform";
        let result = classifier().classify(Some(old), new);

        assert_eq!(result.change_type, ChangeType::None);
        assert_eq!(result.change_percentage, 0.0);
        assert_eq!(result.modified_count, 0);
        assert!(result.changed_sections.is_empty());
    }

    #[test]
    fn test_modified_segment_detected() {
        let old = "Intro paragraph stays the same.\n\nA must comply with X.";
        let new = "Intro paragraph stays the same.\n\nA must comply with X and pay a penalty fee.";
        let result = classifier().classify(Some(old), new);

        assert_eq!(result.modified_count, 1);
        assert_eq!(result.added_count, 0);
        assert_eq!(result.removed_count, 0);
        assert!(result
            .changed_sections
            .iter()
            .any(|s| s.starts_with("modified: ")));
    }

    #[test]
    fn test_single_sentence_extension_is_not_complete() {
        // One paragraph, lightly extended: the weighted percentage keeps
        // this out of the Complete bucket.
        let result = classifier().classify(
            Some("A must comply with X."),
            "A must comply with X and pay a penalty fee.",
        );
        assert!(
            result.change_type == ChangeType::Minor || result.change_type == ChangeType::Major,
            "got {:?} at {}",
            result.change_type,
            result.change_percentage
        );
    }

    #[test]
    fn test_full_rewrite_is_complete() {
        let old = "Chapter on fishing permits.\n\nQuota rules for trawlers.";
        let new = "Completely different topic now.\n\nNothing shared with before.";
        let result = classifier().classify(Some(old), new);
        assert_eq!(result.change_type, ChangeType::Complete);
    }

    #[test]
    fn test_change_percentage_bounds() {
        let old = "one paragraph here";
        let new = "first new paragraph.\n\nsecond new paragraph.\n\nthird new paragraph.";
        let result = classifier().classify(Some(old), new);
        assert!(result.change_percentage <= 1.0);
        assert!(result.change_percentage > 0.0);
    }

    #[test]
    fn test_bucket_boundaries() {
        let c = classifier();
        assert_eq!(c.bucket(0.0), ChangeType::None);
        assert_eq!(c.bucket(0.05), ChangeType::Format);
        assert_eq!(c.bucket(0.06), ChangeType::Minor);
        assert_eq!(c.bucket(0.2), ChangeType::Minor);
        assert_eq!(c.bucket(0.21), ChangeType::Major);
        assert_eq!(c.bucket(0.6), ChangeType::Major);
        assert_eq!(c.bucket(0.61), ChangeType::Complete);
        assert_eq!(c.bucket(1.0), ChangeType::Complete);
    }

    #[test]
    fn test_sections_in_document_order() {
        let old = "Keep this intro.\n\nOld section to drop.";
        let new = "Keep this intro.\n\nBrand new first addition.\n\nBrand new second addition.";
        let result = classifier().classify(Some(old), new);

        let added: Vec<&String> = result
            .changed_sections
            .iter()
            .filter(|s| s.starts_with("added: "))
            .collect();
        assert_eq!(added.len(), 2);
        assert!(added[0].contains("first addition"));
        assert!(added[1].contains("second addition"));
    }

    #[test]
    fn test_label_truncation() {
        let long_line = "word ".repeat(40);
        let label = derive_label(&long_line);
        assert!(label.chars().count() <= LABEL_MAX_CHARS + 3);
        assert!(label.ends_with("..."));
    }

    #[test]
    fn test_token_overlap_identical() {
        assert_eq!(token_overlap("a b c", "c b a"), 1.0);
    }

    #[test]
    fn test_token_overlap_disjoint() {
        assert_eq!(token_overlap("alpha beta", "gamma delta"), 0.0);
    }
}
