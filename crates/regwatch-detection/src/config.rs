//! Detection configuration.
//!
//! [`ChangeDetectionConfig`] is an explicit value passed into the service
//! constructor. There is no process-wide mutable configuration state; the
//! surrounding application deserializes this from its own config file and
//! validation happens once, at load time.

use serde::Deserialize;
use thiserror::Error;

use crate::keywords;

/// A configured significance keyword with its scoring weight and optional
/// category label.
#[derive(Debug, Clone, Deserialize)]
pub struct KeywordWeight {
    /// The keyword. Matched case-insensitively against vocabulary deltas.
    pub keyword: String,
    /// Contribution to the weighted score when the keyword matches.
    #[serde(default = "default_keyword_weight")]
    pub weight: f64,
    /// Category label collected into `changed_categories` on a match.
    #[serde(default)]
    pub category: Option<String>,
}

impl KeywordWeight {
    /// Creates a keyword with the default weight and no category.
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            weight: default_keyword_weight(),
            category: None,
        }
    }

    /// Sets the scoring weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Sets the category label.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

fn default_keyword_weight() -> f64 {
    1.0
}

/// Configuration for the change-detection core.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChangeDetectionConfig {
    /// Domain vocabulary that marks a change as business-relevant.
    pub significant_keywords: Vec<KeywordWeight>,
    /// New content shorter than this (in characters) is treated as
    /// insufficient signal, avoiding false positives on loading
    /// placeholders and near-empty pages.
    pub min_content_length: usize,
    /// Minimum weighted keyword score, in [0, 1], required to flag a
    /// change as significant. The boundary is inclusive.
    pub significance_threshold: f64,
    /// When false, only the latest version is retained per URL.
    pub store_version_history: bool,
    /// Retention cap per URL; oldest versions are evicted first.
    pub max_versions_per_url: usize,
    /// Change percentage at or below which a nonzero diff is Format.
    pub format_threshold: f64,
    /// Change percentage at or below which a diff is Minor.
    pub minor_threshold: f64,
    /// Change percentage at or below which a diff is Major; above is
    /// Complete.
    pub major_threshold: f64,
    /// Token-overlap ratio at or above which two same-position segments
    /// are considered identical rather than modified.
    pub similarity_floor: f64,
}

impl Default for ChangeDetectionConfig {
    fn default() -> Self {
        Self {
            significant_keywords: keywords::default_significant_keywords(),
            min_content_length: 100,
            significance_threshold: 0.3,
            store_version_history: true,
            max_versions_per_url: 10,
            format_threshold: 0.05,
            minor_threshold: 0.2,
            major_threshold: 0.6,
            similarity_floor: 0.9,
        }
    }
}

impl ChangeDetectionConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the keyword list.
    pub fn with_keywords(mut self, keywords: Vec<KeywordWeight>) -> Self {
        self.significant_keywords = keywords;
        self
    }

    /// Sets the minimum content length.
    pub fn with_min_content_length(mut self, length: usize) -> Self {
        self.min_content_length = length;
        self
    }

    /// Sets the significance threshold.
    pub fn with_significance_threshold(mut self, threshold: f64) -> Self {
        self.significance_threshold = threshold;
        self
    }

    /// Enables or disables version history retention.
    pub fn with_store_version_history(mut self, store: bool) -> Self {
        self.store_version_history = store;
        self
    }

    /// Sets the retention cap per URL.
    pub fn with_max_versions_per_url(mut self, max: usize) -> Self {
        self.max_versions_per_url = max;
        self
    }

    /// Sets the percentage boundaries of the Format/Minor/Major buckets.
    pub fn with_thresholds(mut self, format: f64, minor: f64, major: f64) -> Self {
        self.format_threshold = format;
        self.minor_threshold = minor;
        self.major_threshold = major;
        self
    }

    /// Sets the segment similarity floor.
    pub fn with_similarity_floor(mut self, floor: f64) -> Self {
        self.similarity_floor = floor;
        self
    }

    /// The retention cap the version store should be built with:
    /// `max_versions_per_url`, or 1 when history is disabled.
    pub fn effective_retention(&self) -> usize {
        if self.store_version_history {
            self.max_versions_per_url
        } else {
            1
        }
    }

    /// Validates the configuration. Called once at service construction;
    /// the core fails fast rather than degrading per request.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.significance_threshold) {
            return Err(ConfigError::ThresholdOutOfRange {
                name: "significance_threshold",
                value: self.significance_threshold,
            });
        }
        if self.max_versions_per_url == 0 {
            return Err(ConfigError::ZeroRetention);
        }
        let monotonic = self.format_threshold > 0.0
            && self.format_threshold < self.minor_threshold
            && self.minor_threshold < self.major_threshold
            && self.major_threshold <= 1.0;
        if !monotonic {
            return Err(ConfigError::NonMonotonicThresholds {
                format: self.format_threshold,
                minor: self.minor_threshold,
                major: self.major_threshold,
            });
        }
        if !(self.similarity_floor > 0.0 && self.similarity_floor <= 1.0) {
            return Err(ConfigError::BadSimilarityFloor(self.similarity_floor));
        }
        for kw in &self.significant_keywords {
            if kw.keyword.trim().is_empty() {
                return Err(ConfigError::EmptyKeyword);
            }
            if !kw.weight.is_finite() || kw.weight <= 0.0 {
                return Err(ConfigError::BadWeight {
                    keyword: kw.keyword.clone(),
                    weight: kw.weight,
                });
            }
        }
        Ok(())
    }
}

/// Errors raised by [`ChangeDetectionConfig::validate`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A [0, 1] threshold is out of range.
    #[error("{name} must be within [0, 1], got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f64 },

    /// The retention cap must keep at least one version.
    #[error("max_versions_per_url must be greater than zero")]
    ZeroRetention,

    /// Classifier bucket boundaries must be strictly increasing in (0, 1].
    #[error("classifier thresholds must satisfy 0 < format < minor < major <= 1, got {format}/{minor}/{major}")]
    NonMonotonicThresholds { format: f64, minor: f64, major: f64 },

    /// The similarity floor must be within (0, 1].
    #[error("similarity_floor must be within (0, 1], got {0}")]
    BadSimilarityFloor(f64),

    /// A configured keyword is empty.
    #[error("significant keyword must not be empty")]
    EmptyKeyword,

    /// A keyword weight is non-finite or non-positive.
    #[error("keyword {keyword:?} has invalid weight {weight}")]
    BadWeight { keyword: String, weight: f64 },
}
