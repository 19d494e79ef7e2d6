//! Default regulatory vocabulary for significance scoring.

use crate::config::KeywordWeight;

/// Builds the default significant-keyword table.
///
/// Weights are tunable configuration, not fixed semantics: most entries sit
/// at the default weight of 1.0, with a few high-salience terms (penalties,
/// deadlines) at 1.5. The scorer normalizes and clamps to [0, 1], so
/// overriding weights cannot break the threshold contract.
pub fn default_significant_keywords() -> Vec<KeywordWeight> {
    vec![
        // Obligation language
        KeywordWeight::new("must").with_category("obligation"),
        KeywordWeight::new("shall").with_category("obligation"),
        KeywordWeight::new("required").with_category("obligation"),
        KeywordWeight::new("mandatory").with_category("obligation"),
        KeywordWeight::new("obligation").with_category("obligation"),
        // Penalties and enforcement
        KeywordWeight::new("penalty").with_weight(1.5).with_category("penalty"),
        KeywordWeight::new("penalties").with_weight(1.5).with_category("penalty"),
        KeywordWeight::new("fine").with_category("penalty"),
        KeywordWeight::new("sanction").with_category("penalty"),
        KeywordWeight::new("enforcement").with_category("penalty"),
        KeywordWeight::new("violation").with_category("penalty"),
        // Deadlines and effectivity
        KeywordWeight::new("deadline").with_weight(1.5).with_category("deadline"),
        KeywordWeight::new("effective").with_category("deadline"),
        KeywordWeight::new("expires").with_category("deadline"),
        KeywordWeight::new("due").with_category("deadline"),
        // Fees and payments
        KeywordWeight::new("fee").with_category("fee"),
        KeywordWeight::new("fees").with_category("fee"),
        KeywordWeight::new("charge").with_category("fee"),
        KeywordWeight::new("payment").with_category("fee"),
        KeywordWeight::new("tariff").with_category("fee"),
        // Rule lifecycle
        KeywordWeight::new("amendment").with_category("amendment"),
        KeywordWeight::new("amended").with_category("amendment"),
        KeywordWeight::new("revised").with_category("amendment"),
        KeywordWeight::new("repealed").with_category("amendment"),
        KeywordWeight::new("superseded").with_category("amendment"),
        // Compliance and permissions
        KeywordWeight::new("compliance").with_category("compliance"),
        KeywordWeight::new("prohibited").with_category("compliance"),
        KeywordWeight::new("restricted").with_category("compliance"),
        KeywordWeight::new("exemption").with_category("compliance"),
        KeywordWeight::new("license").with_category("compliance"),
        KeywordWeight::new("permit").with_category("compliance"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_is_valid() {
        for kw in default_significant_keywords() {
            assert!(!kw.keyword.trim().is_empty());
            assert!(kw.weight > 0.0);
            assert!(kw.category.is_some());
        }
    }

    #[test]
    fn test_default_table_covers_core_vocabulary() {
        let keywords: Vec<String> = default_significant_keywords()
            .into_iter()
            .map(|k| k.keyword)
            .collect();
        for term in ["must", "shall", "penalty", "deadline", "fee"] {
            assert!(keywords.iter().any(|k| k == term), "missing {}", term);
        }
    }
}
