//! Keyword-family classification of claim context.
//!
//! Families are tried in table order and the first family with a term present
//! in the text wins. Order matters: `將來醫療` must be tried before `醫療`.

use lexclaim_core::{ClaimType, Patterns};

/// How a classification was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrength {
    /// A claim-family term matched.
    Specific,
    /// Only a generic claim term (`費用`, `損失`, …) matched.
    Generic,
}

impl MatchStrength {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Specific => "specific",
            Self::Generic => "generic",
        }
    }
}

/// Result of classifying one span of context.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub claim_type: ClaimType,
    pub strength: MatchStrength,
    /// The term that decided the classification.
    pub term: String,
}

/// Classify `text` against the family table, falling back to the generic terms.
pub fn classify(patterns: &Patterns, text: &str) -> Option<Classification> {
    classify_specific(patterns, text).or_else(|| classify_generic(patterns, text))
}

/// First family with a term present in `text`.
pub fn classify_specific(patterns: &Patterns, text: &str) -> Option<Classification> {
    patterns
        .config()
        .claim_families
        .iter()
        .find_map(|family| {
            family
                .terms
                .iter()
                .find(|t| !t.is_empty() && text.contains(t.as_str()))
                .map(|term| Classification {
                    claim_type: family.claim_type.clone(),
                    strength: MatchStrength::Specific,
                    term: term.clone(),
                })
        })
}

/// [`ClaimType::General`] if a generic claim term occurs in `text`.
pub fn classify_generic(patterns: &Patterns, text: &str) -> Option<Classification> {
    patterns
        .config()
        .generic_terms
        .iter()
        .find(|t| !t.is_empty() && text.contains(t.as_str()))
        .map(|term| Classification {
            claim_type: ClaimType::General,
            strength: MatchStrength::Generic,
            term: term.clone(),
        })
}

/// Whether `label` announces a sum of other claims (`合計`, `共計`, …)
/// rather than a claim of its own.
///
/// A total marker next to a specific family term (`醫療及交通費用合計`) still
/// counts as a claim.
pub fn is_total_line(patterns: &Patterns, label: &str) -> bool {
    let marked = patterns
        .config()
        .total_markers
        .iter()
        .any(|m| !m.is_empty() && label.contains(m.as_str()));
    marked && classify_specific(patterns, label).is_none()
}
