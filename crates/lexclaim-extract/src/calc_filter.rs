//! Excluding amounts that are calculation bases rather than claims.
//!
//! `以每日2,200元作為計算基準` states a daily rate, not a sum the plaintiff
//! claims. Rules look only at the amount's own clause, so a base and the
//! claim computed from it in the same sentence are told apart.

use std::sync::Arc;

use lexclaim_core::DamageItem;
use lexclaim_core::Patterns;
use lexclaim_core::patterns::CalculationMatcher;

use crate::text::{clause_end, clause_start};

/// The clause around the amount inside `raw_text`: from the previous clause
/// break (or the previous amount) to the next clause break (or the next
/// digit).
fn amount_clause(item: &DamageItem) -> &str {
    let raw = item.raw_text();
    let local = item.local_offset();

    let token_end = raw[local..]
        .char_indices()
        .find(|&(_, c)| !(c.is_ascii_digit() || c == ',' || c.is_whitespace()))
        .map_or(raw.len(), |(i, c)| {
            if c == '元' { local + i + c.len_utf8() } else { local + i }
        });

    let floor = raw[..local]
        .char_indices()
        .rev()
        .find(|&(i, c)| c == '元' && raw[..i].ends_with(|p: char| p.is_ascii_digit()))
        .map_or(0, |(i, c)| i + c.len_utf8());
    let start = clause_start(raw, floor, local);

    let ceiling = raw[token_end..]
        .char_indices()
        .find(|&(_, c)| c.is_ascii_digit())
        .map_or(raw.len(), |(i, _)| token_end + i);
    let end = clause_end(raw, token_end, ceiling);

    &raw[start..end]
}

/// Drops survivors whose amount is a rate or base used in a computation.
#[derive(Debug, Clone)]
pub struct CalculationBaseFilter {
    patterns: Arc<Patterns>,
}

impl CalculationBaseFilter {
    pub fn new(patterns: Arc<Patterns>) -> Self {
        Self { patterns }
    }

    /// The first rule matching `item`'s description or amount clause.
    pub fn matching_rule(&self, item: &DamageItem) -> Option<&CalculationMatcher> {
        let clause = amount_clause(item);
        self.patterns
            .calculation_base
            .iter()
            .find(|rule| rule.is_match(item.description()) || rule.is_match(clause))
    }

    /// Keep items that match no rule. Returns the survivors and the number
    /// excluded.
    pub fn filter(&self, items: Vec<DamageItem>) -> (Vec<DamageItem>, usize) {
        let before = items.len();
        let kept: Vec<DamageItem> = items
            .into_iter()
            .filter(|item| match self.matching_rule(item) {
                Some(rule) => {
                    tracing::debug!(
                        amount = item.amount(),
                        rule = rule.as_str(),
                        "excluded calculation base"
                    );
                    false
                }
                None => true,
            })
            .collect();
        let excluded = before - kept.len();
        (kept, excluded)
    }
}
