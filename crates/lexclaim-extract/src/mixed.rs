//! Keyword/amount co-occurrence extraction over free prose.

use std::ops::Range;
use std::sync::Arc;

use lexclaim_core::{DamageItem, Evidence, Origin, Patterns, parse_amount};

use crate::classify::{Classification, MatchStrength, classify_generic, classify_specific, is_total_line};
use crate::harvest::Harvest;
use crate::plaintiff::{DocumentContext, PlaintiffContextResolver};
use crate::text::{back_chars, clause_end, clause_start, clean_label, sentence_at};

/// One `<amount>元` occurrence.
#[derive(Debug, Clone)]
struct AmountToken {
    /// Amount and `元`.
    whole: Range<usize>,
    digits: Range<usize>,
}

/// Whether the token at `start` is the tail of a longer number (`1.5元`,
/// `12,3456元`, `五萬4,741元`), which the amount grammar cannot express.
fn continues_number(text: &str, start: usize) -> bool {
    let mut before = text[..start].chars().rev();
    match before.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some(',' | '.' | '．') => before.next().is_some_and(|c| c.is_ascii_digit()),
        Some('萬' | '万' | '千' | '仟') => true,
        Some(c) if c.is_whitespace() => text[..start]
            .trim_end()
            .ends_with(['萬', '万', '千', '仟']),
        _ => false,
    }
}

/// Extracts claims from every amount mentioned in the document.
#[derive(Debug, Clone)]
pub struct MixedStrategyExtractor {
    patterns: Arc<Patterns>,
}

impl MixedStrategyExtractor {
    pub fn new(patterns: Arc<Patterns>) -> Self {
        Self { patterns }
    }

    fn tokens(&self, text: &str) -> Vec<AmountToken> {
        self.patterns
            .amount
            .captures_iter(text)
            .filter_map(|c| {
                Some(AmountToken {
                    whole: c.get(0)?.range(),
                    digits: c.name("amount")?.range(),
                })
            })
            .filter(|t| !continues_number(text, t.whole.start))
            .collect()
    }

    /// Classify the context around one amount.
    ///
    /// Scopes are tried nearest first: the clause before the amount, the
    /// sentence window before it, then the clause after it. A family term in
    /// any scope beats a generic term in any scope.
    fn classify_context(&self, scopes: [&str; 3]) -> Option<Classification> {
        scopes
            .iter()
            .find_map(|s| classify_specific(&self.patterns, s))
            .or_else(|| scopes.iter().find_map(|s| classify_generic(&self.patterns, s)))
    }

    /// Extract a candidate for every classifiable amount in `text`.
    ///
    /// Evidence is the enclosing sentence. The description is the clause
    /// leading up to the amount, or the sentence text since the previous
    /// amount when that clause is empty (`醫療費用：1,036元`).
    pub fn extract(
        &self,
        text: &str,
        context: &DocumentContext,
        resolver: &PlaintiffContextResolver,
    ) -> Harvest {
        let cfg = self.patterns.config();
        let tokens = self.tokens(text);
        let mut harvest = Harvest::default();

        for (i, token) in tokens.iter().enumerate() {
            let sentence = sentence_at(text, token.digits.start);
            if token.whole.end > sentence.end {
                continue;
            }
            let floor = i
                .checked_sub(1)
                .map_or(sentence.start, |j| tokens[j].whole.end.max(sentence.start));
            let ceiling = tokens
                .get(i + 1)
                .map_or(sentence.end, |t| t.whole.start.min(sentence.end))
                .max(token.whole.end);

            let before = &text[clause_start(text, floor, token.digits.start)..token.digits.start];
            let window_start = back_chars(text, sentence.start, token.digits.start, cfg.keyword_window);
            let window = &text[window_start..token.digits.start];
            let after = &text[token.whole.end..clause_end(text, token.whole.end, ceiling)];

            if is_total_line(&self.patterns, before) {
                harvest.totals += 1;
                continue;
            }
            let Some(class) = self.classify_context([before, window, after]) else {
                tracing::trace!(offset = token.digits.start, "amount without claim keyword");
                harvest.unclassified += 1;
                continue;
            };
            let Some(amount) = parse_amount(&text[token.digits.clone()]) else {
                harvest.unparsed += 1;
                continue;
            };

            let description = match clean_label(before) {
                "" => clean_label(&text[floor..token.digits.start]),
                label => label,
            };
            let confidence = match class.strength {
                MatchStrength::Specific => cfg.mixed_specific_confidence,
                MatchStrength::Generic => cfg.mixed_generic_confidence,
            };
            let offset = token.digits.start;
            let plaintiff = resolver.resolve(context, text, &sentence, offset);
            let evidence = Evidence {
                raw_text: text[sentence.clone()].to_string(),
                span: sentence,
                offset,
                section: context.section_at(offset).map(|h| h.offset),
            };
            harvest.push(DamageItem::new(
                class.claim_type,
                amount,
                description,
                evidence,
                confidence,
                plaintiff,
                Origin::Mixed,
            ));
        }

        tracing::debug!(
            tokens = tokens.len(),
            candidates = harvest.items.len(),
            unclassified = harvest.unclassified,
            "mixed extraction"
        );
        harvest
    }
}
