//! Attributing claims to plaintiffs.
//!
//! Resolution runs an ordered list of [`PlaintiffStrategy`] implementations
//! and takes the first name one of them produces. Documents with a single
//! plaintiff skip the strategies entirely and attribute every claim to
//! [`PlaintiffKey::Default`].

use std::collections::BTreeSet;
use std::ops::Range;
use std::sync::Arc;

use lexclaim_core::patterns::is_han;
use lexclaim_core::{Patterns, PlaintiffKey};

use crate::text::lines_with_offsets;

/// Longest Han run considered in front of a possessive `之`.
const POSSESSIVE_LOOKBACK: usize = 6;

/// A `（一）原告陳慶華之損害：` header and the byte range it governs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHeader {
    /// Start of the header line; doubles as the section identifier.
    pub offset: usize,
    /// Text from the header up to the next header, the next top-level
    /// heading, or the end of the document.
    pub scope: Range<usize>,
    /// The header's plaintiff name, if it is plausible.
    pub name: Option<String>,
}

/// Document-wide facts gathered once before any claim is resolved.
#[derive(Debug, Clone, Default)]
pub struct DocumentContext {
    pub headers: Vec<SectionHeader>,
    /// Distinct plausible names from section headers and from `原告<name>`
    /// mentions closed by punctuation.
    pub names: BTreeSet<String>,
}

impl DocumentContext {
    pub fn scan(text: &str, patterns: &Patterns) -> Self {
        let mut starts: Vec<(usize, Option<String>)> = Vec::new();
        let mut closers: Vec<usize> = Vec::new();

        for (offset, line) in lines_with_offsets(text) {
            if let Some(caps) = patterns.section_header.captures(line) {
                let name = caps
                    .name("name")
                    .map(|m| m.as_str())
                    .filter(|n| patterns.is_plausible_name(n))
                    .map(str::to_string);
                starts.push((offset, name));
            } else if patterns.top_level_heading.is_match(line) {
                closers.push(offset);
            }
        }

        let headers = starts
            .iter()
            .enumerate()
            .map(|(i, (offset, name))| {
                let next_header = starts.get(i + 1).map_or(text.len(), |(o, _)| *o);
                let next_closer = closers
                    .iter()
                    .copied()
                    .find(|&c| c > *offset)
                    .unwrap_or(text.len());
                SectionHeader {
                    offset: *offset,
                    scope: *offset..next_header.min(next_closer),
                    name: name.clone(),
                }
            })
            .collect::<Vec<_>>();

        let mut names: BTreeSet<String> = patterns
            .plaintiff_mention
            .captures_iter(text)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .filter(|n| patterns.is_plausible_name(n))
            .map(str::to_string)
            .collect();
        names.extend(headers.iter().filter_map(|h| h.name.clone()));

        Self { headers, names }
    }

    /// Whether the document enumerates more than one plaintiff.
    pub fn is_multi_plaintiff(&self) -> bool {
        !self.headers.is_empty() || self.names.len() >= 2
    }

    /// The section whose scope contains `offset`.
    pub fn section_at(&self, offset: usize) -> Option<&SectionHeader> {
        self.headers
            .iter()
            .rev()
            .find(|h| h.scope.contains(&offset))
    }
}

/// Everything a strategy may look at for one claim.
pub struct Lookup<'a> {
    /// Evidence text from the start of the sentence up to the amount.
    pub before: &'a str,
    /// Byte offset of the amount in the document.
    pub offset: usize,
    pub context: &'a DocumentContext,
    pub patterns: &'a Patterns,
}

/// One way of finding the plaintiff a claim belongs to.
pub trait PlaintiffStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn resolve(&self, lookup: &Lookup<'_>) -> Option<String>;
}

/// The last name introduced before the amount, as in `原告陳慶華因…支出醫療費用`.
pub struct ExplicitName;

impl PlaintiffStrategy for ExplicitName {
    fn name(&self) -> &'static str {
        "explicit_name"
    }

    fn resolve(&self, lookup: &Lookup<'_>) -> Option<String> {
        lookup
            .patterns
            .explicit_name
            .captures_iter(lookup.before)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .filter(|n| lookup.patterns.is_plausible_name(n))
            .last()
            .map(str::to_string)
    }
}

/// The name in front of a possessive claim term, as in `陳慶華之醫療費用`.
pub struct Possessive;

impl PlaintiffStrategy for Possessive {
    fn name(&self) -> &'static str {
        "possessive"
    }

    fn resolve(&self, lookup: &Lookup<'_>) -> Option<String> {
        let re = lookup.patterns.possessive.as_ref()?;
        re.find_iter(lookup.before)
            .filter_map(|m| possessor(&lookup.before[..m.start()]))
            .filter(|n| lookup.patterns.is_plausible_name(n))
            .last()
    }
}

/// The Han run ending right before a possessive `之`, minus a `原告` prefix.
fn possessor(prefix: &str) -> Option<String> {
    let mut run: Vec<char> = prefix
        .chars()
        .rev()
        .take_while(|&c| is_han(c))
        .take(POSSESSIVE_LOOKBACK)
        .collect();
    run.reverse();
    let run: String = run.into_iter().collect();
    let run = run.strip_prefix("原告").unwrap_or(&run);
    let chars: Vec<char> = run.chars().collect();
    match chars.len() {
        0 | 1 => None,
        2..=4 => Some(run.to_string()),
        n => Some(chars[n - 3..].iter().collect()),
    }
}

/// The nearest enclosing `（一）原告陳慶華之損害：` header.
pub struct EnclosingSection;

impl PlaintiffStrategy for EnclosingSection {
    fn name(&self) -> &'static str {
        "section_header"
    }

    fn resolve(&self, lookup: &Lookup<'_>) -> Option<String> {
        lookup
            .context
            .section_at(lookup.offset)
            .and_then(|h| h.name.clone())
    }
}

/// Resolves the plaintiff for each claim candidate.
pub struct PlaintiffContextResolver {
    patterns: Arc<Patterns>,
    strategies: Vec<Box<dyn PlaintiffStrategy>>,
}

impl PlaintiffContextResolver {
    /// Explicit name, then possessive, then enclosing section.
    pub fn new(patterns: Arc<Patterns>) -> Self {
        Self::with_strategies(
            patterns,
            vec![
                Box::new(ExplicitName),
                Box::new(Possessive),
                Box::new(EnclosingSection),
            ],
        )
    }

    pub fn with_strategies(
        patterns: Arc<Patterns>,
        strategies: Vec<Box<dyn PlaintiffStrategy>>,
    ) -> Self {
        Self {
            patterns,
            strategies,
        }
    }

    /// Resolve the plaintiff for an amount at `offset` whose evidence sentence
    /// occupies `evidence` in `text`.
    pub fn resolve(
        &self,
        context: &DocumentContext,
        text: &str,
        evidence: &Range<usize>,
        offset: usize,
    ) -> PlaintiffKey {
        if !context.is_multi_plaintiff() {
            return PlaintiffKey::Default;
        }

        let lookup = Lookup {
            before: &text[evidence.start..offset],
            offset,
            context,
            patterns: &self.patterns,
        };
        for strategy in &self.strategies {
            if let Some(name) = strategy.resolve(&lookup) {
                tracing::trace!(strategy = strategy.name(), %name, offset, "resolved plaintiff");
                return PlaintiffKey::Named(name);
            }
        }
        PlaintiffKey::General
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_SECTIONS: &str = "（一）原告陳慶華之損害：\n1. 醫療費用：1,036元\n（二）原告朱庭慧之損害：\n1. 醫療費用：4,862元\n三、其他\n另支出費用2,000元\n";

    fn resolver() -> (Arc<Patterns>, PlaintiffContextResolver) {
        let p = Arc::new(Patterns::default());
        (p.clone(), PlaintiffContextResolver::new(p))
    }

    fn resolve_at(text: &str, needle: &str) -> PlaintiffKey {
        let (p, r) = resolver();
        let ctx = DocumentContext::scan(text, &p);
        let offset = text.find(needle).unwrap();
        let sentence = crate::text::sentence_at(text, offset);
        r.resolve(&ctx, text, &sentence, offset)
    }

    #[test]
    fn scan_finds_headers_and_scopes() {
        let p = Patterns::default();
        let ctx = DocumentContext::scan(TWO_SECTIONS, &p);
        assert_eq!(ctx.headers.len(), 2);
        assert_eq!(ctx.headers[0].name.as_deref(), Some("陳慶華"));
        assert_eq!(ctx.headers[0].scope.end, ctx.headers[1].offset);
        let closer = TWO_SECTIONS.find("三、").unwrap();
        assert_eq!(ctx.headers[1].scope.end, closer);
        assert!(ctx.is_multi_plaintiff());
    }

    #[test]
    fn section_header_attribution() {
        assert_eq!(resolve_at(TWO_SECTIONS, "1,036"), PlaintiffKey::Named("陳慶華".into()));
        assert_eq!(resolve_at(TWO_SECTIONS, "4,862"), PlaintiffKey::Named("朱庭慧".into()));
    }

    #[test]
    fn top_level_heading_closes_section() {
        assert_eq!(resolve_at(TWO_SECTIONS, "2,000"), PlaintiffKey::General);
    }

    #[test]
    fn explicit_name_beats_section() {
        let text = "（一）原告陳慶華之損害：\n原告朱庭慧因本次事故支出醫療費用500元。\n";
        assert_eq!(resolve_at(text, "500"), PlaintiffKey::Named("朱庭慧".into()));
    }

    #[test]
    fn possessive_name() {
        let text = "原告陳慶華、原告朱庭慧，因車禍受傷。陳慶華之醫療費用為1,036元。";
        assert_eq!(resolve_at(text, "1,036"), PlaintiffKey::Named("陳慶華".into()));
    }

    #[test]
    fn possessor_strips_plaintiff_prefix() {
        assert_eq!(possessor("（一）原告陳慶華").as_deref(), Some("陳慶華"));
        assert_eq!(possessor("本件原告所受").as_deref(), Some("告所受"));
        assert_eq!(possessor("，").as_deref(), None);
    }

    #[test]
    fn single_plaintiff_defaults() {
        let text = "原告因本次事故支出醫療費用1,036元。";
        assert_eq!(resolve_at(text, "1,036"), PlaintiffKey::Default);

        // One named plaintiff is still a single-plaintiff document.
        let text = "原告陳慶華因本次事故支出醫療費用1,036元。";
        assert_eq!(resolve_at(text, "1,036"), PlaintiffKey::Default);
    }

    #[test]
    fn multi_plaintiff_without_name_is_general() {
        let text = "原告陳慶華、原告朱庭慧，因車禍受傷。另支出費用2,000元。";
        assert_eq!(resolve_at(text, "2,000"), PlaintiffKey::General);
    }

    #[test]
    fn only_punctuated_mentions_count_as_plaintiffs() {
        let p = Patterns::default();
        let ctx = DocumentContext::scan("原告陳慶華因車禍受傷，原告林美就醫治療。", &p);
        assert!(ctx.names.is_empty());
        assert!(!ctx.is_multi_plaintiff());

        let ctx = DocumentContext::scan("原告陳慶華、原告朱庭慧，因車禍受傷。", &p);
        assert_eq!(ctx.names.iter().map(String::as_str).collect::<Vec<_>>(), vec!["朱庭慧", "陳慶華"]);
        assert!(ctx.is_multi_plaintiff());
    }

    #[test]
    fn pronoun_and_adverb_fragments_are_not_names() {
        let text = "原告陳慶華因車禍受傷，原告自行支付醫療費用1,000元。";
        assert_eq!(resolve_at(text, "1,000"), PlaintiffKey::Default);

        let text = "原告二人，因車禍受傷。原告自行支付醫療費用1,000元。";
        let p = Patterns::default();
        assert!(DocumentContext::scan(text, &p).names.is_empty());

        let text = "原告陳慶華、原告朱庭慧，因車禍受傷。原告二人因此請求精神慰撫金200,000元。";
        assert_eq!(resolve_at(text, "200,000"), PlaintiffKey::General);
    }

    #[test]
    fn custom_strategy_order() {
        let p = Arc::new(Patterns::default());
        let r = PlaintiffContextResolver::with_strategies(p.clone(), vec![Box::new(EnclosingSection)]);
        let text = "（一）原告陳慶華之損害：\n原告朱庭慧因本次事故支出醫療費用500元。\n";
        let ctx = DocumentContext::scan(text, &p);
        let offset = text.find("500").unwrap();
        let sentence = crate::text::sentence_at(text, offset);
        assert_eq!(
            r.resolve(&ctx, text, &sentence, offset),
            PlaintiffKey::Named("陳慶華".into())
        );
    }
}
