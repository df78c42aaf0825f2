//! Line-anchored extraction for structured claim listings.

use std::sync::Arc;

use lexclaim_core::{DamageItem, Evidence, Origin, Patterns, parse_amount};
use regex::Regex;

use crate::classify::{classify, is_total_line};
use crate::detector::{FormatDetection, StructureKind};
use crate::harvest::Harvest;
use crate::plaintiff::{DocumentContext, PlaintiffContextResolver};
use crate::text::{clean_label, lines_with_offsets, trim_range};

/// Extracts one claim per item line of a structured document.
#[derive(Debug, Clone)]
pub struct FormatBasedExtractor {
    patterns: Arc<Patterns>,
}

impl FormatBasedExtractor {
    pub fn new(patterns: Arc<Patterns>) -> Self {
        Self { patterns }
    }

    fn item_patterns(&self, kind: StructureKind) -> Vec<&Regex> {
        let p = &self.patterns;
        match kind {
            StructureKind::NumberedList => vec![&p.numbered_item],
            StructureKind::ChineseEnumerated => vec![&p.enumerated_item],
            StructureKind::PlaintiffSections => vec![&p.numbered_item, &p.enumerated_item],
        }
    }

    /// Extract item lines. Unstructured documents yield nothing.
    ///
    /// Each candidate's evidence is its trimmed line; the description is the
    /// item label. Labels without any claim keyword are not claims, and
    /// labels that only announce a total are skipped.
    pub fn extract(
        &self,
        text: &str,
        detection: &FormatDetection,
        context: &DocumentContext,
        resolver: &PlaintiffContextResolver,
    ) -> Harvest {
        let mut harvest = Harvest::default();
        let Some(kind) = detection.layout.kind() else {
            return harvest;
        };
        let item_patterns = self.item_patterns(kind);
        let confidence = self.patterns.config().format_confidence;

        for (line_start, line) in lines_with_offsets(text) {
            let Some(caps) = item_patterns.iter().find_map(|re| re.captures(line)) else {
                continue;
            };
            let (Some(label), Some(digits)) = (caps.name("label"), caps.name("amount")) else {
                continue;
            };
            let label = clean_label(label.as_str());

            if is_total_line(&self.patterns, label) {
                harvest.totals += 1;
                continue;
            }
            let Some(class) = classify(&self.patterns, label) else {
                harvest.unclassified += 1;
                continue;
            };
            let Some(amount) = parse_amount(digits.as_str()) else {
                harvest.unparsed += 1;
                continue;
            };

            let span = trim_range(text, line_start..line_start + line.len());
            let offset = line_start + digits.start();
            let plaintiff = resolver.resolve(context, text, &span, offset);
            let evidence = Evidence {
                raw_text: text[span.clone()].to_string(),
                span,
                offset,
                section: context.section_at(offset).map(|h| h.offset),
            };
            harvest.push(DamageItem::new(
                class.claim_type,
                amount,
                label,
                evidence,
                confidence,
                plaintiff,
                Origin::Format,
            ));
        }

        tracing::debug!(
            kind = kind.as_str(),
            candidates = harvest.items.len(),
            totals = harvest.totals,
            "format extraction"
        );
        harvest
    }
}
