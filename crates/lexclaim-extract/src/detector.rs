//! Layout detection: does this document list its claims as structured items?

use std::sync::Arc;

use lexclaim_core::Patterns;
use serde::Serialize;

use crate::text::lines_with_offsets;

/// The shape of a structured claim listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureKind {
    /// `1. 醫療費用：1,036元`, `（1）醫療費用：1,036元`
    NumberedList,
    /// `（一）醫療費用：43,795元`, `㈠醫療費用：43,795元`
    ChineseEnumerated,
    /// `（一）原告陳慶華之損害：` headers, items nested underneath.
    PlaintiffSections,
}

impl StructureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NumberedList => "numbered_list",
            Self::ChineseEnumerated => "chinese_enumerated",
            Self::PlaintiffSections => "plaintiff_sections",
        }
    }
}

/// Detected layout. Only a structured layout carries a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "layout", content = "kind", rename_all = "snake_case")]
pub enum Layout {
    Structured(StructureKind),
    Unstructured,
}

impl Layout {
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured(_))
    }

    pub fn kind(&self) -> Option<StructureKind> {
        match self {
            Self::Structured(kind) => Some(*kind),
            Self::Unstructured => None,
        }
    }
}

/// Detector output with the line counts behind the score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormatDetection {
    pub layout: Layout,
    pub confidence: f32,
    pub total_lines: usize,
    pub numbered_lines: usize,
    pub enumerated_lines: usize,
    pub header_lines: usize,
}

/// Scores how much of a document is laid out as claim items.
#[derive(Debug, Clone)]
pub struct FormatDetector {
    patterns: Arc<Patterns>,
}

impl FormatDetector {
    pub fn new(patterns: Arc<Patterns>) -> Self {
        Self { patterns }
    }

    /// Detect the layout of `text`.
    ///
    /// # Algorithm
    ///
    /// 1. Count non-blank lines, and among them item lines (numbered or
    ///    enumerated) and plaintiff section headers.
    /// 2. `ratio` = marker lines / non-blank lines.
    /// 3. `regularity` = share of numbered items whose ordinal is 1 or the
    ///    previous ordinal plus one (1.0 when there are none).
    /// 4. `confidence` = ratio × (0.5 + 0.5 × regularity), halved when fewer
    ///    than two markers were seen.
    /// 5. Structured iff confidence exceeds the configured threshold.
    pub fn detect(&self, text: &str) -> FormatDetection {
        let p = &self.patterns;
        let mut total_lines = 0;
        let mut numbered_lines = 0;
        let mut enumerated_lines = 0;
        let mut header_lines = 0;
        let mut regular = 0;
        let mut previous: Option<u32> = None;

        for (_, line) in lines_with_offsets(text) {
            if line.trim().is_empty() {
                continue;
            }
            total_lines += 1;

            if p.section_header.is_match(line) {
                header_lines += 1;
            } else if let Some(caps) = p.numbered_item.captures(line) {
                numbered_lines += 1;
                let ordinal = caps["ordinal"].parse::<u32>().ok();
                if let Some(n) = ordinal
                    && (n == 1 || previous.is_some_and(|prev| n == prev + 1))
                {
                    regular += 1;
                }
                previous = ordinal;
            } else if p.enumerated_item.is_match(line) {
                enumerated_lines += 1;
            }
        }

        let markers = numbered_lines + enumerated_lines + header_lines;
        let confidence = if total_lines == 0 || markers == 0 {
            0.0
        } else {
            let ratio = markers as f32 / total_lines as f32;
            let regularity = if numbered_lines == 0 {
                1.0
            } else {
                regular as f32 / numbered_lines as f32
            };
            let mut score = ratio * (0.5 + 0.5 * regularity);
            if markers < 2 {
                score *= 0.5;
            }
            score.clamp(0.0, 1.0)
        };

        let layout = if confidence > p.config().format_threshold {
            let kind = if header_lines > 0 {
                StructureKind::PlaintiffSections
            } else if enumerated_lines > numbered_lines {
                StructureKind::ChineseEnumerated
            } else {
                StructureKind::NumberedList
            };
            Layout::Structured(kind)
        } else {
            Layout::Unstructured
        };

        tracing::debug!(
            ?layout,
            confidence,
            total_lines,
            markers,
            "detected layout"
        );

        FormatDetection {
            layout,
            confidence,
            total_lines,
            numbered_lines,
            enumerated_lines,
            header_lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> FormatDetector {
        FormatDetector::new(Arc::new(Patterns::default()))
    }

    #[test]
    fn numbered_list_is_structured() {
        let text = "醫療費用項目如下：\n1. 急診掛號費50元\n2. 門診掛號費460元\n3. 醫療器材費5,000元\n";
        let d = detector().detect(text);
        assert_eq!(d.layout, Layout::Structured(StructureKind::NumberedList));
        assert_eq!(d.total_lines, 4);
        assert_eq!(d.numbered_lines, 3);
        assert!((d.confidence - 0.75).abs() < 1e-6);
    }

    #[test]
    fn plaintiff_sections() {
        let text = "（一）原告陳慶華之損害：\n1. 醫療費用：1,036元\n（二）原告朱庭慧之損害：\n1. 醫療費用：4,862元\n";
        let d = detector().detect(text);
        assert_eq!(d.layout, Layout::Structured(StructureKind::PlaintiffSections));
        assert_eq!(d.header_lines, 2);
        assert!((d.confidence - 1.0).abs() < 1e-6);
    }

    #[test]
    fn enumerated_items() {
        let text = "（一）醫療費用：43,795元\n（二）看護費用：246,000元\n";
        let d = detector().detect(text);
        assert_eq!(d.layout, Layout::Structured(StructureKind::ChineseEnumerated));
        assert_eq!(d.layout.kind().unwrap().as_str(), "chinese_enumerated");
    }

    #[test]
    fn parenthesised_and_circled_markers_count() {
        let d = detector().detect("（1）醫療費用：1,036元\n（2）交通費用：200元\n");
        assert_eq!(d.layout, Layout::Structured(StructureKind::NumberedList));
        assert_eq!(d.numbered_lines, 2);

        let d = detector().detect("㈠醫療費用：43,795元\n㈡看護費用：246,000元\n");
        assert_eq!(d.layout, Layout::Structured(StructureKind::ChineseEnumerated));
        assert_eq!(d.enumerated_lines, 2);

        let d = detector().detect("㈠原告陳慶華之損害：\n1 醫療費用 1,036元\n㈡原告朱庭慧之損害：\n1 醫療費用 4,862元\n");
        assert_eq!(d.layout, Layout::Structured(StructureKind::PlaintiffSections));
        assert_eq!(d.header_lines, 2);
        assert_eq!(d.numbered_lines, 2);
    }

    #[test]
    fn narrative_is_unstructured() {
        let text = "原告主張被告駕車不慎，致原告受傷，支出醫療費用1,036元，並請求精神慰撫金300,000元。";
        let d = detector().detect(text);
        assert_eq!(d.layout, Layout::Unstructured);
        assert_eq!(d.confidence, 0.0);
    }

    #[test]
    fn single_stray_item_is_unstructured() {
        let mut text = String::from("1. 醫療費用：1,036元\n");
        for _ in 0..5 {
            text.push_str("本件事故經過如下所述。\n");
        }
        let d = detector().detect(&text);
        assert_eq!(d.layout, Layout::Unstructured);
        assert!(d.confidence > 0.0);
    }

    #[test]
    fn irregular_numbering_lowers_confidence() {
        let regular = detector().detect("1. 醫療費用：100元\n2. 交通費用：200元\n");
        let irregular = detector().detect("5. 醫療費用：100元\n9. 交通費用：200元\n");
        assert!(irregular.confidence < regular.confidence);
    }

    #[test]
    fn empty_text() {
        let d = detector().detect("");
        assert_eq!(d.layout, Layout::Unstructured);
        assert_eq!(d.total_lines, 0);
    }

    #[test]
    fn layout_serializes_tagged() {
        let v = serde_json::to_value(Layout::Structured(StructureKind::NumberedList)).unwrap();
        assert_eq!(v["layout"], "structured");
        assert_eq!(v["kind"], "numbered_list");
    }
}
