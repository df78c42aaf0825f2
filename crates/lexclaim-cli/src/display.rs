//! Vertical card display for one document's extraction.
//!
//! Renders the detection, then one section per plaintiff with its claims and
//! subtotal, then the grand total and pipeline counters.

use std::io::{self, Write};

use lexclaim_core::{PlaintiffKey, format_amount};
use lexclaim_extract::{Extraction, FormatDetection, Layout};

const LABEL_WIDTH: usize = 14;
const MAX_EVIDENCE_CHARS: usize = 40;

// ── Public API ──

/// Print an extraction as a card grouped by plaintiff.
pub fn print_claim_card(title: &str, extraction: &Extraction) -> io::Result<()> {
    write_claim_card(&mut io::stdout().lock(), title, extraction)
}

/// Print a detection result on its own.
pub fn print_detection(title: &str, detection: &FormatDetection) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "=== {title} ===")?;
    write_detection(&mut out, detection)
}

pub fn write_claim_card(out: &mut impl Write, title: &str, extraction: &Extraction) -> io::Result<()> {
    writeln!(out, "=== {title} ===")?;
    write_detection(out, &extraction.detection)?;

    let groups = extraction.groups();
    if groups.is_empty() {
        writeln!(out, "No claims found.")?;
        writeln!(out)?;
    }
    for group in &groups.groups {
        writeln!(out, "{}", plaintiff_header(&group.plaintiff))?;
        for record in &group.items {
            writeln!(
                out,
                "  {:<width$} {:>12}元  {}",
                record.claim_type.label_zh(),
                format_amount(record.amount),
                record.description,
                width = LABEL_WIDTH
            )?;
        }
        writeln!(
            out,
            "  {:<width$} {:>12}元",
            "小計",
            format_amount(group.subtotal()),
            width = LABEL_WIDTH
        )?;
        writeln!(out)?;
    }

    write_evidence(out, extraction)?;
    write_totals(out, extraction)
}

// ── Section rendering ──

fn plaintiff_header(plaintiff: &PlaintiffKey) -> String {
    match plaintiff {
        PlaintiffKey::Named(name) => format!("原告{name}"),
        PlaintiffKey::General => "未指明原告".to_string(),
        PlaintiffKey::Default => "原告".to_string(),
    }
}

fn write_detection(out: &mut impl Write, detection: &FormatDetection) -> io::Result<()> {
    let layout = match detection.layout {
        Layout::Structured(kind) => format!("structured ({})", kind.as_str()),
        Layout::Unstructured => "unstructured".to_string(),
    };
    writeln!(out, "Detection")?;
    writeln!(out, "  {:<18} {layout}", "layout")?;
    writeln!(out, "  {:<18} {:.2}", "confidence", detection.confidence)?;
    writeln!(
        out,
        "  {:<18} {} numbered, {} enumerated, {} headers / {} lines",
        "markers",
        detection.numbered_lines,
        detection.enumerated_lines,
        detection.header_lines,
        detection.total_lines
    )?;
    writeln!(out)
}

fn write_evidence(out: &mut impl Write, extraction: &Extraction) -> io::Result<()> {
    if extraction.items.is_empty() {
        return Ok(());
    }
    writeln!(out, "Evidence")?;
    for item in &extraction.items {
        writeln!(
            out,
            "  {:>12}元  {:.1}  {:<5}  {}",
            format_amount(item.amount()),
            item.confidence(),
            format!("{:?}", item.origin()).to_lowercase(),
            truncate(item.raw_text(), MAX_EVIDENCE_CHARS)
        )?;
    }
    writeln!(out)
}

fn write_totals(out: &mut impl Write, extraction: &Extraction) -> io::Result<()> {
    let stats = &extraction.stats;
    writeln!(out, "Totals")?;
    writeln!(out, "  {:<18} {}元", "compensation", format_amount(extraction.total()))?;
    writeln!(out, "  {:<18} {}", "claims", stats.survivors)?;
    writeln!(
        out,
        "  {:<18} {} format, {} mixed",
        "candidates", stats.format_candidates, stats.mixed_candidates
    )?;
    writeln!(out, "  {:<18} {}", "merged", stats.merged)?;
    writeln!(out, "  {:<18} {}", "calculation bases", stats.calculation_bases)?;
    if stats.rejected > 0 {
        writeln!(out, "  {:<18} {}", "rejected", stats.rejected)?;
    }
    Ok(())
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((i, _)) => format!("{}…", &s[..i]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexclaim_extract::ClaimExtractor;

    fn render_claim_card(title: &str, extraction: &Extraction) -> String {
        let mut buf = Vec::new();
        write_claim_card(&mut buf, title, extraction).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn card_groups_by_plaintiff() {
        let text = "（一）原告陳慶華之損害：\n1. 醫療費用：1,036元\n（二）原告朱庭慧之損害：\n1. 醫療費用：4,862元\n";
        let out = ClaimExtractor::default().extract(text);
        let card = render_claim_card("case-1", &out);

        assert!(card.starts_with("=== case-1 ===\n"));
        assert!(card.contains("structured (plaintiff_sections)"));
        let chen = card.find("原告陳慶華").unwrap();
        let zhu = card.find("原告朱庭慧").unwrap();
        assert!(chen < zhu);
        assert!(card.contains("5,898元"));
    }

    #[test]
    fn empty_card() {
        let out = ClaimExtractor::default().extract("本件無損害賠償請求。");
        let card = render_claim_card("empty", &out);
        assert!(card.contains("No claims found."));
        assert!(card.contains("unstructured"));
    }

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("甲乙丙", 2), "甲乙…");
        assert_eq!(truncate("甲乙", 2), "甲乙");
    }
}
