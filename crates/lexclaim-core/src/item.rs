//! Shared claim types produced by the extractors and consumed by grouping.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::amount::contains_amount;
use crate::error::ClaimError;

/// Longest description kept on an item, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 30;

/// Damage category of a claim.
///
/// The built-in tags each map to a keyword family in
/// [`PatternConfig`](crate::PatternConfig). A custom keyword table may
/// introduce further tags, which parse as [`ClaimType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ClaimType {
    MedicalExpense,
    Transportation,
    LostIncome,
    NursingCare,
    PropertyDamage,
    ConsolationMoney,
    FutureMedical,
    General,
    Other(String),
}

impl ClaimType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::MedicalExpense => "medical_expense",
            Self::Transportation => "transportation",
            Self::LostIncome => "lost_income",
            Self::NursingCare => "nursing_care",
            Self::PropertyDamage => "property_damage",
            Self::ConsolationMoney => "consolation_money",
            Self::FutureMedical => "future_medical",
            Self::General => "general",
            Self::Other(tag) => tag,
        }
    }

    /// Heading used when the claim is written back as Chinese prose.
    pub fn label_zh(&self) -> &str {
        match self {
            Self::MedicalExpense => "醫療費用",
            Self::Transportation => "交通費用",
            Self::LostIncome => "工作損失",
            Self::NursingCare => "看護費用",
            Self::PropertyDamage => "財產損失",
            Self::ConsolationMoney => "精神慰撫金",
            Self::FutureMedical => "將來醫療費用",
            Self::General => "其他費用",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for ClaimType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "medical_expense" => Self::MedicalExpense,
            "transportation" => Self::Transportation,
            "lost_income" => Self::LostIncome,
            "nursing_care" => Self::NursingCare,
            "property_damage" => Self::PropertyDamage,
            "consolation_money" => Self::ConsolationMoney,
            "future_medical" => Self::FutureMedical,
            "general" => Self::General,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for ClaimType {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<ClaimType> for String {
    fn from(t: ClaimType) -> Self {
        match t {
            ClaimType::Other(tag) => tag,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ClaimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which plaintiff a claim is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum PlaintiffKey {
    /// A specific plaintiff name resolved from the text.
    Named(String),
    /// The document enumerates plaintiffs but this amount could not be tied to one.
    General,
    /// Single-plaintiff document; no enumeration anywhere.
    Default,
}

impl PlaintiffKey {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::General => "general",
            Self::Default => "default",
        }
    }

    pub fn is_named(&self) -> bool {
        matches!(self, Self::Named(_))
    }
}

impl From<String> for PlaintiffKey {
    fn from(s: String) -> Self {
        match s.as_str() {
            "general" => Self::General,
            "default" => Self::Default,
            _ => Self::Named(s),
        }
    }
}

impl From<PlaintiffKey> for String {
    fn from(k: PlaintiffKey) -> Self {
        match k {
            PlaintiffKey::Named(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for PlaintiffKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The extractor that produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Structural match on a numbered or enumerated item line.
    Format,
    /// Keyword/amount co-occurrence anywhere in the prose.
    Mixed,
}

/// Where an amount was found in its source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evidence {
    /// The matched line or sentence.
    pub raw_text: String,
    /// Byte range of `raw_text` within the document.
    pub span: Range<usize>,
    /// Byte offset of the amount token within the document.
    pub offset: usize,
    /// Byte offset of the enclosing plaintiff section header, if any.
    pub section: Option<usize>,
}

/// One claimed or candidate monetary amount.
///
/// Only constructible through [`DamageItem::new`], which enforces the model
/// invariants. Items are never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DamageItem {
    #[serde(rename = "type")]
    claim_type: ClaimType,
    amount: u64,
    description: String,
    raw_text: String,
    confidence: f32,
    plaintiff_context: PlaintiffKey,
    origin: Origin,
    span: Range<usize>,
    offset: usize,
    section: Option<usize>,
}

impl DamageItem {
    /// Validate and build an item.
    ///
    /// `description` is trimmed and truncated to [`MAX_DESCRIPTION_CHARS`].
    pub fn new(
        claim_type: ClaimType,
        amount: u64,
        description: &str,
        evidence: Evidence,
        confidence: f32,
        plaintiff_context: PlaintiffKey,
        origin: Origin,
    ) -> Result<Self, ClaimError> {
        if amount == 0 {
            return Err(ClaimError::NonPositiveAmount(amount));
        }
        if evidence.raw_text.trim().is_empty() {
            return Err(ClaimError::EmptyEvidence);
        }
        if !contains_amount(&evidence.raw_text, amount) {
            return Err(ClaimError::AmountNotInEvidence {
                amount,
                raw_text: evidence.raw_text,
            });
        }
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ClaimError::ConfidenceOutOfRange(confidence));
        }

        let description: String = description
            .trim()
            .chars()
            .take(MAX_DESCRIPTION_CHARS)
            .collect();

        Ok(Self {
            claim_type,
            amount,
            description,
            raw_text: evidence.raw_text,
            confidence,
            plaintiff_context,
            origin,
            span: evidence.span,
            offset: evidence.offset,
            section: evidence.section,
        })
    }

    pub fn claim_type(&self) -> &ClaimType {
        &self.claim_type
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn plaintiff(&self) -> &PlaintiffKey {
        &self.plaintiff_context
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn span(&self) -> &Range<usize> {
        &self.span
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn section(&self) -> Option<usize> {
        self.section
    }

    /// Byte index of the amount token inside `raw_text`.
    ///
    /// Falls back to the end of `raw_text` when the offset lies outside the
    /// span, which only happens for hand-built evidence.
    pub fn local_offset(&self) -> usize {
        self.offset
            .checked_sub(self.span.start)
            .filter(|&i| i <= self.raw_text.len() && self.raw_text.is_char_boundary(i))
            .unwrap_or(self.raw_text.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Evidence spanning the whole of `raw`, with the amount at the last digit run.
    fn evidence(raw: &str) -> Evidence {
        let offset = raw
            .char_indices()
            .filter(|(_, c)| !(c.is_ascii_digit() || *c == ','))
            .map(|(i, c)| i + c.len_utf8())
            .filter(|&end| raw[end..].starts_with(|c: char| c.is_ascii_digit()))
            .last()
            .unwrap_or(0);
        Evidence {
            raw_text: raw.to_string(),
            span: 0..raw.len(),
            offset,
            section: None,
        }
    }

    fn item(amount: u64, raw: &str, confidence: f32) -> Result<DamageItem, ClaimError> {
        DamageItem::new(
            ClaimType::MedicalExpense,
            amount,
            "醫療費用",
            evidence(raw),
            confidence,
            PlaintiffKey::Default,
            Origin::Format,
        )
    }

    #[test]
    fn builds_valid_item() {
        let it = item(1036, "1. 醫療費用：1,036元", 0.8).unwrap();
        assert_eq!(it.amount(), 1036);
        assert_eq!(it.plaintiff(), &PlaintiffKey::Default);
        assert_eq!(&it.raw_text()[it.local_offset()..], "1,036元");
    }

    #[test]
    fn rejects_zero_amount() {
        assert_eq!(
            item(0, "醫療費用0元", 0.8),
            Err(ClaimError::NonPositiveAmount(0))
        );
    }

    #[test]
    fn rejects_empty_evidence() {
        assert_eq!(item(10, "  ", 0.8), Err(ClaimError::EmptyEvidence));
    }

    #[test]
    fn rejects_amount_missing_from_evidence() {
        assert!(matches!(
            item(4862, "醫療費用1,036元", 0.8),
            Err(ClaimError::AmountNotInEvidence { amount: 4862, .. })
        ));
    }

    #[test]
    fn rejects_confidence_out_of_range() {
        assert!(matches!(
            item(1036, "1,036元", 1.5),
            Err(ClaimError::ConfidenceOutOfRange(_))
        ));
        assert!(matches!(
            item(1036, "1,036元", f32::NAN),
            Err(ClaimError::ConfidenceOutOfRange(_))
        ));
    }

    #[test]
    fn truncates_description() {
        let long = "原告因本次事故受傷而前往醫院就醫治療並持續復健長達數月之久所支出之各項醫療相關費用";
        let it = DamageItem::new(
            ClaimType::MedicalExpense,
            50,
            long,
            evidence("掛號費50元"),
            0.6,
            PlaintiffKey::Default,
            Origin::Mixed,
        )
        .unwrap();
        assert_eq!(it.description().chars().count(), MAX_DESCRIPTION_CHARS);
    }

    #[test]
    fn claim_type_string_roundtrip() {
        for t in [
            ClaimType::MedicalExpense,
            ClaimType::FutureMedical,
            ClaimType::General,
            ClaimType::Other("funeral".into()),
        ] {
            let s: String = t.clone().into();
            assert_eq!(ClaimType::from(s), t);
        }
    }

    #[test]
    fn plaintiff_key_serializes_as_plain_string() {
        let json = serde_json::to_string(&PlaintiffKey::Named("陳慶華".into())).unwrap();
        assert_eq!(json, "\"陳慶華\"");
        let back: PlaintiffKey = serde_json::from_str("\"general\"").unwrap();
        assert_eq!(back, PlaintiffKey::General);
    }

    #[test]
    fn item_json_uses_type_field() {
        let it = item(1036, "1. 醫療費用：1,036元", 0.8).unwrap();
        let v = serde_json::to_value(&it).unwrap();
        assert_eq!(v["type"], "medical_expense");
        assert_eq!(v["plaintiff_context"], "default");
        assert_eq!(v["origin"], "format");
    }
}
