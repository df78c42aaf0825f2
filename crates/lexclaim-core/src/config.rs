//! Keyword and pattern tables that drive extraction.
//!
//! Every table is ordered: keyword families are tried first-to-last and the
//! first match wins, calculation-base rules are tried in order and the first
//! match excludes. The built-in tables target Traditional-Chinese
//! personal-injury pleadings; a different jurisdiction or locale supplies its
//! own tables through [`PatternConfig::from_path`] without touching the engine.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::item::ClaimType;

/// Trigger phrases for one damage category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordFamily {
    pub claim_type: ClaimType,
    pub terms: Vec<String>,
}

/// One entry of the calculation-base table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "pattern", rename_all = "snake_case")]
pub enum CalculationRule {
    /// Substring match.
    Literal(String),
    /// Regular expression, compiled once by [`crate::Patterns::compile`].
    Regex(String),
}

/// Immutable extraction configuration.
///
/// Missing fields in a JSON override fall back to the built-in defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Claim families, most specific first.
    pub claim_families: Vec<KeywordFamily>,
    /// Generic damage words that make an amount a claim of type `general`.
    pub generic_terms: Vec<String>,
    /// Words marking a sum of other amounts rather than a claim.
    pub total_markers: Vec<String>,
    /// Computation-basis phrases; any match excludes the item.
    pub calculation_base: Vec<CalculationRule>,
    /// Claim nouns that follow `<name>之` in a possessive attribution.
    pub possessive_terms: Vec<String>,
    /// Fragments that disqualify a captured plaintiff name.
    pub name_stopwords: Vec<String>,
    /// Detector confidence that must be exceeded for structural extraction.
    pub format_threshold: f32,
    /// Confidence assigned to structural matches.
    pub format_confidence: f32,
    /// Confidence for prose matches on a specific family term.
    pub mixed_specific_confidence: f32,
    /// Confidence for prose matches on a generic term only.
    pub mixed_generic_confidence: f32,
    /// How far (in characters) before an amount a keyword may sit.
    pub keyword_window: usize,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn family(claim_type: ClaimType, terms: &[&str]) -> KeywordFamily {
    KeywordFamily {
        claim_type,
        terms: strings(terms),
    }
}

impl Default for PatternConfig {
    fn default() -> Self {
        use CalculationRule::{Literal, Regex};

        Self {
            claim_families: vec![
                family(
                    ClaimType::FutureMedical,
                    &[
                        "將來醫療", "未來醫療", "將來手術", "未來手術", "將來之醫療",
                        "預估醫療", "後續治療費", "後續手術",
                    ],
                ),
                family(
                    ClaimType::Transportation,
                    &["交通費", "交通支出", "車資", "計程車", "往返"],
                ),
                family(
                    ClaimType::NursingCare,
                    &["看護", "照護", "照顧", "護理", "陪伴"],
                ),
                family(
                    ClaimType::LostIncome,
                    &[
                        "薪資", "工資", "收入", "無法工作", "不能工作", "工作損失", "請假",
                        "勞動能力",
                    ],
                ),
                family(ClaimType::ConsolationMoney, &["慰撫", "精神", "痛苦"]),
                family(
                    ClaimType::PropertyDamage,
                    &[
                        "車損", "車輛", "機車", "汽車", "修復", "維修", "修理", "貶值", "財物",
                        "財產",
                    ],
                ),
                family(
                    ClaimType::MedicalExpense,
                    &[
                        "醫療", "醫藥", "治療", "就醫", "醫院", "診所", "手術", "復健", "藥費",
                        "掛號", "急診", "門診", "檢查", "診療", "輔具", "醫材",
                    ],
                ),
            ],
            generic_terms: strings(&["費用", "損失", "損害", "賠償", "支出", "花費"]),
            total_markers: strings(&["共計", "合計", "總計", "小計"]),
            calculation_base: vec![
                Literal("每個月月薪".into()),
                Literal("月薪".into()),
                Literal("日薪".into()),
                Literal("時薪".into()),
                Literal("基本工資".into()),
                Literal("薪資標準".into()),
                Literal("每日照護費用".into()),
                Literal("作為計算基準".into()),
                Literal("作為基準".into()),
                Literal("計算基準".into()),
                Regex("每日.*作為計算基準".into()),
                Regex("依每月.*計算".into()),
                Regex("每月.*計算".into()),
                Regex("每月.*減少".into()),
                Regex("勞動能力.*減少".into()),
                Regex("每月工資.*為".into()),
                Regex("月工資.*為".into()),
                Regex("每[日月年時][0-9][0-9,]*元".into()),
                Regex("[0-9][0-9,]*元計算".into()),
            ],
            possessive_terms: strings(&[
                "醫療費用", "醫療費", "交通費", "工資損失", "薪資損失", "看護費", "慰撫金",
                "精神慰撫金", "損害", "損失", "請求",
            ]),
            name_stopwords: strings(&[
                "因", "之", "等", "主張", "受傷", "受有", "所受", "本次", "本件", "上開",
                "事故", "損害", "損失", "賠償", "請求", "支出", "費用", "醫療", "交通", "工資",
                "薪資", "慰撫", "精神", "車輛", "就醫", "後續", "出院", "住院", "每日", "每月",
                "部分", "部份", "共同", "被告", "訴外", "第", "條", "號", "款", "訴", "判決",
                "年度", "二人", "兩人", "三人", "數人", "等人", "本人", "自行", "雙方", "各",
                "均", "另", "亦", "並", "當日", "目前",
            ]),
            format_threshold: 0.3,
            format_confidence: 0.8,
            mixed_specific_confidence: 0.6,
            mixed_generic_confidence: 0.4,
            keyword_window: 40,
        }
    }
}

impl PatternConfig {
    /// Parse a JSON override. Absent fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON override from disk.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check numeric knobs and family tables.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("format_threshold", self.format_threshold),
            ("format_confidence", self.format_confidence),
            ("mixed_specific_confidence", self.mixed_specific_confidence),
            ("mixed_generic_confidence", self.mixed_generic_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange { name, value });
            }
        }

        for fam in &self.claim_families {
            if fam.terms.iter().all(|t| t.is_empty()) {
                return Err(ConfigError::EmptyFamily(fam.claim_type.to_string()));
            }
        }

        Ok(())
    }

    /// Every specific family term, in table order.
    pub fn all_family_terms(&self) -> impl Iterator<Item = &str> {
        self.claim_families
            .iter()
            .flat_map(|f| f.terms.iter().map(|t| t.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_validates() {
        PatternConfig::default().validate().unwrap();
    }

    #[test]
    fn specific_families_precede_medical() {
        let cfg = PatternConfig::default();
        let order: Vec<_> = cfg.claim_families.iter().map(|f| &f.claim_type).collect();
        let pos = |t: &ClaimType| order.iter().position(|o| *o == t).unwrap();
        assert!(pos(&ClaimType::FutureMedical) < pos(&ClaimType::MedicalExpense));
        assert!(pos(&ClaimType::Transportation) < pos(&ClaimType::MedicalExpense));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = PatternConfig::from_json_str(r#"{"format_threshold": 0.5}"#).unwrap();
        assert_eq!(cfg.format_threshold, 0.5);
        assert_eq!(cfg.format_confidence, 0.8);
        assert_eq!(cfg.claim_families.len(), 7);
    }

    #[test]
    fn custom_family_with_new_tag() {
        let cfg = PatternConfig::from_json_str(
            r#"{"claim_families": [{"claim_type": "funeral", "terms": ["喪葬"]}]}"#,
        )
        .unwrap();
        assert_eq!(cfg.claim_families.len(), 1);
        assert_eq!(
            cfg.claim_families[0].claim_type,
            ClaimType::Other("funeral".into())
        );
    }

    #[test]
    fn calculation_rules_are_tagged() {
        let cfg = PatternConfig::from_json_str(
            r#"{"calculation_base": [
                {"kind": "literal", "pattern": "月薪"},
                {"kind": "regex", "pattern": "每月.*計算"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(
            cfg.calculation_base,
            vec![
                CalculationRule::Literal("月薪".into()),
                CalculationRule::Regex("每月.*計算".into()),
            ]
        );
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let cfg = PatternConfig {
            format_threshold: 1.5,
            ..PatternConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::OutOfRange { name: "format_threshold", .. })
        ));
    }

    #[test]
    fn rejects_empty_family() {
        let mut cfg = PatternConfig::default();
        cfg.claim_families[0].terms.clear();
        assert!(matches!(cfg.validate(), Err(ConfigError::EmptyFamily(_))));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"keyword_window": 12}}"#).unwrap();
        let cfg = PatternConfig::from_path(file.path()).unwrap();
        assert_eq!(cfg.keyword_window, 12);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = PatternConfig::from_path(Path::new("/nonexistent/lexclaim.json")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
