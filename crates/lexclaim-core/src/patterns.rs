//! Compiled form of a [`PatternConfig`].
//!
//! The structural grammar (amount tokens, item lines, plaintiff headers) is
//! fixed; the keyword tables come from the config. Everything is compiled once
//! and shared read-only across documents and threads.

use regex::Regex;

use crate::config::{CalculationRule, PatternConfig};
use crate::error::ConfigError;

/// Amount value: digits with optional `,` thousands groups, or digits with a
/// `萬`/`千` unit and an optional remainder (`5萬4,741`, `18萬`, `3千500`).
macro_rules! amount_value {
    () => {
        r"(?:(?:[0-9]{1,3}(?:,[0-9]{3})+|[0-9]+)[萬万](?:[0-9]{1,3}(?:,[0-9]{3})+|[0-9]{1,4})?|[0-9]+[千仟][0-9]{0,3}|[0-9]{1,3}(?:,[0-9]{3})+|[0-9]+)"
    };
}

/// Item label: up to 30 characters, no digits or colons, not starting with
/// whitespace.
macro_rules! item_label {
    () => {
        r"(?P<label>[^0-9：:\s][^0-9：:]{0,29}?)\s*[：:]?\s*"
    };
}

/// Amount token: an amount value then `元`. Group `amount` is the value.
const AMOUNT: &str = concat!(r"(?P<amount>", amount_value!(), r")\s*元");

/// `1. 醫療費用：1,036元`, `2、看護費用 246,000元`, `（1）醫療費用：1,000元`,
/// `1 醫療費用 1,000元`. Groups: `ordinal`, `label`, `amount`.
const NUMBERED_ITEM: &str = concat!(
    r"^\s*[（(]?(?P<ordinal>[0-9]{1,2})(?:[）)]|\s*[.．、]|\s+)\s*",
    item_label!(),
    r"(?P<amount>",
    amount_value!(),
    r")\s*元"
);

/// `（一）醫療費用：43,795元`, `㈡看護費用：246,000元`. Groups: `label`, `amount`.
const ENUMERATED_ITEM: &str = concat!(
    r"^\s*(?:[（(][一二三四五六七八九十]+[）)]|[（(]?[㈠-㈩][）)]?)\s*",
    item_label!(),
    r"(?P<amount>",
    amount_value!(),
    r")\s*元"
);

/// `（一）原告陳慶華之損害：`, `㈡原告朱庭慧部分`. Group `name`.
const SECTION_HEADER: &str = r"^\s*(?:[（(][一二三四五六七八九十]+[）)]|[（(]?[㈠-㈩][）)]?)\s*原告(?P<name>\p{Han}{2,4}?)(?:之|的)?(?:損害|損失|部分|部份|請求)?(?:如下)?\s*[：:]?\s*$";

/// `三、損害項目：`. A top-level heading closes any open plaintiff section.
const TOP_LEVEL_HEADING: &str = r"^\s*[一二三四五六七八九十]+、";

/// `原告陳慶華因…`: a name bound by punctuation or a function character.
const EXPLICIT_NAME: &str =
    r"原告(\p{Han}{2,4}?)(?:[之因於等就支受請遭與及、，,。；;：:（(\s]|$)";

/// `原告陳慶華、原告朱庭慧，`: a name bound by punctuation only, as in the
/// party listing. Only these count towards the number of plaintiffs.
const PLAINTIFF_MENTION: &str = r"原告(\p{Han}{2,4}?)(?:[、，,。；;：:（(\s]|$)";

/// A compiled calculation-base rule.
#[derive(Debug, Clone)]
pub enum CalculationMatcher {
    Literal(String),
    Regex(Regex),
}

impl CalculationMatcher {
    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Self::Literal(s) => text.contains(s.as_str()),
            Self::Regex(re) => re.is_match(text),
        }
    }

    /// The rule as written in the config, for logging.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Literal(s) => s,
            Self::Regex(re) => re.as_str(),
        }
    }
}

/// Validated, compiled pattern tables.
#[derive(Debug, Clone)]
pub struct Patterns {
    config: PatternConfig,
    pub amount: Regex,
    pub numbered_item: Regex,
    pub enumerated_item: Regex,
    pub section_header: Regex,
    pub top_level_heading: Regex,
    pub explicit_name: Regex,
    pub plaintiff_mention: Regex,
    /// `之(醫療費用|交通費|…)`, built from the possessive terms.
    pub possessive: Option<Regex>,
    pub calculation_base: Vec<CalculationMatcher>,
}

fn compile(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::Regex {
        pattern: pattern.to_string(),
        source,
    })
}

impl Patterns {
    /// Validate `config` and compile every table.
    pub fn compile(config: &PatternConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let calculation_base = config
            .calculation_base
            .iter()
            .map(|rule| match rule {
                CalculationRule::Literal(s) => Ok(CalculationMatcher::Literal(s.clone())),
                CalculationRule::Regex(p) => compile(p).map(CalculationMatcher::Regex),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let possessive_terms: Vec<String> = config
            .possessive_terms
            .iter()
            .filter(|t| !t.is_empty())
            .map(|t| regex::escape(t))
            .collect();
        let possessive = if possessive_terms.is_empty() {
            None
        } else {
            Some(compile(&format!("之(?:{})", possessive_terms.join("|")))?)
        };

        let patterns = Self {
            config: config.clone(),
            amount: compile(AMOUNT)?,
            numbered_item: compile(NUMBERED_ITEM)?,
            enumerated_item: compile(ENUMERATED_ITEM)?,
            section_header: compile(SECTION_HEADER)?,
            top_level_heading: compile(TOP_LEVEL_HEADING)?,
            explicit_name: compile(EXPLICIT_NAME)?,
            plaintiff_mention: compile(PLAINTIFF_MENTION)?,
            possessive,
            calculation_base,
        };

        tracing::debug!(
            families = config.claim_families.len(),
            calculation_rules = patterns.calculation_base.len(),
            "compiled pattern tables"
        );
        Ok(patterns)
    }

    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    /// Whether `name` is a plausible plaintiff name: 2–4 Han characters and
    /// free of stop-word, law-article and case-label fragments.
    pub fn is_plausible_name(&self, name: &str) -> bool {
        let len = name.chars().count();
        if !(2..=4).contains(&len) {
            return false;
        }
        if !name.chars().all(is_han) {
            return false;
        }
        !self
            .config
            .name_stopwords
            .iter()
            .any(|w| !w.is_empty() && name.contains(w.as_str()))
    }
}

impl Default for Patterns {
    fn default() -> Self {
        Self::compile(&PatternConfig::default()).expect("built-in pattern tables compile")
    }
}

/// CJK unified ideograph (basic block and extension A).
pub fn is_han(c: char) -> bool {
    matches!(c, '\u{4e00}'..='\u{9fff}' | '\u{3400}'..='\u{4dbf}')
}
