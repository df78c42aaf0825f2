//! Amount token normalisation for Chinese legal narrative.
//!
//! Amounts appear as Arabic numerals with optional `,` thousands separators
//! followed by `元` (e.g. "1,036元", "255830元", "300,000 元"), or as digits
//! mixed with a `萬`/`千` unit ("5萬4,741元", "18萬元", "3千500元"). This module
//! converts those tokens into integers and checks that evidence text still
//! carries a parsed amount.
//!
//! # Conventions
//!
//! - Separators: only a half-width `,` between two ASCII digits is a
//!   thousands separator. A full-width `，` is always clause punctuation.
//! - Suffix: a trailing `元` (optionally preceded by whitespace) is stripped.
//! - Units: one `萬`/`万` (×10,000) or `千`/`仟` (×1,000) may follow the
//!   leading digits. The remainder after it must be smaller than the unit.
//! - Fractions: source text carries no fractional currency units, so a `.`
//!   makes the token unparseable.

/// Parse an amount token into currency units.
///
/// Input: "1,036元", "300,000 元", "50", "5萬4,741元", "18萬元", "3千500元"
/// Output: `Some(1036)`, `Some(300000)`, `Some(50)`, `Some(54741)`,
/// `Some(180000)`, `Some(3500)`
///
/// Returns `None` for empty tokens, tokens containing anything other than
/// digits, separators and one unit, and values that overflow `u64`. Zero is
/// returned as `Some(0)`; rejecting it is the model's job (see
/// [`crate::DamageItem::new`]).
pub fn parse_amount(token: &str) -> Option<u64> {
    let s = token.trim();
    let s = s.strip_suffix('元').unwrap_or(s).trim_end();

    let Some((pos, c, unit)) = s
        .char_indices()
        .find_map(|(i, c)| unit_value(c).map(|u| (i, c, u)))
    else {
        return parse_digits(s);
    };
    let head = parse_digits(&s[..pos])?;
    let tail = &s[pos + c.len_utf8()..];
    let tail = if tail.is_empty() { 0 } else { parse_digits(tail)? };
    if tail >= unit {
        return None;
    }
    head.checked_mul(unit)?.checked_add(tail)
}

/// Multiplier of a unit character.
fn unit_value(c: char) -> Option<u64> {
    match c {
        '萬' | '万' => Some(10_000),
        '千' | '仟' => Some(1_000),
        _ => None,
    }
}

/// Digits with optional `,` separators.
fn parse_digits(s: &str) -> Option<u64> {
    let mut value: u64 = 0;
    let mut seen_digit = false;
    for c in s.chars() {
        match c {
            '0'..='9' => {
                let d = u64::from(c as u8 - b'0');
                value = value.checked_mul(10)?.checked_add(d)?;
                seen_digit = true;
            }
            // A separator must follow a digit.
            ',' if seen_digit => {}
            _ => return None,
        }
    }

    seen_digit.then_some(value)
}

/// Remove thousands separators (`,` flanked by ASCII digits) from `text`.
///
/// "支出醫療費用1,036元" → "支出醫療費用1036元"
pub fn normalize_separators(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == ','
            && i > 0
            && chars[i - 1].is_ascii_digit()
            && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit())
        {
            continue;
        }
        out.push(c);
    }
    out
}

/// Whether `text` carries `amount`, either as its decimal digits once
/// separators are removed or as a `萬`/`千` unit token.
pub fn contains_amount(text: &str, amount: u64) -> bool {
    normalize_separators(text).contains(&amount.to_string())
        || unit_amounts(text).any(|v| v == amount)
}

/// Values of every `<digits>萬<digits>` / `<digits>千<digits>` token in `text`.
fn unit_amounts(text: &str) -> impl Iterator<Item = u64> + '_ {
    text.char_indices()
        .filter(|&(_, c)| unit_value(c).is_some())
        .filter_map(move |(pos, c)| {
            let head_start = text[..pos]
                .char_indices()
                .rev()
                .take_while(|&(_, d)| d.is_ascii_digit())
                .last()
                .map(|(i, _)| i)?;
            let tail_start = pos + c.len_utf8();
            let tail_end = text[tail_start..]
                .char_indices()
                .find(|&(_, d)| !(d.is_ascii_digit() || d == ','))
                .map_or(text.len(), |(i, _)| tail_start + i);
            parse_amount(text[head_start..tail_end].trim_end_matches(','))
        })
}

/// Render an amount with `,` thousands separators: 413300 → "413,300".
pub fn format_amount(amount: u64) -> String {
    let digits = amount.to_string();
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
