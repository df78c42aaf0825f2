//! Byte-offset helpers for lines, sentences, and clauses.
//!
//! All positions are byte offsets into the original document and always land
//! on `char` boundaries.

use std::ops::Range;

/// Sentence terminators. A newline ends a sentence too: item lists put one
/// claim per line without punctuation.
const SENTENCE_END: &[char] = &['。', '！', '？', '!', '?', '\n'];

/// Clause breaks inside a sentence (in addition to sentence terminators).
const CLAUSE_BREAK: &[char] = &['，', ',', '、', '；', ';', '：', ':'];

/// Iterate `(line_start, line)` pairs; lines exclude the `\n` and a trailing `\r`.
pub(crate) fn lines_with_offsets(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut start = 0;
    text.split('\n').map(move |line| {
        let at = start;
        start += line.len() + 1;
        (at, line.strip_suffix('\r').unwrap_or(line))
    })
}

/// Shrink `range` so that `text[range]` has no leading or trailing whitespace.
pub(crate) fn trim_range(text: &str, range: Range<usize>) -> Range<usize> {
    let slice = &text[range.clone()];
    let lead = slice.len() - slice.trim_start().len();
    let trail = slice.len() - slice.trim_end().len();
    let start = range.start + lead;
    let end = (range.end - trail).max(start);
    start..end
}

fn is_thousands_comma(text: &str, idx: usize) -> bool {
    let prev = text[..idx].chars().next_back();
    let next = text[idx + 1..].chars().next();
    matches!((prev, next), (Some(p), Some(n)) if p.is_ascii_digit() && n.is_ascii_digit())
}

fn is_clause_break(text: &str, idx: usize, c: char) -> bool {
    if c == ',' && is_thousands_comma(text, idx) {
        return false;
    }
    SENTENCE_END.contains(&c) || CLAUSE_BREAK.contains(&c)
}

/// The sentence containing byte `pos`, terminator included, whitespace trimmed.
pub(crate) fn sentence_at(text: &str, pos: usize) -> Range<usize> {
    let start = text[..pos]
        .char_indices()
        .rev()
        .find(|&(_, c)| SENTENCE_END.contains(&c))
        .map_or(0, |(i, c)| i + c.len_utf8());
    let end = text[pos..]
        .char_indices()
        .find(|&(_, c)| SENTENCE_END.contains(&c))
        .map_or(text.len(), |(i, c)| {
            if c == '\n' { pos + i } else { pos + i + c.len_utf8() }
        });
    trim_range(text, start..end)
}

/// Start of the clause that ends at `pos`, searching no further back than `floor`.
pub(crate) fn clause_start(text: &str, floor: usize, pos: usize) -> usize {
    text[floor..pos]
        .char_indices()
        .rev()
        .find(|&(i, c)| is_clause_break(text, floor + i, c))
        .map_or(floor, |(i, c)| floor + i + c.len_utf8())
}

/// End of the clause that starts at `pos`, searching no further than `ceiling`.
pub(crate) fn clause_end(text: &str, pos: usize, ceiling: usize) -> usize {
    text[pos..ceiling]
        .char_indices()
        .find(|&(i, c)| is_clause_break(text, pos + i, c))
        .map_or(ceiling, |(i, _)| pos + i)
}

/// Byte offset `chars` characters before `pos`, not earlier than `floor`.
pub(crate) fn back_chars(text: &str, floor: usize, pos: usize, chars: usize) -> usize {
    text[floor..pos]
        .char_indices()
        .rev()
        .nth(chars.saturating_sub(1))
        .map_or(floor, |(i, _)| floor + i)
}

/// Trim whitespace and dangling clause punctuation from a label.
pub(crate) fn clean_label(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || CLAUSE_BREAK.contains(&c))
}
