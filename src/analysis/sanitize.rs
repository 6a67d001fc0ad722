use regex::Regex;
use std::sync::LazyLock;

use super::lexicon::{alternation, FILLER_PHRASES};

static FILLER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b(?:{})\b,?", alternation(FILLER_PHRASES))).expect("valid filler regex")
});

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

pub fn normalize_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' => '"',
            other => other,
        })
        .collect()
}

pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

/// Lowercased, quote-normalized text with discourse filler removed.
pub fn sanitize(text: &str) -> String {
    let lowered = normalize_quotes(text).to_lowercase();
    let stripped = FILLER_RE.replace_all(&lowered, " ");
    collapse_whitespace(&stripped)
        .trim_start_matches([',', ' '])
        .to_string()
}

/// Returns the word before byte offset `pos`, stripped of punctuation.
pub fn preceding_word(text: &str, pos: usize) -> Option<&str> {
    text[..pos]
        .split_whitespace()
        .last()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
        .filter(|w| !w.is_empty())
}

/// Truncates to at most `max_chars` characters on a word boundary when one
/// is available.
pub fn clip(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    match cut.rfind(' ') {
        Some(i) if i > 0 => cut[..i].trim_end().to_string(),
        _ => cut,
    }
}
