//! Highlight spans for a fired clause.
//!
//! Spans are located on the ASCII-lowercased clause so byte offsets line up
//! with the original text, then shifted by the clause offset and clamped to
//! the document.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use super::lexicon::{
    alternation, contains_word, ACTION_VERBS, COMMAND_PHRASES, DETERMINERS, LEADING_HELPERS,
    RECIPIENT_NOUNS, REQUEST_PREFIXES, SPAN_STOP_WORDS, THIRD_PARTY_PREFIXES, TOPIC_HINT_NOUNS,
    TOPIC_PREPOSITIONS,
};

pub const MAX_SPANS: usize = 8;
const MERGE_DISTANCE: usize = 2;
const MIN_SPAN_LEN: usize = 2;
const TOPIC_HINT_CHARS: usize = 32;
const TOPIC_MAX_CHARS: usize = 48;
const DIRECT_OBJECT_WORDS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanRole {
    Action,
    Recipient,
    Topic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
    pub role: SpanRole,
}

fn word_regex(words: &[&str]) -> Regex {
    Regex::new(&format!(r"\b(?:{})\b", alternation(words))).expect("valid lexicon regex")
}

static COMMAND_ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| word_regex(COMMAND_PHRASES));
static VERB_ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| word_regex(ACTION_VERBS));
static REQUEST_ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| word_regex(REQUEST_PREFIXES));
static THIRD_PARTY_ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| word_regex(THIRD_PARTY_PREFIXES));
static RECIPIENT_RE: LazyLock<Regex> = LazyLock::new(|| word_regex(RECIPIENT_NOUNS));

static STOP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b(?:{})\b|[.,;:!?()\n]", alternation(SPAN_STOP_WORDS)))
        .expect("valid stop regex")
});

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}][\p{L}\p{N}'-]*").expect("valid word regex"));

/// One regex per topic preposition, in priority order.
static TOPIC_PREP_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    TOPIC_PREPOSITIONS
        .iter()
        .map(|p| Regex::new(&format!(r"\b{}\s+", regex::escape(p))).expect("valid topic regex"))
        .collect()
});

static TOPIC_HINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b(?:{})\b\s*[:\-]?\s*", alternation(TOPIC_HINT_NOUNS)))
        .expect("valid topic hint regex")
});

/// Extracts action/recipient/topic spans for the clause at `offset` in a
/// document of `doc_len` bytes.
pub fn extract_spans(clause: &str, offset: usize, doc_len: usize) -> Vec<HighlightSpan> {
    let lowered = clause.to_ascii_lowercase();
    let mut local: Vec<(usize, usize, SpanRole)> = Vec::new();

    if let Some((start, end)) = action_anchor(&lowered) {
        local.push((start, end, SpanRole::Action));
        if let Some((obj_start, obj_end)) = direct_object(&lowered, end) {
            local.push((obj_start, obj_end, SpanRole::Topic));
        }
    }

    if let Some(m) = RECIPIENT_RE.find(&lowered) {
        local.push((m.start(), m.end(), SpanRole::Recipient));
    }

    if let Some((start, end)) = topic_span(&lowered) {
        local.push((start, end, SpanRole::Topic));
    }

    let mut spans: Vec<HighlightSpan> = local
        .into_iter()
        .map(|(start, end, role)| {
            let start = (offset + start).min(doc_len);
            let end = (offset + end).min(doc_len).max(start);
            HighlightSpan { start, end, role }
        })
        .filter(|s| s.end - s.start >= MIN_SPAN_LEN)
        .collect();

    spans = merge_nearby(spans);
    spans.truncate(MAX_SPANS);
    spans
}

fn action_anchor(lowered: &str) -> Option<(usize, usize)> {
    for re in [&*COMMAND_ANCHOR_RE, &*VERB_ANCHOR_RE, &*REQUEST_ANCHOR_RE, &*THIRD_PARTY_ANCHOR_RE] {
        if let Some(m) = re.find(lowered) {
            return Some((m.start(), m.end()));
        }
    }
    first_content_word(lowered)
}

/// First word after peeling pronouns and helper verbs off the front.
fn first_content_word(lowered: &str) -> Option<(usize, usize)> {
    WORD_RE
        .find_iter(lowered)
        .find(|m| !contains_word(LEADING_HELPERS, m.as_str()))
        .map(|m| (m.start(), m.end()))
}

/// Up to four words after the action anchor, stopping at the first stop word.
/// A single leading determiner or number word is dropped.
fn direct_object(lowered: &str, action_end: usize) -> Option<(usize, usize)> {
    let rest = &lowered[action_end..];
    let window = match STOP_RE.find(rest) {
        Some(m) => &rest[..m.start()],
        None => rest,
    };

    let mut words = WORD_RE.find_iter(window).peekable();
    if words.peek().is_some_and(|w| is_determiner_or_number(w.as_str())) {
        words.next();
    }

    let taken: Vec<_> = words.take(DIRECT_OBJECT_WORDS).collect();
    let first = taken.first()?;
    let last = taken.last()?;
    let (start, end) = (action_end + first.start(), action_end + last.end());
    (end - start >= MIN_SPAN_LEN).then_some((start, end))
}

fn is_determiner_or_number(word: &str) -> bool {
    contains_word(DETERMINERS, word) || word.chars().all(|c| c.is_ascii_digit())
}

fn topic_span(lowered: &str) -> Option<(usize, usize)> {
    for re in TOPIC_PREP_RES.iter() {
        let Some(m) = re.find(lowered) else { continue };
        let rest = &lowered[m.end()..];
        let stop = STOP_RE.find(rest).map_or(rest.len(), |s| s.start());
        let phrase = &rest[..floor_boundary(rest, stop.min(TOPIC_MAX_CHARS))];
        let trimmed = phrase.trim_end();
        if trimmed.len() >= MIN_SPAN_LEN {
            return Some((m.end(), m.end() + trimmed.len()));
        }
    }

    let m = TOPIC_HINT_RE.find(lowered)?;
    let rest = &lowered[m.end()..];
    let phrase = rest[..floor_boundary(rest, TOPIC_HINT_CHARS)].trim_end();
    (phrase.len() >= MIN_SPAN_LEN).then_some((m.end(), m.end() + phrase.len()))
}

fn floor_boundary(text: &str, mut index: usize) -> usize {
    index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Collapses same-role spans that overlap or sit within two bytes of each
/// other, then orders everything by start.
fn merge_nearby(mut spans: Vec<HighlightSpan>) -> Vec<HighlightSpan> {
    spans.sort_by_key(|s| (s.role, s.start, s.end));
    let mut merged: Vec<HighlightSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(prev) if prev.role == span.role && span.start <= prev.end + MERGE_DISTANCE => {
                prev.end = prev.end.max(span.end);
            }
            _ => merged.push(span),
        }
    }
    merged.sort_by_key(|s| (s.start, s.end));
    merged
}
