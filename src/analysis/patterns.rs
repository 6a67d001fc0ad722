//! Weighted pattern table for intent scoring.
//!
//! Each rule is a named boolean test over a clause. A rule contributes its
//! weight at most once per clause. Constraint, action/object and continuation
//! scoring need extraction as well as detection, so the scorer applies them
//! after the table using the weights declared here.

use regex::Regex;
use std::sync::LazyLock;

use super::lexicon::{
    alternation, contains_word, ACTION_VERBS, COMMAND_PHRASES, PASSIVE_VERBS, THIRD_PARTY_NOUNS,
    TO_VERB_FALSE_PREFIXES, TRANSITION_MARKERS,
};
use super::sanitize::preceding_word;
use super::types::ClauseSegment;

pub const CARRIER_DEMAND: &str = "carrier-demand";
pub const IN_PROGRESS: &str = "in-progress";
pub const THIRD_PARTY_OR_PASSIVE: &str = "third-party-or-passive";
pub const IMPERATIVE: &str = "imperative";
pub const COMMAND_PHRASE: &str = "command-phrase";
pub const TRANSITION: &str = "transition";
pub const CONSTRAINT: &str = "constraint";
pub const ACTION_OBJECT: &str = "action-object";
pub const CONTINUATION_BULLETS: &str = "continuation-bullets";

pub const CONSTRAINT_WEIGHT: u32 = 1;
/// Distinct constraint kinds that count toward the score.
pub const MAX_CONSTRAINT_KINDS: usize = 2;
pub const ACTION_OBJECT_WEIGHT: u32 = 1;
pub const CONTINUATION_WEIGHT: u32 = 1;

/// The clause as seen by a rule.
#[derive(Debug, Clone, Copy)]
pub struct ClauseView<'a> {
    /// Untrimmed, unsanitized clause text.
    pub raw: &'a str,
    pub sanitized: &'a str,
    pub segment: &'a ClauseSegment,
}

#[derive(Clone, Copy)]
pub struct PatternRule {
    pub label: &'static str,
    pub weight: u32,
    test: fn(&ClauseView<'_>) -> bool,
}

impl PatternRule {
    pub fn matches(&self, clause: &ClauseView<'_>) -> bool {
        (self.test)(clause)
    }
}

impl std::fmt::Debug for PatternRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternRule")
            .field("label", &self.label)
            .field("weight", &self.weight)
            .finish()
    }
}

pub const PATTERN_TABLE: &[PatternRule] = &[
    PatternRule { label: CARRIER_DEMAND, weight: 2, test: carrier_demand },
    PatternRule { label: IN_PROGRESS, weight: 2, test: in_progress },
    PatternRule { label: THIRD_PARTY_OR_PASSIVE, weight: 2, test: third_party_or_passive },
    PatternRule { label: IMPERATIVE, weight: 2, test: imperative },
    PatternRule { label: COMMAND_PHRASE, weight: 2, test: command_phrase },
    PatternRule { label: TRANSITION, weight: 1, test: transition },
];

const fn table_weight(table: &[PatternRule]) -> u32 {
    let mut total = 0;
    let mut i = 0;
    while i < table.len() {
        total += table[i].weight;
        i += 1;
    }
    total
}

/// Sum of every weight, constraints counted at their cap.
pub const MAX_POSSIBLE_SCORE: u32 = table_weight(PATTERN_TABLE)
    + CONSTRAINT_WEIGHT * MAX_CONSTRAINT_KINDS as u32
    + ACTION_OBJECT_WEIGHT
    + CONTINUATION_WEIGHT;

pub fn rule(label: &str) -> Option<&'static PatternRule> {
    PATTERN_TABLE.iter().find(|r| r.label == label)
}

static CARRIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:i|we)(?:'d\s+like|(?:\s+(?:really|still|also|urgently))?\s+(?:need|want|have\s+to|must|plan|intend|try\s+to|would\s+like))\b",
    )
    .expect("valid carrier regex")
});

static IN_PROGRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:i'm|i\s+am|we're|we\s+are)\s+(?:currently\s+|still\s+)?(?:working\s+on|creating|drafting|preparing|writing|putting\s+together|building)\b",
    )
    .expect("valid in-progress regex")
});

static THIRD_PARTY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?:my|our|the)\s+(?:{})\s+(?:(?:has|have|just|also)\s+)?(?:{})\b",
        alternation(THIRD_PARTY_NOUNS),
        alternation(PASSIVE_VERBS)
    ))
    .expect("valid third-party regex")
});

static DIRECT_PASSIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:i|we)(?:'ve\s+been|\s+(?:was|were|have\s+been|has\s+been|am|are))\s+(?:asked|told|required|assigned|expected)\s+to\b",
    )
    .expect("valid passive regex")
});

static IMPERATIVE_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^(?:please\s+)?(?:{})\b", alternation(ACTION_VERBS)))
        .expect("valid imperative regex")
});

static MODAL_REQUEST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:can|could|would|will)\s+you\b|\bhow\s+to\b")
        .expect("valid modal regex")
});

static TO_VERB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\bto\s+(?:{})\b", alternation(ACTION_VERBS))).expect("valid to-verb regex")
});

static COMMAND_PHRASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?:^|\s)(?:{})\b", alternation(COMMAND_PHRASES)))
        .expect("valid command-phrase regex")
});

static TRANSITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)^\s*(?:{})\b", alternation(TRANSITION_MARKERS)))
        .expect("valid transition regex")
});

fn carrier_demand(clause: &ClauseView<'_>) -> bool {
    CARRIER_RE.is_match(clause.sanitized)
}

fn in_progress(clause: &ClauseView<'_>) -> bool {
    IN_PROGRESS_RE.is_match(clause.sanitized)
}

fn third_party_or_passive(clause: &ClauseView<'_>) -> bool {
    THIRD_PARTY_RE.is_match(clause.sanitized) || DIRECT_PASSIVE_RE.is_match(clause.sanitized)
}

fn imperative(clause: &ClauseView<'_>) -> bool {
    let text = clause.sanitized.trim_start_matches(|c: char| !c.is_alphanumeric());
    IMPERATIVE_START_RE.is_match(text)
        || MODAL_REQUEST_RE.is_match(text)
        || has_to_verb(text)
}

/// "to <verb>" not directly preceded by a false-positive word.
fn has_to_verb(text: &str) -> bool {
    TO_VERB_RE.find_iter(text).any(|m| {
        preceding_word(text, m.start())
            .map_or(true, |w| !contains_word(TO_VERB_FALSE_PREFIXES, w))
    })
}

fn command_phrase(clause: &ClauseView<'_>) -> bool {
    COMMAND_PHRASE_RE.is_match(clause.sanitized)
}

fn transition(clause: &ClauseView<'_>) -> bool {
    TRANSITION_RE.is_match(clause.raw)
}
