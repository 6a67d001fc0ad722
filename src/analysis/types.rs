use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::time::Millis;

/// A contiguous sentence- or bullet-run-sized slice of the input.
/// `start`/`end` are byte offsets; `text` is `input[start..end]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClauseSegment {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub has_continuation: bool,
    pub paragraph_break_before: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConstraintKind {
    Length,
    LengthRange,
    Tone,
    Format,
    Audience,
    Language,
    Deadline,
    Include,
    Exclude,
}

impl ConstraintKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintKind::Length => "length",
            ConstraintKind::LengthRange => "lengthRange",
            ConstraintKind::Tone => "tone",
            ConstraintKind::Format => "format",
            ConstraintKind::Audience => "audience",
            ConstraintKind::Language => "language",
            ConstraintKind::Deadline => "deadline",
            ConstraintKind::Include => "include",
            ConstraintKind::Exclude => "exclude",
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub kind: ConstraintKind,
    /// Normalized value, e.g. "500 words" or "Friday".
    pub value: String,
    /// The text the value was extracted from.
    pub raw: String,
    /// Object of an earlier clause this constraint refers back to.
    pub target: Option<String>,
}

/// Cross-clause memory threaded through scoring of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoringContext {
    pub last_action: Option<String>,
    pub last_object: Option<String>,
    pub empty_streak: u32,
}

impl ScoringContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.last_action = None;
        self.last_object = None;
        self.empty_streak = 0;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentAnalysis {
    pub sanitized_text: String,
    pub score: u32,
    /// Labels of the rules that fired, in table order, without duplicates.
    pub patterns_hit: Vec<String>,
    pub constraints: Vec<Constraint>,
    pub action: Option<String>,
    pub object: Option<String>,
    /// Bullet lines of a continuation clause (at most 8).
    pub components: Vec<String>,
    pub topic: Option<String>,
}

/// Structured intent of a matched clause; the shape handed to collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentSummary {
    pub intent: Option<String>,
    pub object: Option<String>,
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub constraints: BTreeMap<ConstraintKind, String>,
    /// Always within [0.45, 0.99].
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedSegment {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub score: u32,
    pub patterns_hit: Vec<String>,
    pub constraints: Vec<Constraint>,
    pub structured: IntentSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerReason {
    Empty,
    Dampened,
    ShortNoIntent,
    NoIntent,
    Intent,
}

impl TriggerReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerReason::Empty => "empty",
            TriggerReason::Dampened => "dampened",
            TriggerReason::ShortNoIntent => "short-no-intent",
            TriggerReason::NoIntent => "no-intent",
            TriggerReason::Intent => "intent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerResult {
    pub trigger: bool,
    pub reason: TriggerReason,
    pub word_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched_segments: Vec<MatchedSegment>,
    pub matched_phrase: Option<String>,
    pub matched_offset: Option<usize>,
    pub intent_summary: Option<IntentSummary>,
    pub cooldown_until: Option<Millis>,
}

impl TriggerResult {
    pub fn rejected(reason: TriggerReason, word_count: usize) -> Self {
        Self {
            trigger: false,
            reason,
            word_count,
            matched_segments: Vec::new(),
            matched_phrase: None,
            matched_offset: None,
            intent_summary: None,
            cooldown_until: None,
        }
    }
}
