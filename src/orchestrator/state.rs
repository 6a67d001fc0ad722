use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::analysis::{HighlightSpan, IntentSummary, TriggerResult};
use crate::suggest::{Guard, RankedCandidate, ScoreBreakdown};
use crate::time::Millis;

/// Opaque handle for a monitored text surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(Uuid);

impl SurfaceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SurfaceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "phase")]
pub enum SuggestionPhase {
    Idle,
    /// Catalog fetch in flight for `token`.
    Evaluating { token: u64 },
    Suggested,
    Cycling,
    Accepted,
    Dismissed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CooldownReason {
    Accepted,
    Dismissed,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleDirection {
    Next,
    Previous,
}

impl CycleDirection {
    pub fn step(self) -> isize {
        match self {
            CycleDirection::Next => 1,
            CycleDirection::Previous => -1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestionCooldown {
    pub active: bool,
    pub reason: Option<CooldownReason>,
    pub triggered_at: Option<Millis>,
    /// Surface text when the cooldown started; typing is measured against it.
    pub baseline_text: String,
    pub baseline_caret: Option<usize>,
}

/// The candidate currently offered on a surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub guard: Guard,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    /// Position within the candidate set.
    pub index: usize,
    pub total: usize,
    pub matched_phrase: Option<String>,
    pub matched_offset: Option<usize>,
    pub intent: Option<IntentSummary>,
}

impl Suggestion {
    pub(crate) fn from_candidate(
        candidate: &RankedCandidate,
        index: usize,
        total: usize,
        trigger: Option<&TriggerResult>,
    ) -> Self {
        Self {
            guard: candidate.guard.clone(),
            score: candidate.score,
            breakdown: candidate.breakdown,
            index,
            total,
            matched_phrase: trigger.and_then(|t| t.matched_phrase.clone()),
            matched_offset: trigger.and_then(|t| t.matched_offset),
            intent: trigger.and_then(|t| t.intent_summary.clone()),
        }
    }
}

/// Everything tracked for one attached surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceState {
    pub last_raw_text: String,
    pub last_caret: Option<usize>,
    pub phase: SuggestionPhase,
    pub suggestion: Option<Suggestion>,
    pub suggestion_candidates: Vec<RankedCandidate>,
    pub suggestion_index: usize,
    pub suggestion_cooldown: SuggestionCooldown,
    /// Characters typed past the cooldown baseline.
    pub typed_since_suggestion: usize,
    pub words_typed_since_suggestion: usize,
    /// Generation counter; bumped whenever in-flight work must be ignored.
    pub eval_token: u64,
    pub last_trigger: Option<TriggerResult>,
    pub last_fire_at: Option<Millis>,
    pub highlights: Vec<HighlightSpan>,
}

impl Default for SurfaceState {
    fn default() -> Self {
        Self {
            last_raw_text: String::new(),
            last_caret: None,
            phase: SuggestionPhase::Idle,
            suggestion: None,
            suggestion_candidates: Vec::new(),
            suggestion_index: 0,
            suggestion_cooldown: SuggestionCooldown::default(),
            typed_since_suggestion: 0,
            words_typed_since_suggestion: 0,
            eval_token: 0,
            last_trigger: None,
            last_fire_at: None,
            highlights: Vec::new(),
        }
    }
}

impl SurfaceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the candidate set and the active suggestion.
    pub fn clear_suggestion(&mut self) {
        self.suggestion = None;
        self.suggestion_candidates.clear();
        self.suggestion_index = 0;
        self.phase = SuggestionPhase::Idle;
    }

    pub fn next_token(&mut self) -> u64 {
        self.eval_token += 1;
        self.eval_token
    }

    pub fn is_cooling_down(&self) -> bool {
        self.suggestion_cooldown.active
    }
}
