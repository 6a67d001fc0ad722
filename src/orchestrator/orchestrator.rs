use std::sync::Arc;
use tracing::{debug, info, warn};

use super::registry::SurfaceRegistry;
use super::state::{
    CooldownReason, CycleDirection, Suggestion, SuggestionCooldown, SuggestionPhase, SurfaceId,
    SurfaceState,
};
use super::usage::{UsageKind, UsageSink};
use crate::analysis::{extract_spans, TriggerEvaluator, TriggerResult};
use crate::config::{EngineConfig, SuggestionConfig};
use crate::error::CatalogError;
use crate::suggest::{query_from_trigger, Guard, GuardCatalog, QueryFeatures, SuggestionMatcher};
use crate::telemetry::TelemetrySink;
use crate::time::{Clock, Millis, SystemClock};

/// A refresh that passed the pre-checks and now waits on the catalog.
/// Stamped with the surface's generation token at launch.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationTicket {
    pub surface: SurfaceId,
    pub token: u64,
    pub query: QueryFeatures,
    pub trigger: TriggerResult,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationOutcome {
    Suggested(Suggestion),
    /// Nothing worth offering; suggestion state was cleared.
    Cleared,
    /// Superseded by newer work, or the surface is gone.
    Stale,
}

impl EvaluationOutcome {
    pub fn into_suggestion(self) -> Option<Suggestion> {
        match self {
            EvaluationOutcome::Suggested(s) => Some(s),
            _ => None,
        }
    }
}

/// Per-surface suggestion state machine.
///
/// Idle -> Evaluating(token) -> Suggested -> Cycling -> Accepted | Dismissed.
/// Every mutation that invalidates in-flight work bumps the surface's
/// generation token; completions carrying an older token are dropped.
pub struct SuggestionOrchestrator {
    evaluator: TriggerEvaluator,
    matcher: SuggestionMatcher,
    config: SuggestionConfig,
    registry: SurfaceRegistry,
    clock: Arc<dyn Clock>,
    usage: UsageSink,
}

impl SuggestionOrchestrator {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_parts(config, Arc::new(SystemClock), UsageSink::disabled())
    }

    pub fn with_parts(config: EngineConfig, clock: Arc<dyn Clock>, usage: UsageSink) -> Self {
        Self {
            evaluator: TriggerEvaluator::new(config.trigger),
            matcher: SuggestionMatcher::new(config.matcher),
            config: config.suggestion,
            registry: SurfaceRegistry::new(),
            clock,
            usage,
        }
    }

    pub fn with_telemetry(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.evaluator = self.evaluator.with_telemetry(sink);
        self
    }

    pub fn config(&self) -> &SuggestionConfig {
        &self.config
    }

    pub fn attach_surface(&mut self) -> SurfaceId {
        let id = self.registry.attach();
        debug!(surface = %id, "surface attached");
        id
    }

    pub fn detach_surface(&mut self, id: SurfaceId) -> bool {
        let removed = self.registry.detach(id).is_some();
        if removed {
            debug!(surface = %id, "surface detached");
        }
        removed
    }

    pub fn surface(&self, id: SurfaceId) -> Option<&SurfaceState> {
        self.registry.get(id)
    }

    pub fn surfaces(&self) -> &SurfaceRegistry {
        &self.registry
    }

    /// Synchronous core scoring, independent of any surface.
    pub fn evaluate(&self, text: &str) -> TriggerResult {
        self.evaluator.should_trigger(text, self.clock.now_ms(), None)
    }

    /// Immediate pre-check on every keystroke. Updates the typed-since-baseline
    /// counters and reports whether a debounced refresh is worth scheduling.
    pub fn note_text_change(&mut self, id: SurfaceId, text: &str, caret: Option<usize>) -> bool {
        let now = self.clock.now_ms();
        let config = self.config.clone();
        let Some(state) = self.registry.get_mut(id) else {
            return false;
        };
        observe_text(state, text, caret);
        !cooldown_blocks(state, &config, now)
    }

    /// First half of a refresh: runs the trigger and derives the catalog
    /// query. Always advances the generation token, so anything still in
    /// flight for this surface becomes stale.
    pub fn begin_evaluation(&mut self, id: SurfaceId, text: &str) -> Option<EvaluationTicket> {
        let now = self.clock.now_ms();
        let config = self.config.clone();
        let state = self.registry.get_mut(id)?;
        let caret = state.last_caret;
        observe_text(state, text, caret);
        let token = state.next_token();

        if cooldown_blocks(state, &config, now) {
            debug!(surface = %id, "refresh suppressed by cooldown");
            return None;
        }

        let result = self.evaluator.should_trigger(text, now, state.last_fire_at);
        state.highlights = result
            .matched_segments
            .iter()
            .max_by(|a, b| a.score.cmp(&b.score).then(b.start.cmp(&a.start)))
            .map(|seg| extract_spans(&seg.text, seg.start, text.len()))
            .unwrap_or_default();

        let query = query_from_trigger(&result);
        if result.trigger {
            state.last_fire_at = Some(now);
        }
        state.last_trigger = Some(result.clone());

        let Some(query) = query else {
            state.clear_suggestion();
            return None;
        };

        state.phase = SuggestionPhase::Evaluating { token };
        Some(EvaluationTicket { surface: id, token, query, trigger: result })
    }

    /// Second half of a refresh, applied once the catalog answered.
    pub fn complete_evaluation(
        &mut self,
        ticket: EvaluationTicket,
        guards: Result<Vec<Guard>, CatalogError>,
    ) -> EvaluationOutcome {
        let now = self.clock.now_ms();
        let Some(state) = self.registry.get_mut(ticket.surface) else {
            return EvaluationOutcome::Stale;
        };
        if ticket.token != state.eval_token {
            info!(
                surface = %ticket.surface,
                ticket = ticket.token,
                current = state.eval_token,
                "discarding stale evaluation"
            );
            return EvaluationOutcome::Stale;
        }

        let guards = match guards {
            Ok(guards) => guards,
            Err(err) => {
                warn!(surface = %ticket.surface, %err, "guard catalog fetch failed");
                state.clear_suggestion();
                return EvaluationOutcome::Cleared;
            }
        };

        let candidates = self.matcher.rank_and_select(&guards, &ticket.query, now);
        if candidates.is_empty() {
            debug!(surface = %ticket.surface, "no candidate above threshold");
            state.clear_suggestion();
            return EvaluationOutcome::Cleared;
        }

        let suggestion = Suggestion::from_candidate(&candidates[0], 0, candidates.len(), Some(&ticket.trigger));
        state.suggestion_candidates = candidates;
        state.suggestion_index = 0;
        state.suggestion = Some(suggestion.clone());
        state.phase = SuggestionPhase::Suggested;
        self.usage.record(&suggestion.guard.id, UsageKind::Shown);
        EvaluationOutcome::Suggested(suggestion)
    }

    /// Full refresh: trigger, catalog fetch, ranking.
    pub async fn refresh_suggestion<C: GuardCatalog>(
        &mut self,
        id: SurfaceId,
        text: &str,
        catalog: &C,
    ) -> Option<Suggestion> {
        let ticket = self.begin_evaluation(id, text)?;
        let guards = catalog.get_guard_cache().await;
        self.complete_evaluation(ticket, guards).into_suggestion()
    }

    /// Moves through the current candidate set, wrapping at either end.
    pub fn cycle_suggestion(&mut self, id: SurfaceId, direction: CycleDirection) -> Option<Suggestion> {
        let state = self.registry.get_mut(id)?;
        if !matches!(state.phase, SuggestionPhase::Suggested | SuggestionPhase::Cycling) {
            return None;
        }
        let total = state.suggestion_candidates.len();
        if total == 0 {
            return None;
        }
        let index = (state.suggestion_index as isize + direction.step()).rem_euclid(total as isize) as usize;
        let suggestion = Suggestion::from_candidate(
            &state.suggestion_candidates[index],
            index,
            total,
            state.last_trigger.as_ref(),
        );

        state.suggestion_index = index;
        state.suggestion = Some(suggestion.clone());
        state.phase = SuggestionPhase::Cycling;
        self.usage.record(&suggestion.guard.id, UsageKind::Shown);
        Some(suggestion)
    }

    pub fn mark_suggestion_accepted(&mut self, id: SurfaceId) -> Option<Suggestion> {
        self.conclude(id, UsageKind::Accepted)
    }

    pub fn mark_suggestion_dismissed(&mut self, id: SurfaceId) -> Option<Suggestion> {
        self.conclude(id, UsageKind::Rejected)
    }

    fn conclude(&mut self, id: SurfaceId, kind: UsageKind) -> Option<Suggestion> {
        let now = self.clock.now_ms();
        let state = self.registry.get_mut(id)?;
        let suggestion = state.suggestion.take()?;

        self.usage.record(&suggestion.guard.id, kind);
        let (phase, reason) = match kind {
            UsageKind::Accepted => (SuggestionPhase::Accepted, CooldownReason::Accepted),
            _ => (SuggestionPhase::Dismissed, CooldownReason::Dismissed),
        };
        start_cooldown(state, reason, now);
        state.suggestion_candidates.clear();
        state.suggestion_index = 0;
        state.phase = phase;
        debug!(surface = %id, guard = %suggestion.guard.id, ?phase, "suggestion concluded");
        Some(suggestion)
    }

    /// Suppresses refreshes on the surface, using its current text as the
    /// typing baseline.
    pub fn activate_suggestion_cooldown(&mut self, id: SurfaceId, reason: CooldownReason) -> bool {
        let now = self.clock.now_ms();
        let Some(state) = self.registry.get_mut(id) else {
            return false;
        };
        start_cooldown(state, reason, now);
        true
    }

    pub fn clear_suggestion_cooldown(&mut self, id: SurfaceId) -> bool {
        let Some(state) = self.registry.get_mut(id) else {
            return false;
        };
        release_cooldown(state);
        true
    }
}

fn start_cooldown(state: &mut SurfaceState, reason: CooldownReason, now: Millis) {
    state.suggestion_cooldown = SuggestionCooldown {
        active: true,
        reason: Some(reason),
        triggered_at: Some(now),
        baseline_text: state.last_raw_text.clone(),
        baseline_caret: state.last_caret,
    };
    state.typed_since_suggestion = 0;
    state.words_typed_since_suggestion = 0;
    state.next_token();
}

fn release_cooldown(state: &mut SurfaceState) {
    state.suggestion_cooldown = SuggestionCooldown::default();
    state.typed_since_suggestion = 0;
    state.words_typed_since_suggestion = 0;
}

fn observe_text(state: &mut SurfaceState, text: &str, caret: Option<usize>) {
    state.last_raw_text = text.to_string();
    state.last_caret = caret;
    if state.suggestion_cooldown.active {
        let baseline = &state.suggestion_cooldown.baseline_text;
        let (before, after): (Vec<char>, Vec<char>) = (baseline.chars().collect(), text.chars().collect());
        state.typed_since_suggestion = edit_extent(&before, &after);
        state.words_typed_since_suggestion = edit_extent(&words(baseline), &words(text));
    }
}

fn words(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .collect()
}

/// Size of the edited region between `before` and `after`: whatever is left
/// once the shared prefix and suffix are removed, counted on the longer side.
fn edit_extent<T: PartialEq>(before: &[T], after: &[T]) -> usize {
    let prefix = before.iter().zip(after).take_while(|(a, b)| a == b).count();
    let (before, after) = (&before[prefix..], &after[prefix..]);
    let suffix = before
        .iter()
        .rev()
        .zip(after.iter().rev())
        .take_while(|(a, b)| a == b)
        .count();
    (before.len() - suffix).max(after.len() - suffix)
}

/// True while the cooldown still holds. Releases it once the typing
/// thresholds or the optional TTL are crossed.
fn cooldown_blocks(state: &mut SurfaceState, config: &SuggestionConfig, now: Millis) -> bool {
    let cooldown = &state.suggestion_cooldown;
    if !cooldown.active {
        return false;
    }
    let expired = match (config.cooldown_ttl_ms, cooldown.triggered_at) {
        (Some(ttl), Some(at)) => now.saturating_sub(at) >= ttl,
        _ => false,
    };
    let typed_past = state.typed_since_suggestion >= config.cooldown_release_chars
        || state.words_typed_since_suggestion >= config.cooldown_release_words;
    if expired || typed_past {
        debug!(expired, typed_past, "cooldown released");
        release_cooldown(state);
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SuggestionConfig {
        SuggestionConfig {
            debounce_ms: 10,
            cooldown_release_chars: 10,
            cooldown_release_words: 3,
            cooldown_ttl_ms: Some(1_000),
        }
    }

    fn cooling_state(baseline: &str) -> SurfaceState {
        let mut state = SurfaceState::new();
        observe_text(&mut state, baseline, None);
        start_cooldown(&mut state, CooldownReason::Manual, 100);
        state
    }

    #[test]
    fn short_edits_keep_cooldown() {
        let mut state = cooling_state("Write a memo.");
        observe_text(&mut state, "Write a memo. ok", None);
        assert!(cooldown_blocks(&mut state, &config(), 200));
    }

    #[test]
    fn words_past_threshold_release() {
        let mut state = cooling_state("Write a memo.");
        observe_text(&mut state, "Write a memo. a b c", None);
        assert!(!cooldown_blocks(&mut state, &config(), 200));
        assert!(!state.is_cooling_down());
    }

    #[test]
    fn same_length_rewrite_releases() {
        let baseline = "Write a memo about the budget review.";
        let rewrite = "Draft a note about the hiring policy.";
        assert_eq!(baseline.len(), rewrite.len());
        let mut state = cooling_state(baseline);
        observe_text(&mut state, rewrite, None);
        assert!(state.typed_since_suggestion >= 10);
        assert!(!cooldown_blocks(&mut state, &config(), 200));
    }

    #[test]
    fn edit_extent_counts_the_changed_middle() {
        let chars = |s: &str| s.chars().collect::<Vec<_>>();
        assert_eq!(edit_extent(&chars("abcdef"), &chars("abXYef")), 2);
        assert_eq!(edit_extent(&chars("abc"), &chars("abc")), 0);
        assert_eq!(edit_extent(&chars("abc"), &chars("abcde")), 2);
        assert_eq!(edit_extent(&chars("aaaa"), &chars("aa")), 2);
        assert_eq!(edit_extent(&words("send the memo"), &words("send the notes")), 1);
    }

    #[test]
    fn ttl_releases() {
        let mut state = cooling_state("Write a memo.");
        assert!(cooldown_blocks(&mut state, &config(), 1_099));
        assert!(!cooldown_blocks(&mut state, &config(), 1_100));
    }

    #[test]
    fn cooldown_bumps_generation() {
        let state = cooling_state("x");
        assert_eq!(state.eval_token, 1);
    }
}
