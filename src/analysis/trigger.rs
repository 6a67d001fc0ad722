use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace};

use super::scorer::score_clause;
use super::segment::segment_clauses;
use super::types::{
    ClauseSegment, IntentAnalysis, IntentSummary, MatchedSegment, ScoringContext, TriggerReason,
    TriggerResult,
};
use super::patterns::MAX_POSSIBLE_SCORE;
use super::sanitize::normalize_quotes;
use crate::config::TriggerConfig;
use crate::telemetry::{TelemetryEvent, TelemetrySink};
use crate::time::Millis;

/// Minimum clause score that counts as an intent.
pub const TRIGGER_THRESHOLD: u32 = 2;
pub const MIN_CONFIDENCE: f64 = 0.45;
pub const MAX_CONFIDENCE: f64 = 0.99;

pub fn confidence_for(score: u32) -> f64 {
    let ratio = (score as f64 / MAX_POSSIBLE_SCORE as f64).min(1.0);
    (MIN_CONFIDENCE + ratio * 0.45).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}

pub fn count_words(text: &str) -> usize {
    text.split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .count()
}

/// Aggregates per-clause scores into a single fire / no-fire decision.
#[derive(Clone)]
pub struct TriggerEvaluator {
    config: TriggerConfig,
    dampening: Vec<String>,
    telemetry: Option<Arc<dyn TelemetrySink>>,
}

impl std::fmt::Debug for TriggerEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerEvaluator")
            .field("config", &self.config)
            .field("telemetry", &self.telemetry.is_some())
            .finish()
    }
}

impl Default for TriggerEvaluator {
    fn default() -> Self {
        Self::new(TriggerConfig::default())
    }
}

impl TriggerEvaluator {
    pub fn new(config: TriggerConfig) -> Self {
        let dampening = config
            .dampening_phrases
            .iter()
            .map(|p| normalize_quotes(p.trim()).to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        Self { config, dampening, telemetry: None }
    }

    pub fn with_telemetry(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = Some(sink);
        self
    }

    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    /// Decides whether `text` expresses an actionable request.
    ///
    /// Deterministic for identical `(text, now)`. `last_fire` is advisory and
    /// does not affect the decision.
    pub fn should_trigger(&self, text: &str, now: Millis, last_fire: Option<Millis>) -> TriggerResult {
        let started = Instant::now();
        if let Some(last) = last_fire {
            trace!(since_last_fire_ms = now.saturating_sub(last), "evaluating surface text");
        }

        let (result, clauses) = self.decide(text, now);
        self.emit(&result, &clauses, now, started);
        result
    }

    fn decide(&self, text: &str, now: Millis) -> (TriggerResult, Vec<(ClauseSegment, IntentAnalysis)>) {
        let word_count = count_words(text);

        if text.trim().is_empty() {
            return (TriggerResult::rejected(TriggerReason::Empty, word_count), Vec::new());
        }

        let lowered = normalize_quotes(text).to_lowercase();
        if self.dampening.iter().any(|p| lowered.contains(p.as_str())) {
            debug!("evaluation dampened by configured phrase");
            return (TriggerResult::rejected(TriggerReason::Dampened, word_count), Vec::new());
        }

        let mut context = ScoringContext::new();
        let clauses: Vec<(ClauseSegment, IntentAnalysis)> = segment_clauses(text)
            .into_iter()
            .map(|segment| {
                let analysis = score_clause(&segment, &mut context);
                (segment, analysis)
            })
            .collect();

        let mut matches: Vec<MatchedSegment> = clauses
            .iter()
            .filter(|(_, analysis)| analysis.score >= TRIGGER_THRESHOLD)
            .map(|(segment, analysis)| MatchedSegment {
                text: segment.text.clone(),
                start: segment.start,
                end: segment.end,
                score: analysis.score,
                patterns_hit: analysis.patterns_hit.clone(),
                constraints: analysis.constraints.clone(),
                structured: summarize(analysis),
            })
            .collect();

        if matches.is_empty() {
            let reason = match self.config.short_text_words {
                Some(min_words) if word_count < min_words => TriggerReason::ShortNoIntent,
                _ => TriggerReason::NoIntent,
            };
            return (TriggerResult::rejected(reason, word_count), clauses);
        }

        matches.sort_by_key(|m| m.start);

        // Highest score wins; the earliest clause wins ties.
        let mut best = &matches[0];
        for candidate in &matches[1..] {
            if candidate.score > best.score {
                best = candidate;
            }
        }
        let intent_summary = Some(best.structured.clone());

        let result = TriggerResult {
            trigger: true,
            reason: TriggerReason::Intent,
            word_count,
            matched_phrase: Some(matches[0].text.clone()),
            matched_offset: Some(matches[0].start),
            intent_summary,
            cooldown_until: Some(now + self.config.cooldown_ms),
            matched_segments: matches,
        };
        (result, clauses)
    }

    fn emit(
        &self,
        result: &TriggerResult,
        clauses: &[(ClauseSegment, IntentAnalysis)],
        now: Millis,
        started: Instant,
    ) {
        let Some(sink) = &self.telemetry else { return };

        let mut patterns_hit: Vec<String> = Vec::new();
        let mut constraints = Vec::new();
        for (_, analysis) in clauses {
            for label in &analysis.patterns_hit {
                if !patterns_hit.contains(label) {
                    patterns_hit.push(label.clone());
                }
            }
            for c in &analysis.constraints {
                if !constraints.contains(&c.kind) {
                    constraints.push(c.kind);
                }
            }
        }

        let event = TelemetryEvent {
            event: result.reason,
            at: now,
            patterns_hit,
            score: clauses.iter().map(|(_, a)| a.score).max().unwrap_or(0),
            constraints,
            time_ms: started.elapsed().as_secs_f64() * 1_000.0,
            segments: clauses.len(),
        };
        if let Err(err) = sink.emit(event) {
            debug!(%err, "telemetry sink rejected event");
        }
    }
}

fn summarize(analysis: &IntentAnalysis) -> IntentSummary {
    let mut constraints = BTreeMap::new();
    for c in &analysis.constraints {
        constraints.entry(c.kind).or_insert_with(|| c.value.clone());
    }
    IntentSummary {
        intent: analysis.action.clone(),
        object: analysis.object.clone(),
        topic: analysis.topic.clone(),
        components: analysis.components.clone(),
        constraints,
        confidence: confidence_for(analysis.score),
    }
}

/// Convenience wrapper over a default-configured evaluator.
pub fn should_trigger(text: &str, now: Millis) -> TriggerResult {
    TriggerEvaluator::default().should_trigger(text, now, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_is_clamped() {
        assert!((confidence_for(0) - 0.45).abs() < 1e-9);
        assert!((confidence_for(15) - 0.90).abs() < 1e-9);
        assert!((confidence_for(100) - 0.90).abs() < 1e-9);
    }

    #[test]
    fn word_count_ignores_punctuation_tokens() {
        assert_eq!(count_words("hello — world !"), 2);
    }
}
