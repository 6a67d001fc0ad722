use std::cmp::Ordering;

use super::tokenize::{token_overlap, tokenize, tokenize_all, trigram_similarity};
use super::types::{Guard, LocalUsage, QueryFeatures, RankedCandidate, ScoreBreakdown};
use crate::config::MatcherConfig;
use crate::time::Millis;

pub const BASE_WEIGHT: f64 = 0.45;
pub const PREVIEW_WEIGHT: f64 = 0.20;
pub const CHARACTER_WEIGHT: f64 = 0.20;
pub const TAG_WEIGHT: f64 = 0.10;

const ACCEPT_BOOST: f64 = 0.06;
const ACCEPT_BOOST_CAP: f64 = 0.30;
const RECENT_ACCEPT_BOOST: f64 = 0.10;
const REJECT_PENALTY: f64 = 0.05;
const REJECT_PENALTY_CAP: f64 = 0.25;

const CONTAINS_SCORE: f64 = 1.0;
const CONTAINED_SCORE: f64 = 0.85;

/// Scores a guard catalog against a query and ranks the result.
#[derive(Debug, Clone, Default)]
pub struct SuggestionMatcher {
    config: MatcherConfig,
}

impl SuggestionMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Every active guard, sorted descending by combined score. Ties keep
    /// catalog order.
    pub fn rank(&self, guards: &[Guard], query: &QueryFeatures, now: Millis) -> Vec<RankedCandidate> {
        let mut ranked: Vec<RankedCandidate> = guards
            .iter()
            .filter(|g| g.is_active())
            .map(|guard| {
                let breakdown = self.score_guard(guard, query, now);
                RankedCandidate { guard: guard.clone(), score: breakdown.combined, breakdown }
            })
            .collect();
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        ranked
    }

    /// Keeps candidates at or above the minimum score, capped at the
    /// configured count.
    pub fn select(&self, ranked: Vec<RankedCandidate>) -> Vec<RankedCandidate> {
        ranked
            .into_iter()
            .filter(|c| c.score >= self.config.min_score)
            .take(self.config.max_candidates)
            .collect()
    }

    pub fn rank_and_select(&self, guards: &[Guard], query: &QueryFeatures, now: Millis) -> Vec<RankedCandidate> {
        self.select(self.rank(guards, query, now))
    }

    pub fn score_guard(&self, guard: &Guard, query: &QueryFeatures, now: Millis) -> ScoreBreakdown {
        let label_source = guard_label_text(guard);
        let label_tokens = tokenize(&label_source);
        let preview_tokens = tokenize(&guard.preview);
        let tag_tokens = tokenize_all(guard.tags.iter().map(String::as_str));

        let base = base_score(query, &label_tokens, &label_source);
        let preview = token_overlap(&query.tail_tokens, &preview_tokens);
        let character = trigram_similarity(&query_text(query), &guard_text(guard));
        let tag = token_overlap(&query.tag_tokens, &tag_tokens)
            .max(token_overlap(&query.tail_tokens, &tag_tokens));
        let usage_boost = usage_boost(&guard.local_usage, now, self.config.recent_accept_window_ms);

        let combined = (BASE_WEIGHT * base
            + PREVIEW_WEIGHT * preview
            + CHARACTER_WEIGHT * character
            + TAG_WEIGHT * tag
            + usage_boost)
            .clamp(0.0, 1.0);

        ScoreBreakdown { base, preview, character, tag, usage_boost, combined }
    }
}

fn base_score(query: &QueryFeatures, label_tokens: &[String], label_source: &str) -> f64 {
    let overlap = token_overlap(&query.label_tokens, label_tokens);
    if overlap > 0.0 {
        return overlap;
    }
    let needle = query.label_text.trim().to_lowercase();
    if needle.is_empty() {
        return 0.0;
    }
    let haystack = label_source.to_lowercase();
    if haystack.contains(&needle) {
        CONTAINS_SCORE
    } else if !haystack.trim().is_empty() && needle.contains(haystack.trim()) {
        CONTAINED_SCORE
    } else {
        0.0
    }
}

/// Boost from prior use. Negative when rejections dominate.
pub fn usage_boost(usage: &LocalUsage, now: Millis, recent_window: Millis) -> f64 {
    let accepted = (usage.accept_count as f64 * ACCEPT_BOOST).min(ACCEPT_BOOST_CAP);
    let recent = match usage.last_accepted_at {
        Some(at) if now.saturating_sub(at) <= recent_window => RECENT_ACCEPT_BOOST,
        _ => 0.0,
    };
    let rejected = (usage.reject_count as f64 * REJECT_PENALTY).min(REJECT_PENALTY_CAP);
    accepted + recent - rejected
}

fn guard_label_text(guard: &Guard) -> String {
    let mut parts = vec![guard.title.as_str(), guard.preview.as_str()];
    if let Some(label) = &guard.task_label {
        parts.push(label);
    }
    join_nonempty(parts)
}

fn guard_text(guard: &Guard) -> String {
    let mut parts = vec![guard.title.as_str(), guard.preview.as_str()];
    if let Some(label) = &guard.task_label {
        parts.push(label);
    }
    parts.extend(guard.tags.iter().map(String::as_str));
    join_nonempty(parts)
}

fn query_text(query: &QueryFeatures) -> String {
    join_nonempty([query.label_text.as_str(), query.tail_text.as_str()])
}

fn join_nonempty<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
