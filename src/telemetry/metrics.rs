use std::collections::{BTreeMap, VecDeque};
use serde::Serialize;

use super::event::TelemetryEvent;
use crate::analysis::types::{ConstraintKind, TriggerReason};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    pub outcome_stats: OutcomeStats,
    pub timing_stats: TimingStats,
    pub pattern_hits: BTreeMap<String, u64>,
    pub constraint_hits: BTreeMap<ConstraintKind, u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutcomeStats {
    pub evaluations: u64,
    pub triggered: u64,
    pub no_intent: u64,
    pub short_no_intent: u64,
    pub dampened: u64,
    pub empty: u64,
}

impl OutcomeStats {
    pub fn trigger_rate(&self) -> f64 {
        if self.evaluations == 0 {
            0.0
        } else {
            self.triggered as f64 / self.evaluations as f64
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimingStats {
    pub total_ms: f64,
    pub avg_ms: f64,
    pub max_ms: f64,
    pub avg_segments: f64,
}

pub fn compute_snapshot(events: &VecDeque<TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();
    let mut total_segments = 0usize;

    for event in events {
        let outcomes = &mut snap.outcome_stats;
        outcomes.evaluations += 1;
        match event.event {
            TriggerReason::Intent => outcomes.triggered += 1,
            TriggerReason::NoIntent => outcomes.no_intent += 1,
            TriggerReason::ShortNoIntent => outcomes.short_no_intent += 1,
            TriggerReason::Dampened => outcomes.dampened += 1,
            TriggerReason::Empty => outcomes.empty += 1,
        }

        snap.timing_stats.total_ms += event.time_ms;
        if event.time_ms > snap.timing_stats.max_ms {
            snap.timing_stats.max_ms = event.time_ms;
        }
        total_segments += event.segments;

        for label in &event.patterns_hit {
            *snap.pattern_hits.entry(label.clone()).or_insert(0) += 1;
        }
        for kind in &event.constraints {
            *snap.constraint_hits.entry(*kind).or_insert(0) += 1;
        }
    }

    // Compute averages
    let count = snap.outcome_stats.evaluations;
    if count > 0 {
        snap.timing_stats.avg_ms = snap.timing_stats.total_ms / count as f64;
        snap.timing_stats.avg_segments = total_segments as f64 / count as f64;
    }

    snap
}
