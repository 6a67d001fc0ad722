use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::types::{ConstraintKind, TriggerReason};
use crate::error::TelemetryError;
use crate::time::Millis;

// Allowed: labels, kinds, scores, counts, timings
// Forbidden: clause text, matched phrases, guard bodies

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEvent {
    pub event: TriggerReason,
    pub at: Millis,
    pub patterns_hit: Vec<String>,
    /// Highest clause score of the evaluation.
    pub score: u32,
    pub constraints: Vec<ConstraintKind>,
    pub time_ms: f64,
    pub segments: usize,
}

pub trait TelemetrySink: Send + Sync {
    fn emit(&self, event: TelemetryEvent) -> Result<(), TelemetryError>;
}

/// Forwards events to `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn emit(&self, event: TelemetryEvent) -> Result<(), TelemetryError> {
        debug!(
            event = event.event.as_str(),
            at = event.at,
            score = event.score,
            segments = event.segments,
            time_ms = event.time_ms,
            patterns = ?event.patterns_hit,
            constraints = ?event.constraints,
            "intent evaluation"
        );
        Ok(())
    }
}
