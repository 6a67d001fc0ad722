//! Deterministic text analysis: segmentation, scoring, triggering and
//! highlight spans.

pub mod constraints;
pub mod lexicon;
pub mod patterns;
pub mod sanitize;
pub mod scorer;
pub mod segment;
pub mod spans;
pub mod trigger;
pub mod types;

pub use scorer::score_clause;
pub use segment::segment_clauses;
pub use spans::{extract_spans, HighlightSpan, SpanRole};
pub use trigger::{should_trigger, TriggerEvaluator, TRIGGER_THRESHOLD};
pub use types::*;
