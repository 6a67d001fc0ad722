//! Development-only evaluation telemetry.
//!
//! # SAFETY INVARIANT
//! Telemetry is a write-only side channel. It must **never** be read by the
//! trigger, matcher or orchestrator, and a failing sink must never change an
//! evaluation result.
//!
//! # PRIVACY INVARIANT
//! Events carry pattern labels, constraint kinds, scores and timings only.
//! User text never enters a telemetry event.

pub mod event;
pub mod metrics;
pub mod recorder;

pub use event::{TelemetryEvent, TelemetrySink, TracingSink};
pub use metrics::{compute_snapshot, TelemetrySnapshot};
pub use recorder::TelemetryRecorder;
