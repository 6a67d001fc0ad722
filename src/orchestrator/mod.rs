//! Per-surface suggestion lifecycle.

pub mod driver;
#[allow(clippy::module_inception)]
pub mod orchestrator;
pub mod registry;
pub mod state;
pub mod usage;

pub use driver::{DriverEvent, DriverHandle, DriverUpdate, SuggestionDriver};
pub use orchestrator::{EvaluationOutcome, EvaluationTicket, SuggestionOrchestrator};
pub use registry::SurfaceRegistry;
pub use state::{
    CooldownReason, CycleDirection, Suggestion, SuggestionCooldown, SuggestionPhase, SurfaceId,
    SurfaceState,
};
pub use usage::{spawn_usage_recorder, UsageEvent, UsageKind, UsageSink};
