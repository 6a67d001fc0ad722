pub mod analysis;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod suggest;
pub mod telemetry;
pub mod time;

// Re-export the entry points collaborators reach for first
pub use analysis::{should_trigger, TriggerEvaluator, TriggerResult};
pub use config::EngineConfig;
pub use orchestrator::{SuggestionDriver, SuggestionOrchestrator, SurfaceId};
pub use suggest::{GuardCatalog, InMemoryGuardCatalog, SuggestionMatcher};
