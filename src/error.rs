use thiserror::Error;

/// Failures surfaced by a guard catalog provider.
/// The orchestrator never propagates these; they degrade to "no suggestion".
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("guard catalog unavailable: {0}")]
    Unavailable(String),
    #[error("unknown guard: {0}")]
    UnknownGuard(String),
    #[error("guard catalog io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("guard catalog decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("telemetry buffer poisoned")]
    Poisoned,
    #[error("telemetry sink closed")]
    Closed,
}
