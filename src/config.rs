use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::time::{Millis, MINUTE_MS};

/// Top-level engine configuration. Every section falls back to its defaults
/// when omitted from the JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub trigger: TriggerConfig,
    pub matcher: MatcherConfig,
    pub suggestion: SuggestionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Window added to `now` when a trigger fires.
    pub cooldown_ms: Millis,
    /// Phrases that suppress triggering outright. Product configuration;
    /// matched case-insensitively against the whole text.
    pub dampening_phrases: Vec<String>,
    /// Texts with fewer words than this report `short-no-intent`.
    /// `None` disables the distinction.
    pub short_text_words: Option<usize>,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 8_000,
            dampening_phrases: Vec::new(),
            short_text_words: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub min_score: f64,
    pub max_candidates: usize,
    /// Acceptances newer than this earn the recency boost.
    pub recent_accept_window_ms: Millis,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            min_score: 0.28,
            max_candidates: 5,
            recent_accept_window_ms: 30 * MINUTE_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    pub debounce_ms: Millis,
    /// Characters typed past the cooldown baseline that release the cooldown.
    pub cooldown_release_chars: usize,
    /// Words typed past the cooldown baseline that release the cooldown.
    pub cooldown_release_words: usize,
    /// Optional hard expiry for a cooldown.
    pub cooldown_ttl_ms: Option<Millis>,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 350,
            cooldown_release_chars: 24,
            cooldown_release_words: 4,
            cooldown_ttl_ms: None,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.matcher.min_score) {
            return Err(ConfigError::Invalid(format!(
                "matcher.min_score must be within [0, 1], got {}",
                self.matcher.min_score
            )));
        }
        if self.matcher.max_candidates == 0 {
            return Err(ConfigError::Invalid("matcher.max_candidates must be > 0".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_keeps_defaults() {
        let config = EngineConfig::from_json_str(
            r#"{ "trigger": { "dampening_phrases": ["just kidding"], "short_text_words": 4 } }"#,
        )
        .unwrap();
        assert_eq!(config.trigger.dampening_phrases, vec!["just kidding".to_string()]);
        assert_eq!(config.trigger.short_text_words, Some(4));
        assert_eq!(config.trigger.cooldown_ms, 8_000);
        assert_eq!(config.matcher, MatcherConfig::default());
    }

    #[test]
    fn rejects_out_of_range_min_score() {
        let err = EngineConfig::from_json_str(r#"{ "matcher": { "min_score": 1.5 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
