use serde::{Deserialize, Serialize};

use super::tokenize::{tokenize, tokenize_all};
use crate::time::Millis;

pub type GuardId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuardStatus {
    #[default]
    Active,
    Draft,
    Archived,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalUsage {
    pub accept_count: u32,
    pub reject_count: u32,
    pub last_accepted_at: Option<Millis>,
}

/// A canned instruction block offered as a suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guard {
    pub id: GuardId,
    pub title: String,
    #[serde(default)]
    pub preview: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub task_label: Option<String>,
    #[serde(default)]
    pub status: GuardStatus,
    #[serde(default)]
    pub local_usage: LocalUsage,
}

impl Guard {
    pub fn is_active(&self) -> bool {
        self.status == GuardStatus::Active
    }
}

/// Tokenized view of what the user is asking for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryFeatures {
    pub label_text: String,
    pub tail_text: String,
    pub label_tokens: Vec<String>,
    pub tail_tokens: Vec<String>,
    pub tag_tokens: Vec<String>,
}

impl QueryFeatures {
    pub fn new(label_text: impl Into<String>, tail_text: impl Into<String>, tags: &[String]) -> Self {
        let label_text = label_text.into();
        let tail_text = tail_text.into();
        Self {
            label_tokens: tokenize(&label_text),
            tail_tokens: tokenize(&tail_text),
            tag_tokens: tokenize_all(tags.iter().map(String::as_str)),
            label_text,
            tail_text,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.label_tokens.is_empty() && self.tail_tokens.is_empty() && self.tag_tokens.is_empty()
    }
}

/// Per-component scores kept for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base: f64,
    pub preview: f64,
    pub character: f64,
    pub tag: f64,
    pub usage_boost: f64,
    pub combined: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub guard: Guard,
    /// Within [0, 1].
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}
