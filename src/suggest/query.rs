use crate::analysis::{ConstraintKind, IntentSummary, TriggerResult};

use super::types::QueryFeatures;

/// Constraint kinds whose values double as tag hints.
const TAG_CONSTRAINTS: &[ConstraintKind] = &[
    ConstraintKind::Tone,
    ConstraintKind::Format,
    ConstraintKind::Audience,
    ConstraintKind::Language,
];

/// Builds matcher input from a structured intent.
///
/// The label is the action plus its object, falling back to the matched
/// phrase when neither was extracted. The tail carries topic, bullet
/// components and constraint values.
pub fn query_from_summary(summary: &IntentSummary, matched_phrase: Option<&str>) -> QueryFeatures {
    let label: Vec<&str> = [summary.intent.as_deref(), summary.object.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    let label_text = if label.is_empty() {
        matched_phrase.unwrap_or_default().trim().to_string()
    } else {
        label.join(" ")
    };

    let mut tail: Vec<&str> = Vec::new();
    tail.extend(summary.topic.as_deref());
    tail.extend(summary.components.iter().map(String::as_str));
    tail.extend(summary.constraints.values().map(String::as_str));

    let mut tags: Vec<String> = summary.topic.iter().cloned().collect();
    for kind in TAG_CONSTRAINTS {
        if let Some(value) = summary.constraints.get(kind) {
            tags.push(value.clone());
        }
    }

    QueryFeatures::new(label_text, tail.join(" "), &tags)
}

/// `None` unless the result fired with a summary.
pub fn query_from_trigger(result: &TriggerResult) -> Option<QueryFeatures> {
    if !result.trigger {
        return None;
    }
    let summary = result.intent_summary.as_ref()?;
    let query = query_from_summary(summary, result.matched_phrase.as_deref());
    (!query.is_empty()).then_some(query)
}
