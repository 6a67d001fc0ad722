use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use super::constraints::extract_constraints;
use super::lexicon::{
    alternation, contains_word, ACTION_VERBS, BACK_REFERENCE_PRONOUNS, DETERMINERS,
    OBJECT_CONNECTORS, OBJECT_PRONOUNS, TOPIC_FALSE_PREFIXES,
};
use super::patterns::{
    ClauseView, ACTION_OBJECT, ACTION_OBJECT_WEIGHT, CONSTRAINT, CONSTRAINT_WEIGHT,
    CONTINUATION_BULLETS, CONTINUATION_WEIGHT, MAX_CONSTRAINT_KINDS, PATTERN_TABLE,
};
use super::sanitize::{clip, normalize_quotes, preceding_word, sanitize};
use super::segment::{is_bullet_line, strip_bullet};
use super::types::{ClauseSegment, IntentAnalysis, ScoringContext};

pub const MAX_COMPONENTS: usize = 8;
const MAX_PHRASE_CHARS: usize = 80;
/// Consecutive clauses without action/object before the context is dropped.
const EMPTY_STREAK_LIMIT: u32 = 2;

static ACTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b(?:{})\b", alternation(ACTION_VERBS))).expect("valid action regex")
});

static CONNECTOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b(?:{})\b|[.,;:!?\n]", alternation(OBJECT_CONNECTORS)))
        .expect("valid connector regex")
});

static TOPIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:about|on|regarding|around)\s+").expect("valid topic regex")
});

static BACK_REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b(?:{})\b", alternation(BACK_REFERENCE_PRONOUNS)))
        .expect("valid back-reference regex")
});

/// Scores one clause and advances the cross-clause context.
///
/// Scoring is a pure function of `(segment, context)`: the same inputs always
/// yield the same score and pattern list.
pub fn score_clause(segment: &ClauseSegment, context: &mut ScoringContext) -> IntentAnalysis {
    if segment.paragraph_break_before {
        context.clear();
    }

    let normalized = normalize_quotes(&segment.text);
    let sanitized = sanitize(&segment.text);
    let (head, bullet_lines) = split_continuation(&normalized, segment.has_continuation);
    let sanitized_head = sanitize(head);

    let view = ClauseView { raw: &segment.text, sanitized: &sanitized, segment };
    let mut score = 0u32;
    let mut patterns_hit: Vec<String> = Vec::new();

    // 1. Table rules
    for rule in PATTERN_TABLE {
        if rule.matches(&view) {
            score += rule.weight;
            push_unique(&mut patterns_hit, rule.label);
        }
    }

    // 2. Constraints
    let mut constraints = extract_constraints(&normalized);
    if !constraints.is_empty() {
        let kinds: BTreeSet<_> = constraints.iter().map(|c| c.kind).collect();
        score += CONSTRAINT_WEIGHT * kinds.len().min(MAX_CONSTRAINT_KINDS) as u32;
        push_unique(&mut patterns_hit, CONSTRAINT);

        if BACK_REFERENCE_RE.is_match(&sanitized) {
            if let Some(target) = &context.last_object {
                for c in &mut constraints {
                    c.target = Some(target.clone());
                }
            }
        }
    }

    // 3. Action / object
    let (action, object) = extract_action_object(&sanitized_head);
    if action.is_some() {
        score += ACTION_OBJECT_WEIGHT;
        push_unique(&mut patterns_hit, ACTION_OBJECT);
    }

    // 4. Continuation
    let components: Vec<String> = bullet_lines
        .iter()
        .map(|line| clip(strip_bullet(line), MAX_PHRASE_CHARS))
        .filter(|c| !c.is_empty())
        .take(MAX_COMPONENTS)
        .collect();
    if segment.has_continuation {
        score += CONTINUATION_WEIGHT;
        push_unique(&mut patterns_hit, CONTINUATION_BULLETS);
    }

    let topic = extract_topic(&sanitized_head);

    advance_context(context, action.as_deref(), object.as_deref());

    IntentAnalysis {
        sanitized_text: sanitized,
        score,
        patterns_hit,
        constraints,
        action,
        object,
        components,
        topic,
    }
}

fn advance_context(context: &mut ScoringContext, action: Option<&str>, object: Option<&str>) {
    if action.is_some() || object.is_some() {
        if let Some(a) = action {
            context.last_action = Some(a.to_string());
        }
        if let Some(o) = object {
            context.last_object = Some(o.to_string());
        }
        context.empty_streak = 0;
    } else {
        context.empty_streak += 1;
        if context.empty_streak >= EMPTY_STREAK_LIMIT {
            context.last_action = None;
            context.last_object = None;
        }
    }
}

/// Splits a continuation clause into its lead-in line and its bullet lines.
fn split_continuation(text: &str, has_continuation: bool) -> (&str, Vec<&str>) {
    if !has_continuation {
        return (text, Vec::new());
    }
    let mut lines = text.lines();
    let head = lines.next().unwrap_or("");
    let bullets = lines.filter(|l| is_bullet_line(l)).collect();
    (head, bullets)
}

/// First whitelisted action verb, and the text after it up to a connector.
pub fn extract_action_object(sanitized: &str) -> (Option<String>, Option<String>) {
    let Some(verb) = ACTION_RE.find(sanitized) else {
        return (None, None);
    };
    let action = verb.as_str().to_string();
    let rest = &sanitized[verb.end()..];
    let phrase = match CONNECTOR_RE.find(rest) {
        Some(m) => &rest[..m.start()],
        None => rest,
    };

    let mut words: Vec<&str> = phrase.split_whitespace().collect();
    if words.first().is_some_and(|w| contains_word(OBJECT_PRONOUNS, w)) {
        words.remove(0);
    }
    if words.first().is_some_and(|w| matches!(*w, "a" | "an" | "the")) {
        words.remove(0);
    }
    // "make it formal" has no object of its own
    if words.first().is_some_and(|w| contains_word(BACK_REFERENCE_PRONOUNS, w)) {
        return (Some(action), None);
    }

    let object = clip(&words.join(" "), MAX_PHRASE_CHARS);
    (Some(action), (!object.is_empty()).then_some(object))
}

/// Text after "about/on/regarding/around" up to the next connector.
pub fn extract_topic(sanitized: &str) -> Option<String> {
    TOPIC_RE.find_iter(sanitized).find_map(|m| {
        if preceding_word(sanitized, m.start()).is_some_and(|w| contains_word(TOPIC_FALSE_PREFIXES, w)) {
            return None;
        }
        let rest = &sanitized[m.end()..];
        let phrase = match CONNECTOR_RE.find(rest) {
            Some(c) => &rest[..c.start()],
            None => rest,
        };
        let words: Vec<&str> = phrase
            .split_whitespace()
            .skip_while(|w| contains_word(DETERMINERS, w))
            .collect();
        let topic = clip(&words.join(" "), MAX_PHRASE_CHARS);
        (!topic.is_empty()).then_some(topic)
    })
}

fn push_unique(labels: &mut Vec<String>, label: &str) {
    if !labels.iter().any(|l| l == label) {
        labels.push(label.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_stops_at_connector() {
        let (action, object) = extract_action_object("can you write a 500 word blog post about onboarding");
        assert_eq!(action.as_deref(), Some("write"));
        assert_eq!(object.as_deref(), Some("500 word blog post"));
    }

    #[test]
    fn pronoun_object_is_dropped() {
        let (action, object) = extract_action_object("make it more formal");
        assert_eq!(action.as_deref(), Some("make"));
        assert_eq!(object, None);
    }

    #[test]
    fn topic_skips_false_prefixes() {
        assert_eq!(extract_topic("i'm working on a deck about q3 revenue"), Some("q3 revenue".to_string()));
        assert_eq!(extract_topic("nothing here"), None);
    }
}
