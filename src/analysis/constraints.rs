//! Constraint extraction: length, tone, format, audience, language, deadline
//! and include/exclude directives.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::sanitize::{clip, collapse_whitespace};
use super::types::{Constraint, ConstraintKind};

const UNITS: &str = r"words?|characters?|chars?|sentences?|paragraphs?|pages?|bullet\s+points?|bullets?|lines?|slides?|items?|points?|tweets?|minutes?";

const TONES: &str = r"formal|informal|casual|friendly|professional|persuasive|playful|humorous|witty|serious|empathetic|confident|neutral|warm|concise|upbeat|academic|conversational|polite|enthusiastic|diplomatic";

const FORMATS: &str = r"bullet(?:ed)?\s+(?:points|list)|bullets|numbered\s+list|table|list|markdown|json|csv|email|outline|slide\s+deck|slides?|memo|essay|report|faq|checklist|tweet\s+thread|thread|haiku|poem|script";

const AUDIENCES: &str = r"team|audience|customers?|clients?|students?|beginners?|executives?|engineers?|developers?|managers?|stakeholders?|investors?|readers?|users?|kids|children|board|leadership|employees|staff|parents|recruiters?|colleagues|followers|subscribers|newcomers";

const LANGUAGES: &str = r"english|spanish|french|german|italian|portuguese|dutch|chinese|mandarin|japanese|korean|arabic|hindi|russian|polish|turkish|swedish|greek|hebrew|vietnamese";

const MAX_DIRECTIVE_CHARS: usize = 80;

static LENGTH_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(\d{{1,5}})\s*(?:-|–|to)\s*(\d{{1,5}})[\s-]*({UNITS})\b"
    ))
    .expect("valid length range regex")
});

static LENGTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:(under|less\s+than|fewer\s+than|no\s+more\s+than|at\s+most|at\s+least|max(?:imum)?|about|around|roughly|over)\s+)?(\d{{1,5}})[\s-]*({UNITS})\b"
    ))
    .expect("valid length regex")
});

static TONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:({TONES})\s+(?:tone|voice|style)|tone\s*(?::|should\s+be|of|that\s+is)\s*(?:an?\s+)?([a-z]+)|(?:keep\s+it|make\s+it|sound|be)\s+(?:more\s+|very\s+|a\s+bit\s+|less\s+)?({TONES}))\b"
    ))
    .expect("valid tone regex")
});

static FORMAT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:(?:as|in|into)\s+(?:an?\s+|the\s+form\s+of\s+(?:an?\s+)?)?({FORMATS})|format(?:ted)?\s+(?:as|in)\s+(?:an?\s+)?([a-z-]+(?:\s+[a-z-]+)?))\b"
    ))
    .expect("valid format regex")
});

static AUDIENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:for|aimed\s+at|targeted\s+at|targeting|geared\s+towards?)\s+(?:the\s+|my\s+|our\s+|a\s+|an\s+|their\s+)?((?:[a-z][\w-]*\s+){{0,2}}?(?:{AUDIENCES}))\b"
    ))
    .expect("valid audience regex")
});

static LANGUAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b(?:in|into|to)\s+({LANGUAGES})\b")).expect("valid language regex")
});

static DEADLINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:by|before|due|until|no\s+later\s+than)\s+((?:this\s+|next\s+)?(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday)|today|tonight|tomorrow(?:\s+(?:morning|afternoon|evening))?|eod|eow|end\s+of\s+(?:the\s+)?(?:day|week|month|quarter)|noon|midnight|\d{1,2}(?::\d{2})?\s*(?:am|pm)|(?:jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?\s+\d{1,2}(?:st|nd|rd|th)?)\b",
    )
    .expect("valid deadline regex")
});

static INCLUDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:make\s+sure\s+to\s+(?:include|mention|cover)|be\s+sure\s+to\s+(?:include|mention)|include|including|mention|incorporate)\s+([^.;!?\n]+)",
    )
    .expect("valid include regex")
});

static EXCLUDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:exclude|excluding|avoid|avoiding|without|leave\s+out|don'?t\s+(?:include|mention|use)|do\s+not\s+(?:include|mention|use))\s+([^.;!?,\n]+)",
    )
    .expect("valid exclude regex")
});

/// Cuts an include directive where an exclude directive begins.
static DIRECTIVE_SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*(?:,\s*)?\b(?:and|but)\s+(?:avoid|exclude|don'?t|do\s+not|without|leave\s+out)\b")
        .expect("valid directive split regex")
});

/// Extracts every constraint from quote-normalized clause text, in order of
/// appearance, deduplicated by kind and value.
pub fn extract_constraints(text: &str) -> Vec<Constraint> {
    let mut found: Vec<(usize, Constraint)> = Vec::new();

    let ranges: Vec<(usize, usize)> = LENGTH_RANGE_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let unit = canonical_unit(&caps[3], 2);
            let value = format!("{}-{} {}", &caps[1], &caps[2], unit);
            found.push((
                whole.start(),
                constraint(ConstraintKind::LengthRange, value, whole.as_str()),
            ));
            Some((whole.start(), whole.end()))
        })
        .collect();

    for caps in LENGTH_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if ranges.iter().any(|&(s, e)| whole.start() < e && s < whole.end()) {
            continue;
        }
        let count: u32 = caps[2].parse().unwrap_or(0);
        let mut value = format!("{} {}", count, canonical_unit(&caps[3], count));
        if let Some(qualifier) = caps.get(1) {
            value = format!("{} {}", collapse_whitespace(&qualifier.as_str().to_lowercase()), value);
        }
        found.push((whole.start(), constraint(ConstraintKind::Length, value, whole.as_str())));
    }

    collect(&mut found, &TONE_RE, text, ConstraintKind::Tone, |caps| {
        first_group(caps, &[1, 2, 3]).map(|v| v.to_lowercase())
    });
    collect(&mut found, &FORMAT_RE, text, ConstraintKind::Format, |caps| {
        first_group(caps, &[1, 2]).map(|v| collapse_whitespace(&v.to_lowercase()))
    });
    collect(&mut found, &AUDIENCE_RE, text, ConstraintKind::Audience, |caps| {
        first_group(caps, &[1]).map(|v| collapse_whitespace(&v.to_lowercase()))
    });
    collect(&mut found, &LANGUAGE_RE, text, ConstraintKind::Language, |caps| {
        first_group(caps, &[1]).map(capitalize)
    });
    collect(&mut found, &DEADLINE_RE, text, ConstraintKind::Deadline, |caps| {
        first_group(caps, &[1]).map(|v| collapse_whitespace(&v))
    });
    collect(&mut found, &INCLUDE_RE, text, ConstraintKind::Include, |caps| {
        first_group(caps, &[1]).and_then(|v| directive_value(&v))
    });
    collect(&mut found, &EXCLUDE_RE, text, ConstraintKind::Exclude, |caps| {
        first_group(caps, &[1]).and_then(|v| directive_value(&v))
    });

    found.sort_by_key(|(start, _)| *start);

    let mut out: Vec<Constraint> = Vec::with_capacity(found.len());
    for (_, c) in found {
        if !out.iter().any(|o| o.kind == c.kind && o.value == c.value) {
            out.push(c);
        }
    }
    out
}

fn collect(
    found: &mut Vec<(usize, Constraint)>,
    re: &Regex,
    text: &str,
    kind: ConstraintKind,
    value: impl Fn(&Captures<'_>) -> Option<String>,
) {
    for caps in re.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if let Some(v) = value(&caps).filter(|v| !v.is_empty()) {
            found.push((whole.start(), constraint(kind, v, whole.as_str())));
        }
    }
}

fn constraint(kind: ConstraintKind, value: String, raw: &str) -> Constraint {
    Constraint {
        kind,
        value,
        raw: raw.trim().to_string(),
        target: None,
    }
}

fn first_group(caps: &Captures<'_>, groups: &[usize]) -> Option<String> {
    groups
        .iter()
        .find_map(|&i| caps.get(i))
        .map(|m| m.as_str().trim().to_string())
}

fn directive_value(raw: &str) -> Option<String> {
    let cut = match DIRECTIVE_SPLIT_RE.find(raw) {
        Some(m) => &raw[..m.start()],
        None => raw,
    };
    let value = clip(&collapse_whitespace(cut), MAX_DIRECTIVE_CHARS);
    let value = value.trim_end_matches([',', ':', ' ']).to_string();
    (!value.is_empty()).then_some(value)
}

/// Lowercases and singularizes a unit, then pluralizes it for `count`.
fn canonical_unit(raw: &str, count: u32) -> String {
    let lowered = collapse_whitespace(&raw.to_lowercase());
    let singular = match lowered.as_str() {
        "char" | "chars" => "character".to_string(),
        "bullet" | "bullets" => "bullet point".to_string(),
        other => other.strip_suffix('s').unwrap_or(other).to_string(),
    };
    if count == 1 {
        singular
    } else {
        format!("{singular}s")
    }
}

fn capitalize(word: String) -> String {
    let lowered = word.to_lowercase();
    let mut chars = lowered.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => lowered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<(ConstraintKind, String)> {
        extract_constraints(text).into_iter().map(|c| (c.kind, c.value)).collect()
    }

    #[test]
    fn length_is_normalized_to_plural_unit() {
        assert_eq!(kinds("a 500 word post"), vec![(ConstraintKind::Length, "500 words".to_string())]);
        assert_eq!(kinds("a 1-page memo")[0], (ConstraintKind::Length, "1 page".to_string()));
    }

    #[test]
    fn range_shadows_single_length() {
        assert_eq!(
            kinds("between 300-500 words please"),
            vec![(ConstraintKind::LengthRange, "300-500 words".to_string())]
        );
    }

    #[test]
    fn deadline_keeps_original_case() {
        assert_eq!(kinds("send it by Friday"), vec![(ConstraintKind::Deadline, "Friday".to_string())]);
        assert_eq!(kinds("due end of week")[0].1, "end of week");
    }

    #[test]
    fn tone_format_audience_language() {
        let found = kinds("Make it friendly, as a bulleted list for new hires in Spanish");
        assert!(found.contains(&(ConstraintKind::Tone, "friendly".to_string())));
        assert!(found.contains(&(ConstraintKind::Format, "bulleted list".to_string())));
        assert!(found.contains(&(ConstraintKind::Language, "Spanish".to_string())));
        assert!(!found.iter().any(|(k, _)| *k == ConstraintKind::Audience));

        let audience = kinds("an update for the marketing team");
        assert_eq!(audience, vec![(ConstraintKind::Audience, "marketing team".to_string())]);
    }

    #[test]
    fn include_stops_at_exclude_directive() {
        let found = kinds("Include pricing and FAQs but avoid jargon.");
        assert_eq!(
            found,
            vec![
                (ConstraintKind::Include, "pricing and FAQs".to_string()),
                (ConstraintKind::Exclude, "jargon".to_string()),
            ]
        );
    }
}
