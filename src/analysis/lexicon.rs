//! Word and phrase lists consumed by the scorer and span extractor.
//!
//! These are product content, kept apart from the matching logic so they can
//! be tuned without touching control flow.

pub const ACTION_VERBS: &[&str] = &[
    "write", "draft", "create", "make", "build", "generate", "summarize", "summarise",
    "rewrite", "edit", "review", "explain", "translate", "outline", "plan", "prepare",
    "design", "compose", "develop", "analyze", "analyse", "list", "compare", "fix",
    "update", "improve", "research", "find", "send", "schedule", "organize", "organise",
    "brainstorm", "proofread", "convert", "calculate", "describe", "suggest", "recommend",
    "reply", "respond", "answer", "document", "refactor", "implement", "polish", "shorten",
    "expand", "simplify", "check", "craft", "produce", "rephrase", "paraphrase", "format",
    "debug",
];

/// Multi-word (and a few single-word) command phrases.
pub const COMMAND_PHRASES: &[&str] = &[
    "put together", "pull together", "compile", "assemble", "set up", "follow up with",
    "send over", "hand off", "ship the", "come up with", "write up", "draw up", "map out",
    "flesh out", "spin up", "kick off", "wrap up", "break down", "go over", "look into",
];

/// Discourse filler stripped before scoring (whole-word, case-insensitive).
pub const FILLER_PHRASES: &[&str] = &[
    "good morning", "good afternoon", "good evening", "hello", "hi", "hey", "please", "kindly",
    "thank you", "thanks", "maybe", "perhaps", "i think", "i guess", "i suppose", "basically",
    "actually", "honestly", "just", "quick question", "i was wondering if", "i wonder if",
    "fyi", "btw", "so yeah", "um", "uh",
];

pub const TRANSITION_MARKERS: &[&str] = &[
    "ok", "okay", "alright", "next", "now", "then", "also", "finally", "after that",
    "and then", "additionally", "lastly",
];

pub const THIRD_PARTY_NOUNS: &[&str] = &[
    "boss", "manager", "team", "client", "customer", "teacher", "professor", "lead", "cto",
    "ceo", "colleague", "coworker", "stakeholders", "stakeholder", "editor", "supervisor",
    "director",
];

pub const PASSIVE_VERBS: &[&str] = &[
    "asked", "wants", "needs", "told", "requested", "assigned", "expects", "wanted", "needed",
];

/// Words directly before "to <verb>" that make it a false positive
/// ("according to plan", "next to review").
pub const TO_VERB_FALSE_PREFIXES: &[&str] =
    &["according", "close", "due", "used", "next", "look", "similar", "compared"];

/// Words that end an extracted object.
pub const OBJECT_CONNECTORS: &[&str] = &[
    "for", "about", "on", "with", "using", "by", "that", "which", "who", "to", "into",
    "in order", "regarding",
];

pub const BACK_REFERENCE_PRONOUNS: &[&str] = &["it", "this", "that", "them", "those", "these"];

/// Request openers used as action anchors for highlighting.
pub const REQUEST_PREFIXES: &[&str] = &[
    "can you", "could you", "would you", "will you", "help me", "i need", "i want",
    "we need", "please", "how to",
];

pub const THIRD_PARTY_PREFIXES: &[&str] = &[
    "my boss", "my manager", "my team", "the client", "my client", "my teacher",
    "my professor", "our team",
];

/// Leading words peeled off when no anchor matched.
pub const LEADING_HELPERS: &[&str] = &[
    "i'm", "we're", "i", "we", "you", "am", "is", "are", "was", "will", "would", "should",
    "can", "could", "to", "please", "just", "really", "gonna", "going", "need", "want",
];

pub const RECIPIENT_NOUNS: &[&str] = &[
    "boss", "manager", "team", "client", "customer", "professor", "teacher", "colleague",
    "landlord", "recruiter", "hr", "ceo", "investors", "investor", "stakeholders", "audience",
    "students", "reviewer",
];

pub const TOPIC_PREPOSITIONS: &[&str] =
    &["about", "regarding", "concerning", "around", "on", "for", "of"];

pub const TOPIC_HINT_NOUNS: &[&str] = &["topic", "subject", "titled", "called", "named", "re"];

/// Words that end a direct-object span.
pub const SPAN_STOP_WORDS: &[&str] = &[
    "about", "for", "to", "with", "on", "in", "by", "from", "regarding", "and", "or", "but",
    "so", "because", "that", "which", "using", "at",
];

pub const DETERMINERS: &[&str] = &[
    "a", "an", "the", "this", "that", "these", "those", "my", "our", "your", "their", "his",
    "her", "some", "one", "two", "three", "four", "five", "ten",
];

/// Words before "on"/"about" that make the following text something other
/// than a topic ("working on", "based on").
pub const TOPIC_FALSE_PREFIXES: &[&str] = &[
    "working", "based", "focus", "focused", "depending", "depends", "rely", "later", "catch",
    "follow", "carry", "move", "going", "hold", "log",
];

pub const OBJECT_PRONOUNS: &[&str] = &["me", "us", "him", "her", "them", "you"];

/// Builds a case-insensitive alternation over `words`, longest first so that
/// "follow up with" wins over "follow".
pub fn alternation(words: &[&str]) -> String {
    let mut sorted: Vec<&str> = words.to_vec();
    sorted.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    sorted
        .iter()
        .map(|w| regex::escape(w).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|")
}

pub fn contains_word(words: &[&str], candidate: &str) -> bool {
    words.iter().any(|w| w.eq_ignore_ascii_case(candidate))
}
