use intentguard::analysis::{extract_spans, should_trigger, SpanRole};
use proptest::prelude::*;

#[test]
fn spans_for_fired_clause_are_document_relative() {
    let doc = "Quick update. Please send my manager a recap about the Q3 budget.";
    let result = should_trigger(doc, 0);
    assert!(result.trigger);
    let segment = result
        .matched_segments
        .iter()
        .find(|s| s.text.contains("manager"))
        .expect("matched clause");

    let spans = extract_spans(&segment.text, segment.start, doc.len());
    let recipient = spans.iter().find(|s| s.role == SpanRole::Recipient).unwrap();
    assert_eq!(&doc[recipient.start..recipient.end], "manager");
    let topics: Vec<&str> = spans
        .iter()
        .filter(|s| s.role == SpanRole::Topic)
        .map(|s| &doc[s.start..s.end])
        .collect();
    assert!(topics.iter().any(|t| t.contains("q3 budget") || t.contains("Q3 budget")));
}

#[test]
fn spans_are_sorted_and_capped() {
    let clause = "Write a short note for my boss about the offsite on Friday regarding travel";
    let spans = extract_spans(clause, 0, clause.len());
    assert!(spans.len() <= 8);
    assert!(spans.windows(2).all(|w| w[0].start <= w[1].start));
}

#[test]
fn offsets_clamp_to_document_length() {
    let clause = "Draft a memo about hiring";
    let spans = extract_spans(clause, 10, 15);
    assert!(spans.iter().all(|s| s.start <= s.end && s.end <= 15));
}

fn role_texts<'a>(clause: &'a str, role: SpanRole) -> Vec<&'a str> {
    extract_spans(clause, 0, clause.len())
        .into_iter()
        .filter(|s| s.role == role)
        .map(|s| &clause[s.start..s.end])
        .collect()
}

#[test]
fn topic_hint_noun_supplies_topic_without_preposition() {
    let clause = "Draft something, subject: vendor review";
    assert!(role_texts(clause, SpanRole::Topic).contains(&"vendor review"));
}

#[test]
fn topic_hint_phrase_is_capped_at_32_bytes() {
    let clause = "Draft something, subject: quarterly vendor review and renewal planning notes";
    let topics = role_texts(clause, SpanRole::Topic);
    assert!(topics.contains(&"quarterly vendor review and rene"));
}

#[test]
fn request_prefix_anchors_action_when_no_verb_matches() {
    let clause = "Could you take a look at the deck?";
    assert_eq!(role_texts(clause, SpanRole::Action), vec!["Could you"]);
}

#[test]
fn third_party_prefix_anchors_action() {
    let clause = "My boss expects slides by Friday.";
    assert_eq!(role_texts(clause, SpanRole::Action), vec!["My boss"]);
    assert_eq!(role_texts(clause, SpanRole::Recipient), vec!["boss"]);
}

proptest! {
    #[test]
    fn spans_stay_in_bounds(
        clause in "[a-zA-Z0-9 ,.éü'-]{0,120}",
        offset in 0usize..64,
        slack in 0usize..64,
    ) {
        let doc_len = offset + clause.len() / 2 + slack;
        for span in extract_spans(&clause, offset, doc_len) {
            prop_assert!(span.start <= span.end);
            prop_assert!(span.end <= doc_len);
        }
    }
}
