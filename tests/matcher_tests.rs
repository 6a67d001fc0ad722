use intentguard::suggest::{
    query_from_trigger, Guard, GuardStatus, LocalUsage, QueryFeatures, SuggestionMatcher,
};
use intentguard::should_trigger;

fn guard(id: &str, title: &str, preview: &str, tags: &[&str]) -> Guard {
    Guard {
        id: id.to_string(),
        title: title.to_string(),
        preview: preview.to_string(),
        body: format!("{title} body"),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        task_label: None,
        status: GuardStatus::Active,
        local_usage: LocalUsage::default(),
    }
}

fn blog_query() -> QueryFeatures {
    let result = should_trigger(
        "Can you write a 500 word blog post about onboarding for the marketing team by Friday?",
        0,
    );
    query_from_trigger(&result).expect("query for fired trigger")
}

#[test]
fn only_active_guards_are_ranked() {
    let mut archived = guard("old", "Write blog post", "Draft a blog post", &[]);
    archived.status = GuardStatus::Archived;
    let mut draft = guard("wip", "Write blog post", "Draft a blog post", &[]);
    draft.status = GuardStatus::Draft;
    let active = guard("live", "Invoice reminder", "Remind a client about an invoice", &[]);

    let ranked = SuggestionMatcher::default().rank(&[archived, draft, active], &blog_query(), 0);
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].guard.id, "live");
}

#[test]
fn ranking_is_sorted_and_relevant_first() {
    let guards = vec![
        guard("invoice", "Invoice reminder", "Remind a client about an unpaid invoice", &["billing"]),
        guard(
            "blog",
            "Write blog post",
            "Draft a 500 word blog post for the marketing team",
            &["onboarding", "marketing team"],
        ),
    ];
    let matcher = SuggestionMatcher::default();
    let ranked = matcher.rank(&guards, &blog_query(), 0);

    assert_eq!(ranked[0].guard.id, "blog");
    assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    assert!(ranked.iter().all(|c| (0.0..=1.0).contains(&c.score)));

    let selected = matcher.select(ranked);
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].guard.id, "blog");
}

#[test]
fn acceptance_count_is_monotonic() {
    let mut popular = guard("a", "Meeting notes", "Summarize meeting notes", &["notes"]);
    popular.local_usage.accept_count = 3;
    let mut quiet = popular.clone();
    quiet.id = "b".to_string();
    quiet.local_usage.accept_count = 1;

    let matcher = SuggestionMatcher::default();
    let query = QueryFeatures::new("summarize meeting notes", "", &[]);
    let a = matcher.score_guard(&popular, &query, 0);
    let b = matcher.score_guard(&quiet, &query, 0);
    assert_eq!(a.preview, b.preview);
    assert_eq!(a.character, b.character);
    assert_eq!(a.tag, b.tag);
    assert!(a.combined >= b.combined);
}

#[test]
fn ties_keep_catalog_order() {
    let first = guard("first", "Cover letter", "Tailored cover letter", &[]);
    let mut second = first.clone();
    second.id = "second".to_string();
    let ranked = SuggestionMatcher::default().rank(
        &[first, second],
        &QueryFeatures::new("cover letter", "", &[]),
        0,
    );
    assert_eq!(ranked[0].guard.id, "first");
    assert_eq!(ranked[1].guard.id, "second");
}

#[test]
fn rejections_push_scores_down_but_not_below_zero() {
    let mut rejected = guard("r", "Haiku", "A haiku", &[]);
    rejected.local_usage.reject_count = 50;
    let breakdown = SuggestionMatcher::default().score_guard(
        &rejected,
        &QueryFeatures::new("quarterly tax filing", "", &[]),
        0,
    );
    assert!(breakdown.usage_boost < 0.0);
    assert_eq!(breakdown.combined, 0.0);
}

#[test]
fn select_caps_candidate_count() {
    let guards: Vec<Guard> = (0..8)
        .map(|i| guard(&format!("g{i}"), "Cover letter", "Tailored cover letter", &[]))
        .collect();
    let matcher = SuggestionMatcher::default();
    let selected = matcher.rank_and_select(&guards, &QueryFeatures::new("cover letter", "", &[]), 0);
    assert_eq!(selected.len(), 5);
}
