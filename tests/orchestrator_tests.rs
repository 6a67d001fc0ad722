use std::sync::Arc;

use intentguard::config::EngineConfig;
use intentguard::error::CatalogError;
use intentguard::orchestrator::{
    CooldownReason, CycleDirection, EvaluationOutcome, SuggestionOrchestrator, SuggestionPhase,
    UsageKind, UsageSink,
};
use intentguard::suggest::{Guard, GuardCatalog, GuardStatus, InMemoryGuardCatalog, LocalUsage};
use intentguard::time::ManualClock;

const BLOG_REQUEST: &str =
    "Can you write a 500 word blog post about onboarding for the marketing team by Friday?";

fn guard(id: &str, title: &str, preview: &str, tags: &[&str], accepts: u32) -> Guard {
    Guard {
        id: id.to_string(),
        title: title.to_string(),
        preview: preview.to_string(),
        body: String::new(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        task_label: None,
        status: GuardStatus::Active,
        local_usage: LocalUsage { accept_count: accepts, ..LocalUsage::default() },
    }
}

fn catalog() -> InMemoryGuardCatalog {
    let mut archived = guard("archived", "Write blog post", "Draft a blog post", &[], 0);
    archived.status = GuardStatus::Archived;
    InMemoryGuardCatalog::new(vec![
        guard(
            "blog",
            "Write blog post",
            "Draft a 500 word blog post for the marketing team",
            &["onboarding", "marketing team"],
            0,
        ),
        guard(
            "update",
            "Marketing team update",
            "Weekly update for the marketing team about onboarding",
            &["marketing team"],
            2,
        ),
        guard("invoice", "Invoice reminder", "Remind a client about an unpaid invoice", &["billing"], 0),
        archived,
    ])
}

fn orchestrator() -> (SuggestionOrchestrator, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(1_000_000));
    let orchestrator = SuggestionOrchestrator::with_parts(EngineConfig::default(), clock.clone(), UsageSink::disabled());
    (orchestrator, clock)
}

/// Catalog whose fetch always fails.
struct OfflineCatalog;

impl GuardCatalog for OfflineCatalog {
    async fn get_guard_cache(&self) -> Result<Vec<Guard>, CatalogError> {
        Err(CatalogError::Unavailable("offline".into()))
    }

    async fn record_guard_shown(&self, _id: String) -> Result<(), CatalogError> {
        Ok(())
    }

    async fn record_guard_acceptance(&self, _id: String) -> Result<(), CatalogError> {
        Ok(())
    }

    async fn record_guard_rejection(&self, _id: String) -> Result<(), CatalogError> {
        Ok(())
    }
}

#[tokio::test]
async fn refresh_offers_best_candidate() {
    let (mut orch, _) = orchestrator();
    let surface = orch.attach_surface();

    let suggestion = orch.refresh_suggestion(surface, BLOG_REQUEST, &catalog()).await.unwrap();
    assert_eq!(suggestion.guard.id, "blog");
    assert_eq!(suggestion.index, 0);
    assert_eq!(suggestion.total, 2);
    assert_eq!(suggestion.matched_offset, Some(0));

    let state = orch.surface(surface).unwrap();
    assert_eq!(state.phase, SuggestionPhase::Suggested);
    assert!(state.suggestion_candidates.iter().all(|c| c.guard.status == GuardStatus::Active));
    assert!(!state.highlights.is_empty());
}

#[tokio::test]
async fn cycling_wraps_both_ways() {
    let (mut orch, _) = orchestrator();
    let surface = orch.attach_surface();
    orch.refresh_suggestion(surface, BLOG_REQUEST, &catalog()).await.unwrap();

    let next = orch.cycle_suggestion(surface, CycleDirection::Next).unwrap();
    assert_eq!((next.index, next.guard.id.as_str()), (1, "update"));
    let wrapped = orch.cycle_suggestion(surface, CycleDirection::Next).unwrap();
    assert_eq!((wrapped.index, wrapped.guard.id.as_str()), (0, "blog"));
    let back = orch.cycle_suggestion(surface, CycleDirection::Previous).unwrap();
    assert_eq!(back.index, 1);
    assert_eq!(orch.surface(surface).unwrap().phase, SuggestionPhase::Cycling);
}

#[tokio::test]
async fn cooldown_blocks_until_cleared() {
    let (mut orch, _) = orchestrator();
    let surface = orch.attach_surface();
    let catalog = catalog();
    orch.refresh_suggestion(surface, BLOG_REQUEST, &catalog).await.unwrap();

    let accepted = orch.mark_suggestion_accepted(surface).unwrap();
    assert_eq!(accepted.guard.id, "blog");
    let state = orch.surface(surface).unwrap();
    assert_eq!(state.phase, SuggestionPhase::Accepted);
    assert!(state.suggestion_cooldown.active);
    assert_eq!(state.suggestion_cooldown.reason, Some(CooldownReason::Accepted));

    assert!(orch.refresh_suggestion(surface, BLOG_REQUEST, &catalog).await.is_none());
    assert!(orch.refresh_suggestion(surface, &format!("{BLOG_REQUEST} Ok"), &catalog).await.is_none());

    assert!(orch.clear_suggestion_cooldown(surface));
    assert!(orch.refresh_suggestion(surface, BLOG_REQUEST, &catalog).await.is_some());
}

#[tokio::test]
async fn cooldown_releases_after_enough_typing() {
    let (mut orch, _) = orchestrator();
    let surface = orch.attach_surface();
    let catalog = catalog();
    orch.refresh_suggestion(surface, BLOG_REQUEST, &catalog).await.unwrap();
    orch.mark_suggestion_dismissed(surface).unwrap();
    assert_eq!(orch.surface(surface).unwrap().phase, SuggestionPhase::Dismissed);

    let longer = format!("{BLOG_REQUEST} Keep the intro short and mention the new dashboard.");
    assert!(orch.note_text_change(surface, &longer, Some(longer.len())));
    assert!(!orch.surface(surface).unwrap().is_cooling_down());
    assert!(orch.refresh_suggestion(surface, &longer, &catalog).await.is_some());
}

#[tokio::test]
async fn manual_cooldown_expires_with_ttl() {
    let clock = Arc::new(ManualClock::new(0));
    let mut config = EngineConfig::default();
    config.suggestion.cooldown_ttl_ms = Some(5_000);
    let mut orch = SuggestionOrchestrator::with_parts(config, clock.clone(), UsageSink::disabled());
    let surface = orch.attach_surface();

    orch.note_text_change(surface, BLOG_REQUEST, None);
    assert!(orch.activate_suggestion_cooldown(surface, CooldownReason::Manual));
    assert!(orch.refresh_suggestion(surface, BLOG_REQUEST, &catalog()).await.is_none());

    clock.advance(5_000);
    assert!(orch.refresh_suggestion(surface, BLOG_REQUEST, &catalog()).await.is_some());
}

#[test]
fn stale_ticket_is_discarded() {
    let (mut orch, _) = orchestrator();
    let surface = orch.attach_surface();

    let stale = orch.begin_evaluation(surface, BLOG_REQUEST).unwrap();
    let fresh = orch.begin_evaluation(surface, BLOG_REQUEST).unwrap();
    assert!(fresh.token > stale.token);

    let guards = vec![guard("blog", "Write blog post", "Draft a 500 word blog post", &[], 0)];
    assert_eq!(orch.complete_evaluation(stale, Ok(guards.clone())), EvaluationOutcome::Stale);
    assert!(orch.surface(surface).unwrap().suggestion.is_none());

    let outcome = orch.complete_evaluation(fresh, Ok(guards));
    assert!(matches!(outcome, EvaluationOutcome::Suggested(_)));
}

#[test]
fn completion_after_detach_is_stale() {
    let (mut orch, _) = orchestrator();
    let surface = orch.attach_surface();
    let ticket = orch.begin_evaluation(surface, BLOG_REQUEST).unwrap();
    assert!(orch.detach_surface(surface));
    assert_eq!(orch.complete_evaluation(ticket, Ok(Vec::new())), EvaluationOutcome::Stale);
}

#[tokio::test]
async fn empty_ranking_clears_state() {
    let (mut orch, _) = orchestrator();
    let surface = orch.attach_surface();
    orch.refresh_suggestion(surface, BLOG_REQUEST, &catalog()).await.unwrap();

    let unrelated = InMemoryGuardCatalog::new(vec![guard(
        "invoice",
        "Invoice reminder",
        "Remind a client about an unpaid invoice",
        &[],
        0,
    )]);
    assert!(orch.refresh_suggestion(surface, BLOG_REQUEST, &unrelated).await.is_none());
    let state = orch.surface(surface).unwrap();
    assert!(state.suggestion.is_none());
    assert!(state.suggestion_candidates.is_empty());
    assert_eq!(state.phase, SuggestionPhase::Idle);
}

#[tokio::test]
async fn failed_fetch_degrades_to_no_suggestion() {
    let (mut orch, _) = orchestrator();
    let surface = orch.attach_surface();
    assert!(orch.refresh_suggestion(surface, BLOG_REQUEST, &OfflineCatalog).await.is_none());
    assert_eq!(orch.surface(surface).unwrap().phase, SuggestionPhase::Idle);
}

#[tokio::test]
async fn non_intent_text_never_fetches() {
    let (mut orch, _) = orchestrator();
    let surface = orch.attach_surface();
    assert!(orch.begin_evaluation(surface, "hi there, how are you").is_none());
    assert!(orch.refresh_suggestion(surface, "", &catalog()).await.is_none());
}

#[test]
fn surfaces_are_independent() {
    let (mut orch, _) = orchestrator();
    let a = orch.attach_surface();
    let b = orch.attach_surface();
    orch.activate_suggestion_cooldown(a, CooldownReason::Manual);
    assert!(orch.surface(a).unwrap().is_cooling_down());
    assert!(!orch.surface(b).unwrap().is_cooling_down());
    assert!(orch.begin_evaluation(b, BLOG_REQUEST).is_some());
}

#[tokio::test]
async fn usage_is_recorded_fire_and_forget() {
    let clock = Arc::new(ManualClock::new(0));
    let (usage, mut rx) = UsageSink::channel();
    let mut orch = SuggestionOrchestrator::with_parts(EngineConfig::default(), clock, usage);
    let surface = orch.attach_surface();

    orch.refresh_suggestion(surface, BLOG_REQUEST, &catalog()).await.unwrap();
    orch.cycle_suggestion(surface, CycleDirection::Next).unwrap();
    orch.mark_suggestion_accepted(surface).unwrap();
    drop(orch);

    let mut kinds = Vec::new();
    while let Some(event) = rx.recv().await {
        kinds.push((event.guard_id, event.kind));
    }
    assert_eq!(
        kinds,
        vec![
            ("blog".to_string(), UsageKind::Shown),
            ("update".to_string(), UsageKind::Shown),
            ("update".to_string(), UsageKind::Accepted),
        ]
    );
}
