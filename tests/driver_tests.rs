use std::sync::Arc;
use std::time::Duration;

use intentguard::config::EngineConfig;
use intentguard::orchestrator::{CycleDirection, DriverUpdate, SuggestionDriver};
use intentguard::suggest::{Guard, GuardStatus, InMemoryGuardCatalog, LocalUsage};
use intentguard::time::ManualClock;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;

const BLOG_REQUEST: &str =
    "Can you write a 500 word blog post about onboarding for the marketing team by Friday?";

fn guard(id: &str, title: &str, preview: &str) -> Guard {
    Guard {
        id: id.to_string(),
        title: title.to_string(),
        preview: preview.to_string(),
        body: String::new(),
        tags: vec!["marketing team".to_string()],
        task_label: None,
        status: GuardStatus::Active,
        local_usage: LocalUsage::default(),
    }
}

fn catalog() -> Arc<InMemoryGuardCatalog> {
    Arc::new(InMemoryGuardCatalog::with_clock(
        vec![
            guard("blog", "Write blog post", "Draft a 500 word blog post for the marketing team"),
            guard("post", "Write a blog post outline", "Outline a blog post about onboarding"),
        ],
        Arc::new(ManualClock::new(0)),
    ))
}

fn config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.suggestion.debounce_ms = 20;
    config
}

async fn next_update(rx: &mut UnboundedReceiver<DriverUpdate>) -> DriverUpdate {
    timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("update before timeout")
        .expect("driver still running")
}

#[tokio::test]
async fn debounced_text_produces_one_suggestion() {
    let (handle, mut updates, task) =
        SuggestionDriver::spawn(config(), catalog(), Arc::new(ManualClock::new(0)), None);
    let surface = handle.attach().await.unwrap();

    // Rapid keystrokes collapse into a single evaluation of the last text.
    handle.text_changed(surface, "Can you write", None).await;
    handle.text_changed(surface, "Can you write a 500 word", None).await;
    handle.text_changed(surface, BLOG_REQUEST, Some(BLOG_REQUEST.len())).await;

    match next_update(&mut updates).await {
        DriverUpdate::Suggested { surface: s, suggestion, highlights } => {
            assert_eq!(s, surface);
            assert_eq!(suggestion.guard.id, "blog");
            assert!(!highlights.is_empty());
        }
        other => panic!("unexpected update: {other:?}"),
    }
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(updates.try_recv().is_err());

    handle.shutdown();
    task.await.unwrap();
}

#[tokio::test]
async fn accept_records_usage_and_suppresses_refresh() {
    let catalog = catalog();
    let (handle, mut updates, task) =
        SuggestionDriver::spawn(config(), catalog.clone(), Arc::new(ManualClock::new(0)), None);
    let surface = handle.attach().await.unwrap();

    handle.text_changed(surface, BLOG_REQUEST, None).await;
    assert!(matches!(next_update(&mut updates).await, DriverUpdate::Suggested { .. }));

    handle.cycle(surface, CycleDirection::Next).await;
    let cycled = match next_update(&mut updates).await {
        DriverUpdate::Cycled { suggestion, .. } => suggestion,
        other => panic!("unexpected update: {other:?}"),
    };
    assert_eq!(cycled.index, 1);

    handle.accept(surface).await;
    assert!(matches!(next_update(&mut updates).await, DriverUpdate::Accepted { .. }));

    // Same text again: cooldown holds, nothing is published.
    handle.text_changed(surface, BLOG_REQUEST, None).await;
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert!(updates.try_recv().is_err());

    // The recorder drains in the background.
    let accepted_id = cycled.guard.id.clone();
    timeout(Duration::from_secs(2), async {
        loop {
            if catalog.guard(&accepted_id).await.unwrap().local_usage.accept_count == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("acceptance recorded");
    assert!(catalog.shown_count(&accepted_id).await >= 1);

    handle.shutdown();
    task.await.unwrap();
}

#[tokio::test]
async fn detach_cancels_pending_timer() {
    let mut config = config();
    config.suggestion.debounce_ms = 50;
    let (handle, mut updates, task) =
        SuggestionDriver::spawn(config, catalog(), Arc::new(ManualClock::new(0)), None);
    let surface = handle.attach().await.unwrap();

    handle.text_changed(surface, BLOG_REQUEST, None).await;
    handle.detach(surface).await;
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert!(updates.try_recv().is_err());

    handle.shutdown();
    task.await.unwrap();
}

#[tokio::test]
async fn shutdown_stops_the_loop() {
    let (handle, _updates, task) =
        SuggestionDriver::spawn(config(), catalog(), Arc::new(ManualClock::new(0)), None);
    assert!(handle.evaluate(BLOG_REQUEST).await.unwrap().trigger);

    handle.shutdown();
    task.await.unwrap();
    assert!(handle.is_shutdown());
    assert!(handle.attach().await.is_none());
}
