//! Async driver for the orchestrator.
//!
//! One task owns the [`SuggestionOrchestrator`] and is fed through a single
//! channel. The only suspension points are the per-surface debounce timer and
//! the catalog fetch, both of which run on spawned tasks and report back
//! through the same channel. Fetch results carry the generation token they
//! were launched with; the orchestrator drops them if the token moved on.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::orchestrator::{EvaluationOutcome, EvaluationTicket, SuggestionOrchestrator};
use super::state::{CycleDirection, Suggestion, SurfaceId};
use super::usage::{spawn_usage_recorder, UsageSink};
use crate::analysis::{HighlightSpan, TriggerResult};
use crate::config::EngineConfig;
use crate::error::CatalogError;
use crate::suggest::{Guard, GuardCatalog};
use crate::telemetry::TelemetrySink;
use crate::time::Clock;

const EVENT_BUFFER: usize = 256;

/// Inputs to the driver loop.
#[derive(Debug)]
pub enum DriverEvent {
    Attach { reply: oneshot::Sender<SurfaceId> },
    Detach(SurfaceId),
    TextChanged { surface: SurfaceId, text: String, caret: Option<usize> },
    Cycle { surface: SurfaceId, direction: CycleDirection },
    Accept(SurfaceId),
    Dismiss(SurfaceId),
    Evaluate { text: String, reply: oneshot::Sender<TriggerResult> },
    /// `arm` identifies the timer that fired; superseded timers are ignored.
    DebounceElapsed { surface: SurfaceId, arm: u64, text: String },
    CatalogFetched { ticket: EvaluationTicket, guards: Result<Vec<Guard>, CatalogError> },
}

/// What collaborators observe.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverUpdate {
    Suggested { surface: SurfaceId, suggestion: Suggestion, highlights: Vec<HighlightSpan> },
    Cycled { surface: SurfaceId, suggestion: Suggestion },
    Cleared { surface: SurfaceId },
    Accepted { surface: SurfaceId, suggestion: Suggestion },
    Dismissed { surface: SurfaceId, suggestion: Suggestion },
}

/// Cloneable front end for a running driver.
#[derive(Debug, Clone)]
pub struct DriverHandle {
    tx: mpsc::Sender<DriverEvent>,
    shutdown: CancellationToken,
}

impl DriverHandle {
    /// `None` once the driver has stopped.
    pub async fn attach(&self) -> Option<SurfaceId> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(DriverEvent::Attach { reply }).await.ok()?;
        rx.await.ok()
    }

    pub async fn detach(&self, surface: SurfaceId) -> bool {
        self.tx.send(DriverEvent::Detach(surface)).await.is_ok()
    }

    pub async fn text_changed(&self, surface: SurfaceId, text: impl Into<String>, caret: Option<usize>) -> bool {
        let event = DriverEvent::TextChanged { surface, text: text.into(), caret };
        self.tx.send(event).await.is_ok()
    }

    pub async fn cycle(&self, surface: SurfaceId, direction: CycleDirection) -> bool {
        self.tx.send(DriverEvent::Cycle { surface, direction }).await.is_ok()
    }

    pub async fn accept(&self, surface: SurfaceId) -> bool {
        self.tx.send(DriverEvent::Accept(surface)).await.is_ok()
    }

    pub async fn dismiss(&self, surface: SurfaceId) -> bool {
        self.tx.send(DriverEvent::Dismiss(surface)).await.is_ok()
    }

    pub async fn evaluate(&self, text: impl Into<String>) -> Option<TriggerResult> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(DriverEvent::Evaluate { text: text.into(), reply }).await.ok()?;
        rx.await.ok()
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

pub struct SuggestionDriver<C> {
    orchestrator: SuggestionOrchestrator,
    catalog: Arc<C>,
    rx: mpsc::Receiver<DriverEvent>,
    tx: mpsc::Sender<DriverEvent>,
    updates: mpsc::UnboundedSender<DriverUpdate>,
    debounce: Duration,
    timers: HashMap<SurfaceId, (u64, JoinHandle<()>)>,
    next_arm: u64,
    shutdown: CancellationToken,
}

impl<C> SuggestionDriver<C>
where
    C: GuardCatalog + 'static,
{
    /// Starts the driver and its usage recorder. Updates arrive on the
    /// returned receiver.
    pub fn spawn(
        config: EngineConfig,
        catalog: Arc<C>,
        clock: Arc<dyn Clock>,
        telemetry: Option<Arc<dyn TelemetrySink>>,
    ) -> (DriverHandle, mpsc::UnboundedReceiver<DriverUpdate>, JoinHandle<()>) {
        let (driver, handle, updates_rx) = Self::new(config, catalog, clock, telemetry);
        let task = tokio::spawn(driver.run());
        (handle, updates_rx, task)
    }

    fn new(
        config: EngineConfig,
        catalog: Arc<C>,
        clock: Arc<dyn Clock>,
        telemetry: Option<Arc<dyn TelemetrySink>>,
    ) -> (Self, DriverHandle, mpsc::UnboundedReceiver<DriverUpdate>) {
        let (usage, usage_rx) = UsageSink::channel();
        spawn_usage_recorder(catalog.clone(), usage_rx);

        let debounce = Duration::from_millis(config.suggestion.debounce_ms);
        let mut orchestrator = SuggestionOrchestrator::with_parts(config, clock, usage);
        if let Some(sink) = telemetry {
            orchestrator = orchestrator.with_telemetry(sink);
        }

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let (updates, updates_rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();

        let driver = Self {
            orchestrator,
            catalog,
            rx,
            tx: tx.clone(),
            updates,
            debounce,
            timers: HashMap::new(),
            next_arm: 0,
            shutdown: shutdown.clone(),
        };
        (driver, DriverHandle { tx, shutdown }, updates_rx)
    }

    async fn run(mut self) {
        info!(debounce_ms = self.debounce.as_millis() as u64, "suggestion driver started");
        loop {
            let event = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                event = self.rx.recv() => event,
            };
            match event {
                Some(event) => self.handle(event),
                None => break,
            }
        }
        for (_, (_, timer)) in self.timers.drain() {
            timer.abort();
        }
        info!("suggestion driver stopped");
    }

    fn handle(&mut self, event: DriverEvent) {
        match event {
            DriverEvent::Attach { reply } => {
                let id = self.orchestrator.attach_surface();
                let _ = reply.send(id);
            }
            DriverEvent::Detach(surface) => {
                if let Some((_, timer)) = self.timers.remove(&surface) {
                    timer.abort();
                }
                self.orchestrator.detach_surface(surface);
            }
            DriverEvent::TextChanged { surface, text, caret } => {
                if self.orchestrator.note_text_change(surface, &text, caret) {
                    self.arm_debounce(surface, text);
                }
            }
            DriverEvent::Cycle { surface, direction } => {
                if let Some(suggestion) = self.orchestrator.cycle_suggestion(surface, direction) {
                    self.publish(DriverUpdate::Cycled { surface, suggestion });
                }
            }
            DriverEvent::Accept(surface) => {
                if let Some(suggestion) = self.orchestrator.mark_suggestion_accepted(surface) {
                    self.publish(DriverUpdate::Accepted { surface, suggestion });
                }
            }
            DriverEvent::Dismiss(surface) => {
                if let Some(suggestion) = self.orchestrator.mark_suggestion_dismissed(surface) {
                    self.publish(DriverUpdate::Dismissed { surface, suggestion });
                }
            }
            DriverEvent::Evaluate { text, reply } => {
                let _ = reply.send(self.orchestrator.evaluate(&text));
            }
            DriverEvent::DebounceElapsed { surface, arm, text } => {
                if !self.timers.get(&surface).is_some_and(|(current, _)| *current == arm) {
                    debug!(surface = %surface, arm, "ignoring superseded debounce");
                    return;
                }
                self.timers.remove(&surface);
                self.start_evaluation(surface, &text);
            }
            DriverEvent::CatalogFetched { ticket, guards } => {
                let surface = ticket.surface;
                match self.orchestrator.complete_evaluation(ticket, guards) {
                    EvaluationOutcome::Suggested(suggestion) => {
                        let highlights = self
                            .orchestrator
                            .surface(surface)
                            .map(|s| s.highlights.clone())
                            .unwrap_or_default();
                        self.publish(DriverUpdate::Suggested { surface, suggestion, highlights });
                    }
                    EvaluationOutcome::Cleared => self.publish(DriverUpdate::Cleared { surface }),
                    EvaluationOutcome::Stale => {}
                }
            }
        }
    }

    /// Replaces any pending timer for the surface.
    fn arm_debounce(&mut self, surface: SurfaceId, text: String) {
        if let Some((_, previous)) = self.timers.remove(&surface) {
            previous.abort();
        }
        self.next_arm += 1;
        let arm = self.next_arm;
        let tx = self.tx.clone();
        let delay = self.debounce;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(DriverEvent::DebounceElapsed { surface, arm, text }).await;
        });
        self.timers.insert(surface, (arm, timer));
    }

    fn start_evaluation(&mut self, surface: SurfaceId, text: &str) {
        let had_suggestion = self
            .orchestrator
            .surface(surface)
            .is_some_and(|s| s.suggestion.is_some());

        let Some(ticket) = self.orchestrator.begin_evaluation(surface, text) else {
            let cleared = self
                .orchestrator
                .surface(surface)
                .is_some_and(|s| s.suggestion.is_none());
            if had_suggestion && cleared {
                self.publish(DriverUpdate::Cleared { surface });
            }
            return;
        };

        debug!(surface = %surface, token = ticket.token, "fetching guard catalog");
        let catalog = self.catalog.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let guards = catalog.get_guard_cache().await;
            let _ = tx.send(DriverEvent::CatalogFetched { ticket, guards }).await;
        });
    }

    fn publish(&self, update: DriverUpdate) {
        if self.updates.send(update).is_err() {
            debug!("update receiver dropped");
        }
    }
}
