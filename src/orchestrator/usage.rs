use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::suggest::{GuardCatalog, GuardId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageKind {
    Shown,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageEvent {
    pub guard_id: GuardId,
    pub kind: UsageKind,
}

/// Fire-and-forget handle for usage records. Never blocks and never fails
/// the caller.
#[derive(Debug, Clone, Default)]
pub struct UsageSink {
    tx: Option<mpsc::UnboundedSender<UsageEvent>>,
}

impl UsageSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<UsageEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sink that drops everything.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn record(&self, guard_id: &str, kind: UsageKind) {
        let Some(tx) = &self.tx else { return };
        let event = UsageEvent { guard_id: guard_id.to_string(), kind };
        if tx.send(event).is_err() {
            debug!(guard = guard_id, ?kind, "usage recorder gone; dropping record");
        }
    }
}

/// Drains usage records into the catalog until every sink is dropped.
pub fn spawn_usage_recorder<C>(catalog: Arc<C>, mut rx: mpsc::UnboundedReceiver<UsageEvent>) -> JoinHandle<()>
where
    C: GuardCatalog + 'static,
{
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let result = match event.kind {
                UsageKind::Shown => catalog.record_guard_shown(event.guard_id.clone()).await,
                UsageKind::Accepted => catalog.record_guard_acceptance(event.guard_id.clone()).await,
                UsageKind::Rejected => catalog.record_guard_rejection(event.guard_id.clone()).await,
            };
            if let Err(err) = result {
                warn!(guard = %event.guard_id, kind = ?event.kind, %err, "usage recording failed");
            }
        }
        debug!("usage recorder stopped");
    })
}
