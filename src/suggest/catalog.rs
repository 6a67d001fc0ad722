//! Guard catalog seam.
//!
//! The catalog is owned elsewhere; this crate reads it and issues
//! fire-and-forget usage records. Recording calls must tolerate repeats.

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::types::{Guard, GuardId};
use crate::error::CatalogError;
use crate::time::{Clock, SystemClock};

pub trait GuardCatalog: Send + Sync {
    fn get_guard_cache(&self) -> impl Future<Output = Result<Vec<Guard>, CatalogError>> + Send;

    fn record_guard_shown(&self, id: GuardId) -> impl Future<Output = Result<(), CatalogError>> + Send;

    fn record_guard_acceptance(&self, id: GuardId) -> impl Future<Output = Result<(), CatalogError>> + Send;

    fn record_guard_rejection(&self, id: GuardId) -> impl Future<Output = Result<(), CatalogError>> + Send;
}

/// Catalog held in memory, with usage counters updated in place.
pub struct InMemoryGuardCatalog {
    guards: RwLock<Vec<Guard>>,
    shown: RwLock<HashMap<GuardId, u32>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryGuardCatalog {
    pub fn new(guards: Vec<Guard>) -> Self {
        Self::with_clock(guards, Arc::new(SystemClock))
    }

    pub fn with_clock(guards: Vec<Guard>, clock: Arc<dyn Clock>) -> Self {
        Self {
            guards: RwLock::new(guards),
            shown: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Parses a JSON array of guards.
    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let guards: Vec<Guard> = serde_json::from_str(raw)?;
        Ok(Self::new(guards))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub async fn guard(&self, id: &str) -> Option<Guard> {
        self.guards.read().await.iter().find(|g| g.id == id).cloned()
    }

    pub async fn shown_count(&self, id: &str) -> u32 {
        self.shown.read().await.get(id).copied().unwrap_or(0)
    }

    async fn update<F>(&self, id: &str, apply: F) -> Result<(), CatalogError>
    where
        F: FnOnce(&mut Guard),
    {
        let mut guards = self.guards.write().await;
        let guard = guards
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| CatalogError::UnknownGuard(id.to_string()))?;
        apply(guard);
        Ok(())
    }
}

impl GuardCatalog for InMemoryGuardCatalog {
    async fn get_guard_cache(&self) -> Result<Vec<Guard>, CatalogError> {
        Ok(self.guards.read().await.clone())
    }

    async fn record_guard_shown(&self, id: GuardId) -> Result<(), CatalogError> {
        if self.guard(&id).await.is_none() {
            return Err(CatalogError::UnknownGuard(id));
        }
        *self.shown.write().await.entry(id.clone()).or_insert(0) += 1;
        debug!(guard = %id, "guard shown");
        Ok(())
    }

    async fn record_guard_acceptance(&self, id: GuardId) -> Result<(), CatalogError> {
        let now = self.clock.now_ms();
        self.update(&id, |g| {
            g.local_usage.accept_count += 1;
            g.local_usage.last_accepted_at = Some(now);
        })
        .await
    }

    async fn record_guard_rejection(&self, id: GuardId) -> Result<(), CatalogError> {
        self.update(&id, |g| g.local_usage.reject_count += 1).await
    }
}
