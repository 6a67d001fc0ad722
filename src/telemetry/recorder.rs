use std::collections::VecDeque;
use std::sync::Mutex;

use super::event::{TelemetryEvent, TelemetrySink};
use super::metrics::{compute_snapshot, TelemetrySnapshot};
use crate::error::TelemetryError;

const MAX_EVENTS: usize = 10_000;

/// Bounded in-memory event buffer; the oldest events are evicted first.
#[derive(Debug)]
pub struct TelemetryRecorder {
    buffer: Mutex<VecDeque<TelemetryEvent>>,
    capacity: usize,
}

impl Default for TelemetryRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryRecorder {
    pub fn new() -> Self {
        Self::with_capacity(MAX_EVENTS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Mutex::new(VecDeque::with_capacity(capacity.min(MAX_EVENTS))),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&self, event: TelemetryEvent) -> Result<(), TelemetryError> {
        let mut buffer = self.buffer.lock().map_err(|_| TelemetryError::Poisoned)?;
        if buffer.len() >= self.capacity {
            buffer.pop_front();
        }
        buffer.push_back(event);
        Ok(())
    }

    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.buffer
            .lock()
            .map(|b| b.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.buffer.lock().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        // Delegate to the pure metrics module
        match self.buffer.lock() {
            Ok(buffer) => compute_snapshot(&buffer),
            Err(_) => TelemetrySnapshot::default(),
        }
    }

    pub fn clear(&self) {
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.clear();
        }
    }
}

impl TelemetrySink for TelemetryRecorder {
    fn emit(&self, event: TelemetryEvent) -> Result<(), TelemetryError> {
        self.record(event)
    }
}
