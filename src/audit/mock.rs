//! Recording audit sink for unit testing.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::types::{AuditAction, AuditEvent};
use super::AuditSink;

/// Keeps every event it is handed instead of sending it anywhere.
#[derive(Debug, Clone, Default)]
pub struct RecordingAuditSink {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl RecordingAuditSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events, oldest first.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.lock().clone()
    }

    /// Actions of the recorded events, oldest first.
    pub fn actions(&self) -> Vec<AuditAction> {
        self.lock().iter().map(|e| e.action).collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<AuditEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl AuditSink for RecordingAuditSink {
    async fn notify(&self, event: AuditEvent) {
        self.lock().push(event);
    }
}
