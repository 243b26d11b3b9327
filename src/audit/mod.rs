//! Best-effort audit notifications.

pub mod client;
pub mod mock;
pub mod types;

use async_trait::async_trait;

pub use client::AuditClient;
pub use mock::RecordingAuditSink;
pub use types::{AuditAction, AuditEvent};

/// Destination for audit events.
///
/// `notify` cannot fail: implementations log their own problems and the
/// caller's request continues regardless.
#[async_trait]
pub trait AuditSink: Send + Sync + 'static {
    /// Deliver one event.
    async fn notify(&self, event: AuditEvent);
}
