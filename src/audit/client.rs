//! HTTP client for the audit collector.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, error, instrument, warn};

use crate::config::Config;
use crate::metrics;

use super::types::AuditEvent;
use super::AuditSink;

/// Posts audit events to `<AUDIT_SERVICE_URL>/audit/log`.
///
/// Delivery is best effort: every failure is logged and dropped.
#[derive(Debug, Clone)]
pub struct AuditClient {
    /// HTTP client with the audit timeout applied.
    http: reqwest::Client,
    /// Full URL of the log endpoint.
    endpoint: String,
}

impl AuditClient {
    /// Create a client from config.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.audit_timeout())
            .build()?;

        Ok(Self {
            http,
            endpoint: config.audit_log_url(),
        })
    }

    /// Get the log endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AuditSink for AuditClient {
    #[instrument(skip(self, event), fields(action = %event.action))]
    async fn notify(&self, event: AuditEvent) {
        let start = Instant::now();

        let body = match serde_json::to_value(&event) {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, "Unexpected error in audit logging");
                return;
            }
        };

        let result = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await;

        metrics::record_audit_request_duration(start);

        match result {
            Ok(response) if response.status() == StatusCode::CREATED => {
                debug!("Audit event delivered");
            }
            Ok(response) => {
                warn!(
                    status = %response.status(),
                    "Audit logging returned status {}",
                    response.status().as_u16()
                );
            }
            Err(e) if e.is_timeout() => {
                warn!("Audit logging timed out for action: {}", event.action);
            }
            Err(e) => {
                warn!(error = %e, "Audit logging failed for action {}", event.action);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditAction;
    use crate::test_support::{refused_url, spawn_audit_server};
    use axum::http::StatusCode as AxumStatus;
    use std::time::Duration;

    fn client_for(base: &str, timeout_ms: u64) -> AuditClient {
        AuditClient::new(&Config {
            audit_service_url: base.to_string(),
            audit_timeout_ms: timeout_ms,
            ..Config::default()
        })
        .unwrap()
    }

    #[test]
    fn endpoint_uses_fixed_path() {
        let client = client_for("http://audit.local:8081", 2000);
        assert_eq!(client.endpoint(), "http://audit.local:8081/audit/log");
    }

    #[tokio::test]
    async fn delivers_event_body() {
        let server = spawn_audit_server(AxumStatus::CREATED, Duration::ZERO).await;
        let client = client_for(&server.base_url, 2000);

        client.notify(AuditEvent::items_listed(2)).await;

        let received = server.received();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0]["action"], "LIST_ITEMS");
        assert_eq!(received[0]["details"]["count"], 2);
        assert!(received[0]["timestamp"].is_string());
    }

    #[tokio::test]
    async fn non_created_status_is_swallowed() {
        let server = spawn_audit_server(AxumStatus::INTERNAL_SERVER_ERROR, Duration::ZERO).await;
        let client = client_for(&server.base_url, 2000);

        client
            .notify(AuditEvent::new(AuditAction::CreateItem, serde_json::json!({})))
            .await;

        assert_eq!(server.received().len(), 1);
    }

    #[tokio::test]
    async fn refused_connection_is_swallowed() {
        let base = refused_url().await;
        let client = client_for(&base, 2000);

        client.notify(AuditEvent::items_listed(0)).await;
    }

    #[tokio::test]
    async fn timeout_bounds_the_call() {
        let server = spawn_audit_server(AxumStatus::CREATED, Duration::from_secs(5)).await;
        let client = client_for(&server.base_url, 100);

        let start = Instant::now();
        client.notify(AuditEvent::items_listed(0)).await;

        assert!(start.elapsed() < Duration::from_secs(2));
    }
}
