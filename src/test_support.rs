//! Throwaway HTTP servers for tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{http::StatusCode, routing::post, Json, Router};
use serde_json::Value;
use tokio::net::TcpListener;

/// A local stand-in for the audit collector.
pub(crate) struct AuditServer {
    pub base_url: String,
    received: Arc<Mutex<Vec<Value>>>,
}

impl AuditServer {
    /// Bodies received so far.
    pub fn received(&self) -> Vec<Value> {
        self.received.lock().unwrap().clone()
    }
}

/// Serve `POST /audit/log`, answering with `status` after `delay`.
pub(crate) async fn spawn_audit_server(status: StatusCode, delay: Duration) -> AuditServer {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();

    let app = Router::new().route(
        "/audit/log",
        post(move |Json(body): Json<Value>| {
            let sink = sink.clone();
            async move {
                sink.lock().unwrap().push(body);
                tokio::time::sleep(delay).await;
                status
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    AuditServer {
        base_url: format!("http://{}", addr),
        received,
    }
}

/// A base URL on which nothing is listening.
pub(crate) async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
