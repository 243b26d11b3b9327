//! Integration tests for the items service.
//!
//! Tests marked `#[ignore]` need a reachable PostgreSQL configured through
//! the usual DB_* environment variables (a .env file works too).
//! Run with: cargo test --test integration -- --ignored

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use items_service::api::{create_router, AppState};
use items_service::audit::{AuditAction, RecordingAuditSink};
use items_service::config::Config;
use items_service::items::{ConnectionFactory, Item, ItemStore, NewItem, PgItemStore};
use items_service::metrics::detached_handle;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS items (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL
)";

/// Get a test config from environment.
fn test_config() -> Option<Config> {
    dotenvy::dotenv().ok();

    // Only run against a database that was explicitly configured.
    std::env::var("DB_HOST").ok()?;

    Config::load().ok()
}

/// Make sure the table exists and is empty.
async fn reset_table(config: &Config) {
    let factory = ConnectionFactory::new(config);
    let mut conn = factory.open().await.expect("database reachable");
    sqlx::query(CREATE_TABLE)
        .execute(&mut conn)
        .await
        .expect("create table");
    sqlx::query("DELETE FROM items")
        .execute(&mut conn)
        .await
        .expect("clear table");
}

async fn send(router: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// Test that the health probe reaches the database.
#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_ping() {
    let config = match test_config() {
        Some(c) => c,
        None => {
            println!("Skipping: DB_HOST not set");
            return;
        }
    };

    let store = PgItemStore::from_config(&config);
    let result = store.ping().await;
    assert!(result.is_ok(), "Ping failed: {:?}", result.err());
}

/// Test that inserted rows come back unchanged and newest first.
#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_insert_and_list() {
    let config = match test_config() {
        Some(c) => c,
        None => {
            println!("Skipping: DB_HOST not set");
            return;
        }
    };
    reset_table(&config).await;

    let store = PgItemStore::from_config(&config);
    let older = Item::create(NewItem {
        name: "older".to_string(),
        description: "first".to_string(),
    });
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let newer = Item::create(NewItem {
        name: "newer".to_string(),
        description: String::new(),
    });

    store.insert(&older).await.expect("insert older");
    store.insert(&newer).await.expect("insert newer");

    let listed = store.list().await.expect("list");
    assert_eq!(listed, vec![newer, older]);
}

/// End-to-end scenario through the router.
#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_http_scenario() {
    let config = match test_config() {
        Some(c) => c,
        None => {
            println!("Skipping: DB_HOST not set");
            return;
        }
    };
    reset_table(&config).await;

    let audit = RecordingAuditSink::new();
    let router = create_router(AppState::new(
        Arc::new(PgItemStore::from_config(&config)),
        Arc::new(audit.clone()),
        detached_handle().unwrap(),
    ));

    let (status, created) = send(
        &router,
        Request::builder()
            .method("POST")
            .uri("/items")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name":"Widget","description":"A test widget"}"#))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["description"], "A test widget");

    let (status, body) = send(
        &router,
        Request::builder()
            .method("POST")
            .uri("/items")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"description":"no name"}"#))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Name is required" }));

    let (status, listed) = send(
        &router,
        Request::builder().uri("/items").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([created]));

    let (status, health) = send(
        &router,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["database"], "connected");

    assert_eq!(
        audit.actions(),
        vec![AuditAction::CreateItem, AuditAction::ListItems]
    );
}

/// Health reports 503 when nothing is listening on the database port.
#[tokio::test]
async fn test_health_with_database_down() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = Config {
        db_host: "127.0.0.1".to_string(),
        db_port: port,
        ..Config::default()
    };
    let router = create_router(AppState::new(
        Arc::new(PgItemStore::from_config(&config)),
        Arc::new(RecordingAuditSink::new()),
        detached_handle().unwrap(),
    ));

    let (status, body) = send(
        &router,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
    assert!(!body["error"].as_str().unwrap_or_default().is_empty());
}
