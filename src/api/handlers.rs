//! HTTP API handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use tracing::{error, info};
use utoipa::{OpenApi, ToSchema};

use crate::audit::{AuditEvent, AuditSink};
use crate::items::{CreateItemRequest, Item, ItemStore, NewItem};
use crate::metrics::{self, DbOperation, SERVICE_NAME};

use super::docs::ApiDoc;
use super::error::{ApiError, ErrorResponse};

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Item persistence.
    pub items: Arc<dyn ItemStore>,
    /// Audit notifications.
    pub audit: Arc<dyn AuditSink>,
    /// Renders `/metrics`.
    pub metrics: PrometheusHandle,
}

impl AppState {
    /// Create new app state.
    pub fn new(
        items: Arc<dyn ItemStore>,
        audit: Arc<dyn AuditSink>,
        metrics: PrometheusHandle,
    ) -> Self {
        Self {
            items,
            audit,
            metrics,
        }
    }
}

/// Endpoints advertised by the root document.
#[derive(Debug, Serialize, ToSchema)]
pub struct EndpointMap {
    /// Create an item.
    pub create: &'static str,
    /// List items.
    pub list: &'static str,
    /// Health probe.
    pub health: &'static str,
    /// Prometheus metrics.
    pub metrics: &'static str,
}

/// Root response.
#[derive(Debug, Serialize, ToSchema)]
pub struct RootResponse {
    /// Service display name.
    pub service: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Available endpoints.
    pub endpoints: EndpointMap,
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "healthy" or "unhealthy".
    pub status: &'static str,
    /// Service identifier.
    pub service: &'static str,
    /// "connected" or "disconnected".
    pub database: &'static str,
    /// Failure cause, present only when unhealthy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Service information and endpoint map.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service information", body = RootResponse))
)]
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        service: "Items Service",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: EndpointMap {
            create: "POST /items",
            list: "GET /items",
            health: "GET /health",
            metrics: "GET /metrics",
        },
    })
}

/// Create a new item.
#[utoipa::path(
    post,
    path = "/items",
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Item created", body = Item),
        (status = 400, description = "Name is missing", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
pub async fn create_item(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    let new_item = NewItem::from_json(&body)?;
    let item = Item::create(new_item);

    let start = Instant::now();
    state
        .items
        .insert(&item)
        .await
        .map_err(|e| ApiError::internal("creating item", e))?;
    metrics::record_db_query_duration(DbOperation::Insert, start);

    metrics::inc_items_created();

    state.audit.notify(AuditEvent::item_created(&item)).await;

    info!(item_id = %item.id, "Created item: {}", item.id);

    Ok((StatusCode::CREATED, Json(item)))
}

/// List all items, newest first.
#[utoipa::path(
    get,
    path = "/items",
    responses(
        (status = 200, description = "All items", body = [Item]),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
pub async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<Item>>, ApiError> {
    let start = Instant::now();
    let items = state
        .items
        .list()
        .await
        .map_err(|e| ApiError::internal("listing items", e))?;
    metrics::record_db_query_duration(DbOperation::Select, start);

    metrics::inc_items_listed();

    state.audit.notify(AuditEvent::items_listed(items.len())).await;

    info!(count = items.len(), "Listed {} items", items.len());

    Ok(Json(items))
}

/// Health check handler - 200 when the database answers, 503 otherwise.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Database reachable", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.items.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                service: SERVICE_NAME,
                database: "connected",
                error: None,
            }),
        ),
        Err(e) => {
            error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy",
                    service: SERVICE_NAME,
                    database: "disconnected",
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}

/// Prometheus text exposition.
#[utoipa::path(
    get,
    path = "/metrics",
    responses((status = 200, description = "Prometheus metrics", body = String, content_type = "text/plain"))
)]
pub async fn render_metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Generated OpenAPI document.
pub async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
