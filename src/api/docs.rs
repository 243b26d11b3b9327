//! OpenAPI document for the HTTP surface.

use utoipa::OpenApi;

use crate::items::{CreateItemRequest, Item};

use super::error::ErrorResponse;
use super::handlers::{self, EndpointMap, HealthResponse, RootResponse};

/// OpenAPI description served at `/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(title = "Items Service", description = "Create and list items"),
    paths(
        handlers::root,
        handlers::create_item,
        handlers::list_items,
        handlers::health,
        handlers::render_metrics
    ),
    components(schemas(
        Item,
        CreateItemRequest,
        ErrorResponse,
        HealthResponse,
        RootResponse,
        EndpointMap
    )),
    tags((name = "items", description = "Item management"))
)]
pub struct ApiDoc;
