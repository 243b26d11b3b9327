//! HTTP API: items, health, metrics and the OpenAPI document.

pub mod docs;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use error::ApiError;
pub use handlers::AppState;
pub use routes::create_router;
