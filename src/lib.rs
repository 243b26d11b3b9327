//! Items service.
//!
//! A small HTTP service that stores named items in PostgreSQL, lists them
//! back newest first, and reports health and Prometheus metrics. Each
//! create or list sends a best-effort notification to an external audit
//! collector; audit failures are logged and never reach the caller.
//!
//! ```text
//! POST /items  ──► validate ──► INSERT ──► metrics ──► audit ──► 201
//! GET  /items  ──────────────► SELECT ──► metrics ──► audit ──► 200
//! GET  /health ──────────────► SELECT 1 ─────────────────────► 200 / 503
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`items`]: Item model, connection factory and stores
//! - [`audit`]: Audit events and the HTTP notifier
//! - [`api`]: HTTP handlers and router
//! - [`metrics`]: Prometheus metric names and recorders
//! - [`utils`]: Utility functions

pub mod api;
pub mod audit;
pub mod config;
pub mod error;
pub mod items;
pub mod metrics;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use error::{Result, ServiceError};
