//! Unified error types for the items service.

use thiserror::Error;

/// Unified error type for the items service.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration validation error.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbError),

    /// HTTP client error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Prometheus exporter error.
    #[error("metrics error: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Database access errors.
#[derive(Error, Debug)]
pub enum DbError {
    /// Could not open a connection.
    #[error("connection failed: {0}")]
    Connect(#[source] sqlx::Error),

    /// A statement failed.
    #[error("{operation} failed: {source}")]
    Query {
        /// Operation that failed.
        operation: &'static str,
        /// Driver error.
        #[source]
        source: sqlx::Error,
    },

    /// Connecting or a statement exceeded the configured bound.
    #[error("{operation} timed out after {after_ms}ms")]
    Timeout {
        /// Operation that timed out.
        operation: &'static str,
        /// Configured bound in milliseconds.
        after_ms: u64,
    },
}

/// Request body validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Body is not JSON, not an object, or lacks a usable `name`.
    #[error("Name is required")]
    NameRequired,

    /// `description` is present but not a string.
    #[error("Description must be a string")]
    DescriptionNotString,
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, ServiceError>;
