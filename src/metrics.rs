//! Prometheus metrics for item operations, database latency and audit calls.
//!
//! Metric names match what dashboards for the service already scrape:
//! - `items_created_total` / `items_listed_total`
//! - `db_query_duration_seconds{operation}`
//! - `audit_request_duration_seconds`
//! - `http_requests_total` / `http_request_duration_seconds`
//! - `app_info{version, service}`

use std::time::{Duration, Instant};

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{
    Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder,
};
use tracing::debug;

use crate::error::Result;

// === Metric Name Constants ===

/// Items created counter metric name.
pub const METRIC_ITEMS_CREATED: &str = "items_created_total";
/// Item listings counter metric name.
pub const METRIC_ITEMS_LISTED: &str = "items_listed_total";
/// Database query duration metric name.
pub const METRIC_DB_QUERY_DURATION: &str = "db_query_duration_seconds";
/// Audit request duration metric name.
pub const METRIC_AUDIT_REQUEST_DURATION: &str = "audit_request_duration_seconds";
/// HTTP requests counter metric name.
pub const METRIC_HTTP_REQUESTS: &str = "http_requests_total";
/// HTTP request duration metric name.
pub const METRIC_HTTP_REQUEST_DURATION: &str = "http_request_duration_seconds";
/// Static application info metric name.
pub const METRIC_APP_INFO: &str = "app_info";

/// Service label used on `app_info`.
pub const SERVICE_NAME: &str = "items-service";

const DB_QUERY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
];
const AUDIT_REQUEST_BUCKETS: &[f64] = &[0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.0];
const HTTP_REQUEST_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// How often histogram upkeep runs on the installed recorder.
pub const UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Database operation kinds used as the `operation` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum DbOperation {
    /// Row insert.
    Insert,
    /// Full listing.
    Select,
}

/// Prometheus builder with the service's histogram buckets applied.
fn builder() -> Result<PrometheusBuilder> {
    let builder = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(METRIC_DB_QUERY_DURATION.to_string()),
            DB_QUERY_BUCKETS,
        )?
        .set_buckets_for_metric(
            Matcher::Full(METRIC_AUDIT_REQUEST_DURATION.to_string()),
            AUDIT_REQUEST_BUCKETS,
        )?
        .set_buckets_for_metric(
            Matcher::Full(METRIC_HTTP_REQUEST_DURATION.to_string()),
            HTTP_REQUEST_BUCKETS,
        )?;
    Ok(builder)
}

/// Install the global Prometheus recorder and return its render handle.
/// Call this once at startup, before [`init_metrics`].
pub fn install_recorder() -> Result<PrometheusHandle> {
    let handle = builder()?.install_recorder()?;
    debug!("Prometheus recorder installed");
    Ok(handle)
}

/// Build a recorder with the service's buckets without installing it.
pub fn build_recorder() -> Result<PrometheusRecorder> {
    Ok(builder()?.build_recorder())
}

/// Build a recorder handle without installing it globally.
///
/// Useful for routers under test: `/metrics` renders, but nothing recorded
/// through the `metrics` macros lands in it.
pub fn detached_handle() -> Result<PrometheusHandle> {
    Ok(build_recorder()?.handle())
}

/// Initialize all metric descriptions and the static info gauge.
pub fn init_metrics() {
    describe_counter!(METRIC_ITEMS_CREATED, "Total number of items created");
    describe_counter!(
        METRIC_ITEMS_LISTED,
        "Total number of times items were listed"
    );
    describe_histogram!(
        METRIC_DB_QUERY_DURATION,
        metrics::Unit::Seconds,
        "Database query duration in seconds"
    );
    describe_histogram!(
        METRIC_AUDIT_REQUEST_DURATION,
        metrics::Unit::Seconds,
        "Duration of requests to audit service in seconds"
    );
    describe_counter!(METRIC_HTTP_REQUESTS, "Total number of HTTP requests");
    describe_histogram!(
        METRIC_HTTP_REQUEST_DURATION,
        metrics::Unit::Seconds,
        "HTTP request duration in seconds"
    );
    describe_gauge!(METRIC_APP_INFO, "Application info");

    gauge!(
        METRIC_APP_INFO,
        "version" => env!("CARGO_PKG_VERSION"),
        "service" => SERVICE_NAME
    )
    .set(1.0);

    debug!("Metrics initialized");
}

/// Record the duration of a database operation.
pub fn record_db_query_duration(operation: DbOperation, start: Instant) {
    histogram!(METRIC_DB_QUERY_DURATION, "operation" => operation.as_ref().to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record the duration of an audit request attempt.
pub fn record_audit_request_duration(start: Instant) {
    histogram!(METRIC_AUDIT_REQUEST_DURATION).record(start.elapsed().as_secs_f64());
}

/// Record one served HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, start: Instant) {
    counter!(
        METRIC_HTTP_REQUESTS,
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        METRIC_HTTP_REQUEST_DURATION,
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Increment items created counter.
pub fn inc_items_created() {
    counter!(METRIC_ITEMS_CREATED).increment(1);
}

/// Increment items listed counter.
pub fn inc_items_listed() {
    counter!(METRIC_ITEMS_LISTED).increment(1);
}

/// Periodically drain histogram buckets on the installed recorder.
pub async fn run_upkeep(handle: PrometheusHandle) {
    let mut interval = tokio::time::interval(UPKEEP_INTERVAL);
    loop {
        interval.tick().await;
        handle.run_upkeep();
    }
}
