/// Metrics and telemetry for the resolver
///
/// Provides Prometheus-compatible metrics for monitoring:
/// - Resolution outcomes and latencies
/// - Stats and audit write failures
/// - HTTP request counts
use lazy_static::lazy_static;
use prometheus::{
    register_gauge, register_histogram_vec, register_int_counter, register_int_counter_vec,
    Encoder, Gauge, HistogramVec, IntCounter, IntCounterVec, TextEncoder,
};

lazy_static! {
    // ========== Resolution Metrics ==========

    /// Resolution attempts by outcome (success, invalid_format, not_found, ...)
    pub static ref RESOLUTIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "resolutions_total",
        "Total number of identifier resolution attempts",
        &["outcome"]
    )
    .unwrap();

    /// End-to-end resolution latency by response kind
    pub static ref RESOLUTION_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "resolution_duration_seconds",
        "Identifier resolution latencies in seconds",
        &["kind"],
        vec![0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .unwrap();

    // ========== Bookkeeping Failures ==========

    /// Resolution counter updates that failed or timed out
    pub static ref STATS_INCREMENT_FAILURES_TOTAL: IntCounter = register_int_counter!(
        "stats_increment_failures_total",
        "Number of failed resolution counter updates"
    )
    .unwrap();

    /// Audit log appends that failed or timed out
    pub static ref AUDIT_WRITE_FAILURES_TOTAL: IntCounter = register_int_counter!(
        "audit_write_failures_total",
        "Number of failed resolution log appends"
    )
    .unwrap();

    // ========== HTTP Metrics ==========

    /// Total HTTP requests by route and status
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["route", "status"]
    )
    .unwrap();

    // ========== System Metrics ==========

    /// Application uptime in seconds
    pub static ref UPTIME_SECONDS: Gauge = register_gauge!(
        "uptime_seconds",
        "Application uptime in seconds"
    )
    .unwrap();
}

/// Render metrics in Prometheus text format
pub fn render_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "failed to encode metrics");
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Record a finished resolution
pub fn record_resolution(outcome: &str, kind: &str, duration: f64) {
    RESOLUTIONS_TOTAL.with_label_values(&[outcome]).inc();
    RESOLUTION_DURATION_SECONDS
        .with_label_values(&[kind])
        .observe(duration);
}

/// Record a failed counter update
pub fn record_stats_failure() {
    STATS_INCREMENT_FAILURES_TOTAL.inc();
}

/// Record a failed audit append
pub fn record_audit_failure() {
    AUDIT_WRITE_FAILURES_TOTAL.inc();
}

/// Record an HTTP request
pub fn record_http_request(route: &str, status: u16) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[route, &status.to_string()])
        .inc();
}
