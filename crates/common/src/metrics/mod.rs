//! Metrics and observability utilities
//!
//! Prometheus-style metric names under a shared prefix, described once at
//! startup and recorded through small helpers.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all Cash Lens metrics
pub const METRICS_PREFIX: &str = "cashlens";

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    describe_counter!(
        format!("{}_request_timeouts_total", METRICS_PREFIX),
        Unit::Count,
        "Requests answered with 504 after missing their deadline"
    );

    // Upload metrics
    describe_counter!(
        format!("{}_uploads_total", METRICS_PREFIX),
        Unit::Count,
        "Upload attempts by outcome"
    );

    describe_counter!(
        format!("{}_lines_counted_total", METRICS_PREFIX),
        Unit::Count,
        "Lines counted across successful uploads"
    );

    describe_histogram!(
        format!("{}_upload_bytes", METRICS_PREFIX),
        Unit::Bytes,
        "Size of accepted upload payloads"
    );

    // Progress metrics
    describe_counter!(
        format!("{}_progress_polls_total", METRICS_PREFIX),
        Unit::Count,
        "Progress endpoint polls by finished flag"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Record a request that missed its deadline
pub fn record_timeout(endpoint: &str) {
    counter!(
        format!("{}_request_timeouts_total", METRICS_PREFIX),
        "endpoint" => endpoint.to_string()
    )
    .increment(1);
}

/// Record an upload attempt; `lines` and `bytes` are only meaningful on success
pub fn record_upload(outcome: &str, bytes: usize, lines: usize) {
    counter!(
        format!("{}_uploads_total", METRICS_PREFIX),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    if outcome == "success" {
        counter!(format!("{}_lines_counted_total", METRICS_PREFIX)).increment(lines as u64);
        histogram!(format!("{}_upload_bytes", METRICS_PREFIX)).record(bytes as f64);
    }
}

/// Record a progress poll
pub fn record_progress_poll(finished: bool) {
    counter!(
        format!("{}_progress_polls_total", METRICS_PREFIX),
        "finished" => finished.to_string()
    )
    .increment(1);
}
