//! Per-request metrics middleware

use axum::{extract::Request, middleware::Next, response::Response};
use cashlens_common::metrics::RequestMetrics;

/// Count requests and record latency by method, path and status
pub async fn track_requests(request: Request, next: Next) -> Response {
    let metrics = RequestMetrics::start(request.method().as_str(), request.uri().path());
    let response = next.run(request).await;
    metrics.finish(response.status().as_u16());
    response
}
