//! Request deadline middleware
//!
//! The handler runs as its own task and is raced against a monotonic
//! deadline. When the handler wins, the timer is dropped with the future
//! that owns it. When the deadline wins, the caller gets a 504 while the
//! handler task is detached and runs to completion, so its side effects
//! (such as a committed upload record) still happen.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use cashlens_common::metrics;
use std::time::Duration;
use tracing::{error, warn, Instrument};

/// Body of the response sent when the deadline expires
pub const TIMEOUT_BODY: &str = "Request timed out";

/// Deadline measured from request entry
#[derive(Debug, Clone, Copy)]
pub struct RequestDeadline(pub Duration);

/// Answer with 504 if the handler has not produced a response by the deadline
pub async fn enforce_deadline(
    State(RequestDeadline(deadline)): State<RequestDeadline>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    // The task keeps the request span so handler logs stay attributed
    let mut handler = tokio::spawn(next.run(request).in_current_span());

    match tokio::time::timeout(deadline, &mut handler).await {
        Ok(Ok(response)) => response,
        Ok(Err(join_err)) => {
            error!(
                method = %method,
                path = %path,
                error = %join_err,
                "Request handler aborted"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
        Err(_) => {
            warn!(
                method = %method,
                path = %path,
                timeout_ms = deadline.as_millis() as u64,
                "Request deadline exceeded; handler left running"
            );
            metrics::record_timeout(&path);
            // Dropping the JoinHandle detaches the task without cancelling it
            drop(handler);
            (StatusCode::GATEWAY_TIMEOUT, TIMEOUT_BODY).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::{to_bytes, Body}, middleware::from_fn_with_state, routing::get, Router};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Instant;
    use tower::ServiceExt;

    fn guarded_router(deadline: Duration, finished: Arc<AtomicBool>) -> Router {
        Router::new()
            .route("/fast", get(|| async { "fast" }))
            .route(
                "/slow",
                get(move || {
                    let finished = finished.clone();
                    async move {
                        tokio::time::sleep(Duration::from_millis(300)).await;
                        finished.store(true, Ordering::SeqCst);
                        "slow"
                    }
                }),
            )
            .route("/panic", get(explode))
            .layer(from_fn_with_state(RequestDeadline(deadline), enforce_deadline))
    }

    async fn explode() -> &'static str {
        panic!("handler exploded")
    }

    fn get_request(path: &str) -> Request {
        axum::http::Request::get(path).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_fast_handler_passes_through() {
        let app = guarded_router(Duration::from_secs(5), Arc::new(AtomicBool::new(false)));

        let response = app.oneshot(get_request("/fast")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"fast");
    }

    #[tokio::test]
    async fn test_slow_handler_gets_504_and_keeps_running() {
        let finished = Arc::new(AtomicBool::new(false));
        let app = guarded_router(Duration::from_millis(50), finished.clone());

        let started = Instant::now();
        let response = app.oneshot(get_request("/slow")).await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert!(elapsed >= Duration::from_millis(50));
        assert!(elapsed < Duration::from_millis(250), "504 took {:?}", elapsed);
        assert!(!finished.load(Ordering::SeqCst));

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], TIMEOUT_BODY.as_bytes());

        // Advisory timeout: the handler still completes after the 504
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_handler_runs_inside_request_span() {
        let _subscriber = tracing::subscriber::set_default(tracing_subscriber::registry());
        let seen: Arc<Mutex<Option<&'static str>>> = Arc::new(Mutex::new(None));
        let recorder = seen.clone();

        let app = Router::new()
            .route(
                "/span",
                get(move || {
                    let recorder = recorder.clone();
                    async move {
                        *recorder.lock().unwrap() =
                            tracing::Span::current().metadata().map(|meta| meta.name());
                        "ok"
                    }
                }),
            )
            .layer(from_fn_with_state(
                RequestDeadline(Duration::from_secs(5)),
                enforce_deadline,
            ));

        let response = app
            .oneshot(get_request("/span"))
            .instrument(tracing::info_span!("upload_request"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(*seen.lock().unwrap(), Some("upload_request"));
    }

    #[tokio::test]
    async fn test_panicking_handler_becomes_500() {
        let app = guarded_router(Duration::from_secs(5), Arc::new(AtomicBool::new(false)));

        let response = app.oneshot(get_request("/panic")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
