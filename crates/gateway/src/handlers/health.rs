//! Liveness and readiness endpoints

use axum::{extract::State, http::StatusCode, Json};
use cashlens_common::{errors::Result, VERSION};
use serde::Serialize;
use std::time::Instant;
use crate::AppState;

#[derive(Serialize)]
pub struct Liveness {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct Readiness {
    pub status: &'static str,
    pub database: DependencyCheck,
}

/// Outcome of checking one backing service
#[derive(Serialize)]
pub struct DependencyCheck {
    pub up: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DependencyCheck {
    fn from_ping(outcome: Result<()>, started: Instant) -> Self {
        match outcome {
            Ok(()) => Self {
                up: true,
                latency_ms: Some(started.elapsed().as_millis() as u64),
                error: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Database ping failed");
                Self { up: false, latency_ms: None, error: Some(e.to_string()) }
            }
        }
    }
}

/// The process is up; says nothing about the database
pub async fn health() -> Json<Liveness> {
    Json(Liveness { status: "healthy", version: VERSION })
}

/// Ready only when the files table's database answers
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Readiness>) {
    let started = Instant::now();
    let database = DependencyCheck::from_ping(state.db.ping().await, started);

    if database.up {
        (StatusCode::OK, Json(Readiness { status: "ready", database }))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(Readiness { status: "not_ready", database }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{body_string, test_state};
    use axum::{body::Body, http::Request};
    use cashlens_common::AppConfig;
    use tower::ServiceExt;

    fn ready_request() -> Request<Body> {
        Request::get("/ready").body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_ready_with_database() {
        let app = crate::create_router(test_state(AppConfig::default()).await);

        let response = app.oneshot(ready_request()).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["status"], "ready");
        assert_eq!(body["database"]["up"], true);
    }

    #[tokio::test]
    async fn test_not_ready_after_pool_closed() {
        let state = test_state(AppConfig::default()).await;
        state.db.conn().clone().close().await.unwrap();
        let app = crate::create_router(state);

        let response = app.oneshot(ready_request()).await.unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["status"], "not_ready");
        assert_eq!(body["database"]["up"], false);
        assert!(body["database"]["error"].is_string());
    }

    #[tokio::test]
    async fn test_health_reports_version() {
        let Json(liveness) = health().await;
        assert_eq!(liveness.status, "healthy");
        assert_eq!(liveness.version, VERSION);
    }
}
