//! Mock progress handler

use axum::Json;
use cashlens_common::{metrics, progress::{self, ProgressReport}};
use tracing::debug;

/// Report a randomly chosen status. Not tied to any upload.
pub async fn progress() -> Json<ProgressReport> {
    let report = progress::random_report();

    debug!(message = %report.message, finished = report.finished, "Progress polled");
    metrics::record_progress_poll(report.finished);

    Json(report)
}
