//! File upload handler
//!
//! Records the uploaded file's name and returns its line count. File content
//! is never stored; it is dropped when the request finishes.

use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::AppState;
use cashlens_common::{
    db::Repository,
    errors::{AppError, Result},
    metrics, text, DEFAULT_PARSER_NAME,
};

/// Multipart field carrying the file
pub const FILE_FIELD: &str = "file";

/// Response after a successful upload
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub file_name: String,
    pub lines: usize,
}

/// Record an uploaded file and count its lines
#[instrument(skip_all)]
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let (file_name, payload) = match read_file_part(&mut multipart).await {
        Ok(part) => part,
        Err(err) => {
            metrics::record_upload(outcome(&err), 0, 0);
            return Err(err);
        }
    };

    let repo = Repository::new(state.db.clone());
    let record = match repo.create_file(&file_name, DEFAULT_PARSER_NAME, Some(0)).await {
        Ok(record) => record,
        Err(err) => {
            metrics::record_upload(outcome(&err), payload.len(), 0);
            return Err(err);
        }
    };

    let lines = text::count_payload_lines(&payload);

    info!(
        file_id = record.id,
        file_name = %file_name,
        bytes = payload.len(),
        lines,
        "File upload recorded"
    );
    metrics::record_upload("success", payload.len(), lines);

    Ok(Json(UploadResponse { file_name, lines }))
}

/// Find the `file` part and read it fully into memory.
///
/// A `file` part without a filename is a plain form value, not a file.
async fn read_file_part(multipart: &mut Multipart) -> Result<(String, Bytes)> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        if file_name.is_empty() {
            return Err(AppError::EmptyFilename);
        }

        let payload = field.bytes().await.map_err(multipart_error)?;
        return Ok((file_name, payload));
    }

    Err(AppError::MissingFile)
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge { message: err.body_text() }
    } else {
        AppError::InvalidFormat { message: err.body_text() }
    }
}

fn outcome(err: &AppError) -> &'static str {
    match err {
        AppError::MissingFile => "missing_file",
        AppError::EmptyFilename => "empty_filename",
        AppError::PayloadTooLarge { .. } => "too_large",
        AppError::InvalidFormat { .. } => "invalid",
        AppError::DuplicateName { .. } => "duplicate",
        _ => "error",
    }
}
