//! Error types for Cash Lens services
//!
//! Provides:
//! - Distinct error types for each failure mode of the upload flow
//! - HTTP status code mapping
//! - Plain-text public bodies that never leak persistence details
//! - Error codes for log correlation

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    MissingFile,
    EmptyFilename,
    InvalidFormat,
    PayloadTooLarge,

    // Conflict errors (5xxx)
    DuplicateName,

    // Database errors (7xxx)
    DatabaseError,
    ConnectionError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            ErrorCode::MissingFile => 1001,
            ErrorCode::EmptyFilename => 1002,
            ErrorCode::InvalidFormat => 1003,
            ErrorCode::PayloadTooLarge => 1004,

            ErrorCode::DuplicateName => 5001,

            ErrorCode::DatabaseError => 7001,
            ErrorCode::ConnectionError => 7002,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Upload validation errors
    #[error("No file part")]
    MissingFile,

    #[error("No selected file")]
    EmptyFilename,

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("Payload too large: {message}")]
    PayloadTooLarge { message: String },

    // Persistence errors
    #[error("A file named {name} has already been recorded")]
    DuplicateName { name: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Database connection error: {message}")]
    DatabaseConnection { message: String },
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::MissingFile => ErrorCode::MissingFile,
            AppError::EmptyFilename => ErrorCode::EmptyFilename,
            AppError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            AppError::PayloadTooLarge { .. } => ErrorCode::PayloadTooLarge,
            AppError::DuplicateName { .. } => ErrorCode::DuplicateName,
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::DatabaseConnection { .. } => ErrorCode::ConnectionError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::MissingFile |
            AppError::EmptyFilename |
            AppError::InvalidFormat { .. } => StatusCode::BAD_REQUEST,

            // 413 Payload Too Large
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,

            // 500 Internal Server Error; a duplicate name is a failed write, not a conflict
            AppError::DuplicateName { .. } |
            AppError::Database(_) |
            AppError::DatabaseConnection { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Text returned to the caller. Server errors collapse to a generic message.
    pub fn public_message(&self) -> String {
        if self.is_server_error() {
            "Internal Server Error".to_string()
        } else {
            self.to_string()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();

        // Log based on severity
        if self.is_server_error() {
            tracing::error!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
        }

        (status, self.public_message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn test_upload_validation_errors() {
        let err = AppError::MissingFile;
        assert_eq!(err.code(), ErrorCode::MissingFile);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "No file part");

        let err = AppError::EmptyFilename;
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.is_client_error());
        assert_eq!(err.public_message(), "No selected file");
    }

    #[test]
    fn test_duplicate_name_is_server_error() {
        let err = AppError::DuplicateName { name: "a.csv".into() };
        assert_eq!(err.code().as_code(), 5001);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.is_server_error());
        assert_eq!(err.public_message(), "Internal Server Error");
    }

    #[test]
    fn test_persistence_errors_map_to_500() {
        let errors = [
            AppError::DuplicateName { name: "a.csv".into() },
            AppError::Database(sea_orm::DbErr::Custom("insert failed".into())),
            AppError::DatabaseConnection { message: "pool closed".into() },
        ];
        let codes: Vec<ErrorCode> = errors.iter().map(AppError::code).collect();

        assert_eq!(
            codes,
            vec![ErrorCode::DuplicateName, ErrorCode::DatabaseError, ErrorCode::ConnectionError]
        );
        for err in &errors {
            assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(err.public_message(), "Internal Server Error");
        }
    }

    #[test]
    fn test_multipart_errors_are_client_errors() {
        let invalid = AppError::InvalidFormat { message: "incomplete field data".into() };
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.public_message(), "Invalid format: incomplete field data");

        let too_large = AppError::PayloadTooLarge { message: "length limit exceeded".into() };
        assert_eq!(too_large.code().as_code(), 1004);
        assert_eq!(too_large.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_response_hides_detail() {
        let err = AppError::Database(sea_orm::DbErr::Custom("relation \"files\" missing".into()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Internal Server Error");
    }
}
