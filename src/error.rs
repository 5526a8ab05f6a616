//! Error taxonomy shared by the store, the ingestion pipeline, and the
//! HTTP layer.
//!
//! Errors are produced at the component boundary and returned verbatim;
//! nothing here retries. Unexpected faults collapse into `Internal` with a
//! stable message so no internal detail reaches the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Errors surfaced to API callers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing required field or malformed input (dates included)
    #[error("{0}")]
    Validation(String),

    /// Registration attempted with an email that already resolves
    #[error("User exists")]
    DuplicateUser,

    /// Missing, invalid, or expired credential
    #[error("Unauthorized")]
    Unauthorized,

    /// Content absent or owned by someone else; the two are
    /// indistinguishable by design
    #[error("Not found")]
    NotFound,

    /// Upload MIME/extension outside the allowed set
    #[error("Unsupported file type")]
    UnsupportedFileType,

    /// Upload above the size cap
    #[error("Payload too large")]
    PayloadTooLarge,

    /// None of file, url, or text supplied
    #[error("No content provided")]
    NoContentProvided,

    /// PDF parse or page fetch failed; message stays opaque, the cause is
    /// kept for logs only
    #[error("Extraction failed")]
    ExtractionFailed(#[source] anyhow::Error),

    /// Anything unexpected
    #[error("Server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::NoContentProvided => StatusCode::BAD_REQUEST,
            ApiError::DuplicateUser => StatusCode::CONFLICT,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::UnsupportedFileType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::ExtractionFailed(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Causes are logged here and never serialized into the body.
        match &self {
            ApiError::ExtractionFailed(cause) => {
                tracing::warn!(error = %cause, "extraction failed");
            }
            ApiError::Internal(cause) => {
                tracing::error!(error = %cause, "unhandled internal error");
            }
            _ => {}
        }

        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
