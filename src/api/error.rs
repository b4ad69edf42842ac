use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Error taxonomy for the REST surface. Every failure becomes an
/// `{"error": "..."}` body; validation and conflict errors answer 400,
/// missing records 404, everything else 500. Internal causes are logged,
/// never echoed to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed request parameter.
    #[error("{0}")]
    BadParams(String),

    /// Requested record does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Write rejected because a record with the same natural key exists.
    #[error("{0}")]
    Conflict(String),

    /// Store or serialization failure. The message shown to the caller is
    /// deliberately generic.
    #[error("internal server error")]
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn bad_params(msg: impl Into<String>) -> Self {
        ApiError::BadParams(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        ApiError::Conflict(msg.into())
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(e: rusqlite::Error) -> Self {
        ApiError::Internal(e.into())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Internal(e.into())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(e)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadParams(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Internal(cause) = self {
            tracing::error!(error = ?cause, "request failed");
        }
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
