use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use reelshelf_core::MediaError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

pub type AppResult<T> = Result<T, AppError>;

/// Error body returned by every handler: `{"error":{"message","status"}}`.
#[derive(Debug, Error)]
#[error("{status}: {message}")]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "message": self.message,
                "status": self.status.as_u16(),
            }
        }));

        (self.status, body).into_response()
    }
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        match err {
            // Host paths stay out of responses
            MediaError::NotFound(_) => Self::not_found("Path not found"),
            MediaError::NotMedia(_) => Self::bad_request("Not a media file"),
            MediaError::InvalidPath(_)
            | MediaError::InvalidProgress(_)
            | MediaError::Filter(_) => Self::bad_request(err.to_string()),
            MediaError::Io(_) | MediaError::Internal(_) => {
                error!("request failed: {err}");
                Self::internal("Internal server error")
            }
        }
    }
}
