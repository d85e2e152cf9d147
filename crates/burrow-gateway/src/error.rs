use crate::model::ErrorResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use burrow_core::ShortenerError;
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// The request body could not be decoded.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("stored target cannot be used as a redirect location: {0}")]
    BadLocation(String),
    #[error(transparent)]
    Shortener(#[from] ShortenerError),
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid request"),
            AppError::BadLocation(_) => (StatusCode::INTERNAL_SERVER_ERROR, "operation failed"),
            AppError::Shortener(err) => match err {
                ShortenerError::InvalidUrl(_) => (StatusCode::BAD_REQUEST, "invalid URL"),
                ShortenerError::InvalidTtl(_) => (StatusCode::BAD_REQUEST, "invalid expiration"),
                // a malformed code can never have been issued
                ShortenerError::InvalidShortCode(_) | ShortenerError::NotFound(_) => {
                    (StatusCode::NOT_FOUND, "URL not found")
                }
                ShortenerError::Exhausted { .. } => {
                    (StatusCode::SERVICE_UNAVAILABLE, "no short code available")
                }
                ShortenerError::Storage(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "operation failed")
                }
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        (
            status,
            Json(ErrorResponse {
                error: message.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burrow_core::StorageError;

    #[test]
    fn maps_errors_to_statuses() {
        let cases = [
            (AppError::InvalidRequest("eof".into()), StatusCode::BAD_REQUEST),
            (
                ShortenerError::InvalidUrl("x".into()).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                ShortenerError::InvalidShortCode("x".into()).into(),
                StatusCode::NOT_FOUND,
            ),
            (
                ShortenerError::NotFound("abc123".into()).into(),
                StatusCode::NOT_FOUND,
            ),
            (
                ShortenerError::Exhausted { attempts: 16 }.into(),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ShortenerError::Storage(StorageError::Timeout("get".into())).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
