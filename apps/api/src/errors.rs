use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::history::HistoryError;

/// Application-level error type for the non-generation endpoints.
/// Generation failures use `GenerationError` and its `{success: false}` body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("History error: {0}")]
    History(#[from] HistoryError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Email and password are required".to_string(),
            ),
            AppError::History(e) => {
                tracing::error!("History error: {e}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "HISTORY_ERROR",
                    "Document history is unavailable".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
