use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::document_client::DocumentError;
use crate::editor::template::TemplateError;
use crate::layout::LayoutError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// None of these are fatal: every failure leaves the editor session as it was,
/// and the user retries the action that triggered it.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Document service error: {0}")]
    DocumentService(#[from] DocumentError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Layout(e) => (StatusCode::BAD_REQUEST, "LAYOUT_INVALID", e.to_string()),
            AppError::Template(e) => {
                tracing::warn!("Template error: {e}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "TEMPLATE_UNREADABLE",
                    e.to_string(),
                )
            }
            AppError::DocumentService(e) => {
                tracing::error!("Document service error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "DOCUMENT_SERVICE_ERROR",
                    "The document service request failed".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
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
