use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::render::RenderError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("Embedding service unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Generation service unavailable: {0}")]
    GenerationUnavailable(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::InvalidBody(rejection) => {
                tracing::warn!("Rejected request body: {rejection}");
                (rejection.status(), "INVALID_BODY", rejection.body_text())
            }
            AppError::EmbeddingUnavailable(msg) => {
                tracing::error!("Embedding error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "EMBEDDING_UNAVAILABLE",
                    "The embedding service could not be reached".to_string(),
                )
            }
            AppError::GenerationUnavailable(msg) => {
                tracing::error!("Generation error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "GENERATION_UNAVAILABLE",
                    "The text generation service could not be reached".to_string(),
                )
            }
            AppError::Catalog(e) => {
                tracing::error!("Catalog error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CATALOG_ERROR",
                    "The fund catalog could not be loaded".to_string(),
                )
            }
            AppError::Render(e) => {
                tracing::error!("Render error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_ERROR",
                    "The document could not be rendered".to_string(),
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
