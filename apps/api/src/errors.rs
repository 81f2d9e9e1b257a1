use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extraction::ExtractError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error(transparent)]
    Extraction(#[from] ExtractError),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::PayloadTooLarge(msg) => {
                tracing::warn!("Upload rejected: {msg}");
                (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    "PAYLOAD_TOO_LARGE",
                    "File is too large".to_string(),
                )
            }
            AppError::Extraction(e) => extraction_parts(e),
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::NotConfigured(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "NOT_CONFIGURED",
                msg.clone(),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        }
    }
}

fn extraction_parts(error: &ExtractError) -> (StatusCode, &'static str, String) {
    match error {
        ExtractError::UnsupportedFormat(_) => (
            StatusCode::BAD_REQUEST,
            "UNSUPPORTED_FORMAT",
            "Unsupported file type. Please upload PDF or DOCX files.".to_string(),
        ),
        ExtractError::EmptyOrCorruptContent { .. } => (
            StatusCode::BAD_REQUEST,
            "EMPTY_OR_CORRUPT_CONTENT",
            "Could not extract text from file. File may be empty or corrupted.".to_string(),
        ),
        ExtractError::ParseFailure(detail) => {
            tracing::error!("File parsing error: {detail}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "PARSE_FAILURE",
                "Failed to parse file. Please ensure it is a valid PDF or DOCX file.".to_string(),
            )
        }
        ExtractError::Timeout(limit) => {
            tracing::error!("Upload processing exceeded {limit:?}");
            (
                StatusCode::GATEWAY_TIMEOUT,
                "TIMEOUT",
                "File processing timed out".to_string(),
            )
        }
        ExtractError::Transport(detail) => {
            tracing::error!("Upload error: {detail}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "PROCESSING_ERROR",
                "Failed to process file upload".to_string(),
            )
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
