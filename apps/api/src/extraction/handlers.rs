//! Axum route handlers for resume uploads.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use crate::errors::AppError;
use crate::extraction::models::{ExtractedText, UploadedDocument};
use crate::state::AppState;

const FILE_FIELD: &str = "file";

/// POST /api/v1/upload
///
/// Multipart form with a `file` field (PDF or DOCX). Returns the extracted,
/// cleaned resume text with the file's metadata.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractedText>, AppError> {
    let document = read_file_field(&mut multipart)
        .await?
        .ok_or_else(|| AppError::Validation("No file provided".to_string()))?;

    info!(
        "Upload received: {} ({} bytes, {})",
        document.filename, document.size, document.content_type
    );

    let extracted = state.extraction.run(document).await?;
    Ok(Json(extracted))
}

/// Returns the first `file` field, skipping any other form fields.
async fn read_file_field(multipart: &mut Multipart) -> Result<Option<UploadedDocument>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Invalid multipart body", e))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error("Failed to read uploaded file", e))?;
        return Ok(Some(UploadedDocument::new(bytes, content_type, filename)));
    }
    Ok(None)
}

/// Body-limit rejections keep their 413; anything else is a bad request.
fn multipart_error(context: &str, error: MultipartError) -> AppError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(error.body_text())
    } else {
        AppError::Validation(format!("{context}: {}", error.body_text()))
    }
}
