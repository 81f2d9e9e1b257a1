//! Axum route handlers for ATS optimization.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::optimize::analysis::{analyze_resume, AtsReport};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OptimizeRequest {
    #[serde(default)]
    pub resume_text: String,
    #[serde(default)]
    pub job_description: String,
}

/// POST /api/v1/optimize
///
/// Scores resume text against a job description with the analysis model.
pub async fn handle_optimize(
    State(state): State<AppState>,
    payload: Result<Json<OptimizeRequest>, JsonRejection>,
) -> Result<Json<AtsReport>, AppError> {
    let Json(request) =
        payload.map_err(|e| AppError::Validation(format!("Invalid request body: {}", e.body_text())))?;
    if request.resume_text.trim().is_empty() || request.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "Resume text and job description are required".to_string(),
        ));
    }

    let llm = state.analysis_llm.as_deref().ok_or_else(|| {
        AppError::NotConfigured("AI service not configured. Please set GROQ_API_KEY.".to_string())
    })?;

    let report = analyze_resume(&request.resume_text, &request.job_description, llm).await?;
    Ok(Json(report))
}
