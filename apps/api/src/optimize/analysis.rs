//! ATS analysis: asks the analysis model to score a resume against a job
//! description and validates the JSON it returns.

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::{parse_json_reply, LlmError, TextCompletion};
use crate::optimize::prompts::ATS_ANALYSIS_PROMPT_TEMPLATE;

/// Shape the model is asked to produce. Field types are enforced by serde.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsAnalysis {
    pub ats_score: f64,
    pub missing_keywords: Vec<String>,
    pub matched_keywords: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Report returned to API callers.
#[derive(Debug, Clone, Serialize)]
pub struct AtsReport {
    pub ats_score: u32,
    pub keywords_to_add: Vec<String>,
    pub matched_keywords: Vec<String>,
    pub suggestions: Vec<String>,
}

impl From<AtsAnalysis> for AtsReport {
    fn from(analysis: AtsAnalysis) -> Self {
        Self {
            ats_score: clamp_score(analysis.ats_score),
            keywords_to_add: analysis.missing_keywords,
            matched_keywords: analysis.matched_keywords,
            suggestions: analysis.suggestions,
        }
    }
}

fn clamp_score(score: f64) -> u32 {
    if score.is_nan() {
        return 0;
    }
    score.round().clamp(0.0, 100.0) as u32
}

pub fn build_analysis_prompt(resume_text: &str, job_description: &str) -> String {
    format!(
        "{}\n\n{}",
        ATS_ANALYSIS_PROMPT_TEMPLATE
            .replace("{resume_text}", resume_text)
            .replace("{job_description}", job_description),
        JSON_ONLY_INSTRUCTION
    )
}

/// Runs one analysis call. No retries and no fallback: failures surface as `AppError::Llm`.
pub async fn analyze_resume(
    resume_text: &str,
    job_description: &str,
    llm: &dyn TextCompletion,
) -> Result<AtsReport, AppError> {
    let prompt = build_analysis_prompt(resume_text, job_description);

    let reply = llm
        .complete(&prompt)
        .await
        .map_err(|e| AppError::Llm(format!("Failed to generate AI response: {e}")))?;
    info!("ATS analysis reply: {} characters", reply.chars().count());

    let analysis: AtsAnalysis = parse_json_reply(&reply).map_err(|e| {
        let preview: String = reply.chars().take(500).collect();
        error!("Unparseable ATS analysis reply: {preview}");
        match e {
            LlmError::Parse(inner) if inner.is_data() => {
                AppError::Llm(format!("AI response structure is invalid: {inner}"))
            }
            other => AppError::Llm(format!("AI response was not in valid JSON format: {other}")),
        }
    })?;

    Ok(analysis.into())
}
