//! LLM cleanup stage: best-effort reformatting of raw extracted text.
//!
//! The hosted model is consumed as `prompt in, text out` through
//! `TextCompletion`. Exactly one call is made; any failure falls back to the
//! raw text with page-break seams removed. Nothing here returns an error.

use tracing::{info, warn};

use crate::extraction::detect::DocumentFormat;
use crate::extraction::prompts::{DOCX_CLEANUP_PROMPT_TEMPLATE, PDF_CLEANUP_PROMPT_TEMPLATE};
use crate::extraction::reading_order::strip_page_breaks;
use crate::llm_client::prompts::NO_COMMENTARY_INSTRUCTION;
use crate::llm_client::TextCompletion;

/// What the cleanup stage did with the raw text.
#[derive(Debug, Clone, PartialEq)]
pub enum CleanupOutcome {
    /// The model reformatted the text.
    Cleaned(String),
    /// Raw text at or below the gate, or cleanup disabled; no call made.
    Skipped(String),
    /// The model call failed; raw text is used instead.
    Fallback { text: String, reason: String },
}

impl CleanupOutcome {
    pub fn text(&self) -> &str {
        match self {
            CleanupOutcome::Cleaned(text) | CleanupOutcome::Skipped(text) => text,
            CleanupOutcome::Fallback { text, .. } => text,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CleanupOutcome::Cleaned(_) => "cleaned",
            CleanupOutcome::Skipped(_) => "skipped",
            CleanupOutcome::Fallback { .. } => "fallback",
        }
    }
}

pub fn build_cleanup_prompt(format: DocumentFormat, raw_text: &str) -> String {
    let template = match format {
        DocumentFormat::Pdf => PDF_CLEANUP_PROMPT_TEMPLATE,
        DocumentFormat::Docx => DOCX_CLEANUP_PROMPT_TEMPLATE,
    };
    format!(
        "{}\n\n{}",
        template.replace("{raw_text}", raw_text),
        NO_COMMENTARY_INSTRUCTION
    )
}

/// Runs the cleanup stage. `llm` is `None` when cleanup is disabled.
///
/// The model is only called when the raw text is longer than `min_chars`.
pub async fn cleanup_text(
    raw_text: &str,
    format: DocumentFormat,
    llm: Option<&dyn TextCompletion>,
    min_chars: usize,
) -> CleanupOutcome {
    let Some(llm) = llm else {
        return CleanupOutcome::Skipped(strip_page_breaks(raw_text));
    };
    if raw_text.chars().count() <= min_chars {
        return CleanupOutcome::Skipped(strip_page_breaks(raw_text));
    }

    info!("Cleaning {} text with the completion model...", format.label());
    let prompt = build_cleanup_prompt(format, raw_text);

    match llm.complete(&prompt).await {
        Ok(cleaned) if !cleaned.trim().is_empty() => {
            info!("{} text cleaned successfully", format.label());
            CleanupOutcome::Cleaned(strip_page_breaks(cleaned.trim()))
        }
        Ok(_) => {
            warn!("Cleanup model returned empty text, using raw text");
            CleanupOutcome::Fallback {
                text: strip_page_breaks(raw_text),
                reason: "empty model output".to_string(),
            }
        }
        Err(e) => {
            warn!("Cleanup model unavailable, using raw text: {e}");
            CleanupOutcome::Fallback {
                text: strip_page_breaks(raw_text),
                reason: e.to_string(),
            }
        }
    }
}
