use std::sync::Arc;

use crate::config::Config;
use crate::extraction::ExtractionPipeline;
use crate::llm_client::TextCompletion;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Upload pipeline; owns the cleanup model handle.
    pub extraction: ExtractionPipeline,
    /// Groq model for ATS analysis and the coach chat; `None` without a key.
    pub analysis_llm: Option<Arc<dyn TextCompletion>>,
}
