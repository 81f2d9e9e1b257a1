use std::time::Duration;

use thiserror::Error;

/// Failure kinds of the extraction pipeline.
///
/// A failed cleanup-model call is absent on purpose: it is recovered inside
/// the cleanup stage and never reaches the caller.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to parse document: {0}")]
    ParseFailure(String),

    #[error("Extracted text too short ({chars} characters)")]
    EmptyOrCorruptContent { chars: usize },

    #[error("Extraction exceeded {0:?}")]
    Timeout(Duration),

    #[error("Extraction failed: {0}")]
    Transport(String),
}
