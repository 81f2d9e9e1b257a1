// Resume upload extraction.
// Implements: format detection, PDF reading-order reconstruction, DOCX text,
// best-effort LLM cleanup, normalization and the minimum-content gate.
// All model calls go through llm_client::TextCompletion.

pub mod cleanup;
pub mod detect;
pub mod docx;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod normalize;
pub mod pdf;
pub mod pipeline;
pub mod prompts;
pub mod reading_order;

// Re-export the public API consumed by config, state and errors.
pub use errors::ExtractError;
pub use normalize::MIN_CONTENT_CHARS;
pub use pipeline::{ExtractionPipeline, ExtractionSettings};
pub use reading_order::DEFAULT_LINE_TOLERANCE;
