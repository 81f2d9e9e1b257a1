//! Upload extraction pipeline.
//!
//! Detector → (PDF reconstructor | DOCX reader) → cleanup stage → normalizer.
//!
//! Parsing is CPU-bound and runs under `spawn_blocking`. The whole run is
//! bounded by `request_timeout`; on expiry nothing partial is returned.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, Instrument};
use uuid::Uuid;

use crate::config::Config;
use crate::extraction::cleanup::cleanup_text;
use crate::extraction::detect::{detect_format, DocumentFormat};
use crate::extraction::docx::extract_docx_text;
use crate::extraction::errors::ExtractError;
use crate::extraction::models::{ExtractedText, UploadedDocument};
use crate::extraction::normalize::{finalize_text, MIN_CONTENT_CHARS};
use crate::extraction::pdf::extract_pdf_text;
use crate::extraction::reading_order::DEFAULT_LINE_TOLERANCE;
use crate::llm_client::TextCompletion;

/// Tunables for one pipeline instance.
#[derive(Debug, Clone)]
pub struct ExtractionSettings {
    pub line_tolerance: f64,
    pub min_content_chars: usize,
    pub request_timeout: Duration,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            line_tolerance: DEFAULT_LINE_TOLERANCE,
            min_content_chars: MIN_CONTENT_CHARS,
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl From<&Config> for ExtractionSettings {
    fn from(config: &Config) -> Self {
        Self {
            line_tolerance: config.line_tolerance,
            min_content_chars: config.min_content_chars,
            request_timeout: config.request_timeout,
        }
    }
}

/// Stateless between requests; cheap to clone into handlers.
#[derive(Clone)]
pub struct ExtractionPipeline {
    cleanup_llm: Option<Arc<dyn TextCompletion>>,
    settings: ExtractionSettings,
}

impl ExtractionPipeline {
    pub fn new(cleanup_llm: Option<Arc<dyn TextCompletion>>, settings: ExtractionSettings) -> Self {
        Self {
            cleanup_llm,
            settings,
        }
    }

    /// Runs the full pipeline under the request deadline.
    pub async fn run(&self, document: UploadedDocument) -> Result<ExtractedText, ExtractError> {
        let span = tracing::info_span!(
            "extract",
            request_id = %Uuid::new_v4(),
            filename = %document.filename,
            size = document.size,
        );
        let deadline = self.settings.request_timeout;

        tokio::time::timeout(deadline, self.run_stages(document))
            .instrument(span)
            .await
            .map_err(|_| ExtractError::Timeout(deadline))?
    }

    async fn run_stages(&self, document: UploadedDocument) -> Result<ExtractedText, ExtractError> {
        let format = detect_format(&document.content_type)?;
        info!("Processing {}...", format.label());

        let raw_text = self.extract_raw(format, &document).await?;

        let outcome = cleanup_text(
            &raw_text,
            format,
            self.cleanup_llm.as_deref(),
            self.settings.min_content_chars,
        )
        .await;
        info!("Cleanup stage: {}", outcome.label());

        let text = finalize_text(outcome.text(), self.settings.min_content_chars)?;
        info!("Returning {} characters", text.chars().count());

        Ok(ExtractedText {
            text,
            filename: document.filename,
            size: document.size,
            content_type: document.content_type,
        })
    }

    /// Format-specific raw extraction, off the async executor.
    async fn extract_raw(
        &self,
        format: DocumentFormat,
        document: &UploadedDocument,
    ) -> Result<String, ExtractError> {
        let bytes = document.bytes.clone();
        let line_tolerance = self.settings.line_tolerance;

        tokio::task::spawn_blocking(move || match format {
            DocumentFormat::Pdf => extract_pdf_text(&bytes, line_tolerance),
            DocumentFormat::Docx => extract_docx_text(&bytes),
        })
        .await
        .map_err(|e| ExtractError::Transport(format!("extraction task failed: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::cleanup::test_support::MockCompletion;
    use crate::extraction::detect::{MIME_DOCX, MIME_PDF};
    use crate::extraction::docx::test_support::build_docx;
    use crate::extraction::pdf::test_support::build_pdf;
    use crate::llm_client::LlmError;
    use async_trait::async_trait;
    use bytes::Bytes;

    const CLEANED: &str = "CONTACT\nJane Doe | jane@x.com\n\nSKILLS\nRust, Go, PostgreSQL, Kubernetes";

    fn pipeline_with(llm: Arc<MockCompletion>) -> ExtractionPipeline {
        ExtractionPipeline::new(Some(llm), ExtractionSettings::default())
    }

    fn resume_pdf() -> Vec<u8> {
        build_pdf(&[
            vec![
                ("Jane Doe", 10, 700),
                ("jane@x.com", 200, 700),
                ("Senior Software Engineer at Acme Corp", 10, 680),
            ],
            vec![("Skills: Rust, Go, PostgreSQL, Kubernetes", 10, 700)],
        ])
    }

    fn upload(bytes: Vec<u8>, content_type: &str, filename: &str) -> UploadedDocument {
        UploadedDocument::new(Bytes::from(bytes), content_type, filename)
    }

    #[tokio::test]
    async fn test_pdf_upload_is_cleaned_and_normalized() {
        let llm = Arc::new(MockCompletion::replying(CLEANED));
        let result = pipeline_with(llm.clone())
            .run(upload(resume_pdf(), MIME_PDF, "jane.pdf"))
            .await
            .unwrap();

        assert_eq!(llm.calls(), 1);
        assert_eq!(
            result.text,
            "CONTACT Jane Doe | jane@x.com SKILLS Rust, Go, PostgreSQL, Kubernetes"
        );
        assert_eq!(result.filename, "jane.pdf");
        assert_eq!(result.content_type, MIME_PDF);
        assert!(result.size > 0);

        let prompt = llm.last_prompt().unwrap();
        assert!(prompt.contains(
            "Jane Doe jane@x.com\nSenior Software Engineer at Acme Corp\n\n--- Page Break ---\n\nSkills"
        ));
    }

    #[tokio::test]
    async fn test_model_failure_still_succeeds_with_raw_text() {
        let llm = Arc::new(MockCompletion::failing(500));
        let result = pipeline_with(llm.clone())
            .run(upload(resume_pdf(), MIME_PDF, "jane.pdf"))
            .await
            .unwrap();

        assert_eq!(llm.calls(), 1);
        assert_eq!(
            result.text,
            "Jane Doe jane@x.com Senior Software Engineer at Acme Corp Skills: Rust, Go, PostgreSQL, Kubernetes"
        );
    }

    #[tokio::test]
    async fn test_short_extraction_skips_model_and_reports_empty_content() {
        let llm = Arc::new(MockCompletion::replying(CLEANED));
        let bytes = build_pdf(&[vec![("Jane Doe", 10, 700)], vec![("Skills", 10, 700)]]);
        let err = pipeline_with(llm.clone())
            .run(upload(bytes, MIME_PDF, "short.pdf"))
            .await
            .unwrap_err();

        assert_eq!(llm.calls(), 0);
        assert!(matches!(err, ExtractError::EmptyOrCorruptContent { .. }));
    }

    #[tokio::test]
    async fn test_short_cleaned_output_is_rejected() {
        let llm = Arc::new(MockCompletion::replying("Jane Doe"));
        let err = pipeline_with(llm.clone())
            .run(upload(resume_pdf(), MIME_PDF, "jane.pdf"))
            .await
            .unwrap_err();

        assert_eq!(llm.calls(), 1);
        assert!(matches!(err, ExtractError::EmptyOrCorruptContent { chars: 8 }));
    }

    #[tokio::test]
    async fn test_unsupported_type_rejected_before_extraction() {
        let llm = Arc::new(MockCompletion::replying(CLEANED));
        // Valid PDF bytes: if an extractor ran, this would not be UnsupportedFormat.
        let err = pipeline_with(llm.clone())
            .run(upload(resume_pdf(), "image/png", "photo.png"))
            .await
            .unwrap_err();

        assert_eq!(llm.calls(), 0);
        assert!(matches!(err, ExtractError::UnsupportedFormat(ref t) if t == "image/png"));
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_parse_failure_without_model_call() {
        let llm = Arc::new(MockCompletion::replying(CLEANED));
        let err = pipeline_with(llm.clone())
            .run(upload(b"%PDF-1.7 truncated".to_vec(), MIME_PDF, "broken.pdf"))
            .await
            .unwrap_err();

        assert_eq!(llm.calls(), 0);
        assert!(matches!(err, ExtractError::ParseFailure(_)));
    }

    #[tokio::test]
    async fn test_docx_upload_uses_docx_prompt() {
        let llm = Arc::new(MockCompletion::replying(CLEANED));
        let bytes = build_docx(&[
            "Jane Doe, jane@x.com",
            "Senior Software Engineer at Acme Corp, 2019 to present",
        ]);
        let result = pipeline_with(llm.clone())
            .run(upload(bytes, MIME_DOCX, "jane.docx"))
            .await
            .unwrap();

        assert!(result.text.starts_with("CONTACT Jane Doe"));
        assert!(llm
            .last_prompt()
            .unwrap()
            .starts_with("Clean and properly format this resume text"));
    }

    #[tokio::test]
    async fn test_docx_without_cleanup_model_returns_normalized_raw_text() {
        let bytes = build_docx(&["Jane   Doe", "", "Senior Software Engineer at Acme Corp since 2019"]);
        let pipeline = ExtractionPipeline::new(None, ExtractionSettings::default());
        let result = pipeline.run(upload(bytes, MIME_DOCX, "jane.docx")).await.unwrap();
        assert_eq!(
            result.text,
            "Jane Doe Senior Software Engineer at Acme Corp since 2019"
        );
    }

    struct StalledCompletion;

    #[async_trait]
    impl TextCompletion for StalledCompletion {
        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(String::new())
        }
    }

    #[tokio::test]
    async fn test_slow_model_hits_request_timeout() {
        let settings = ExtractionSettings {
            request_timeout: Duration::from_millis(200),
            ..ExtractionSettings::default()
        };
        let pipeline = ExtractionPipeline::new(Some(Arc::new(StalledCompletion)), settings);
        let err = pipeline
            .run(upload(resume_pdf(), MIME_PDF, "jane.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Timeout(d) if d == Duration::from_millis(200)));
    }
}
