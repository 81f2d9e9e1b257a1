use bytes::Bytes;
use serde::Serialize;

/// A file as received from the multipart upload. Immutable once built.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub bytes: Bytes,
    /// Declared by the client; never re-derived from the bytes.
    pub content_type: String,
    pub filename: String,
    pub size: usize,
}

impl UploadedDocument {
    pub fn new(bytes: Bytes, content_type: impl Into<String>, filename: impl Into<String>) -> Self {
        let size = bytes.len();
        Self {
            bytes,
            content_type: content_type.into(),
            filename: filename.into(),
            size,
        }
    }
}

/// One positioned fragment of text from a PDF content stream.
/// `x`/`y` are the baseline origin in page space (origin bottom-left).
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

impl TextRun {
    pub fn new(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            text: text.into(),
            x,
            y,
        }
    }
}

/// Reading-order text for a single page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageText {
    pub page_number: u32,
    pub text: String,
}

/// The only value that leaves the pipeline on success.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedText {
    pub text: String,
    pub filename: String,
    pub size: usize,
    #[serde(rename = "type")]
    pub content_type: String,
}
