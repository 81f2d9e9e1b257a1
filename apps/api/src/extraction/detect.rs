//! Format detection from the declared MIME type.

use crate::extraction::errors::ExtractError;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_DOC: &str = "application/msword";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    /// Word documents, both OOXML and legacy declared types.
    Docx,
}

impl DocumentFormat {
    pub fn label(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
        }
    }
}

/// Selects exactly one extraction strategy for a declared MIME type.
///
/// The comparison is exact, matching what browsers send for these types.
/// File bytes are not sniffed.
pub fn detect_format(content_type: &str) -> Result<DocumentFormat, ExtractError> {
    match content_type {
        MIME_PDF => Ok(DocumentFormat::Pdf),
        MIME_DOCX | MIME_DOC => Ok(DocumentFormat::Docx),
        other => Err(ExtractError::UnsupportedFormat(other.to_string())),
    }
}
