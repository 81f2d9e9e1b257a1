//! DOCX reader: linear paragraph text from `word/document.xml`.
//!
//! Word documents already store paragraphs and runs in reading order, so this
//! is a straight walk of the XML: `w:t` text is appended, tabs and breaks are
//! kept, and each `w:p` ends a paragraph. Paragraphs are separated by a blank
//! line. Legacy binary `.doc` files are not ZIP containers and fail to open.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::info;

use crate::extraction::errors::ExtractError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Extracts raw paragraph text from DOCX bytes.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let xml = read_document_part(bytes)?;
    let text = paragraphs_from_xml(&xml)?.join("\n\n");
    info!("Extracted {} characters from DOCX", text.chars().count());
    Ok(text)
}

fn read_document_part(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractError::ParseFailure(format!("not a DOCX container: {e}")))?;
    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractError::ParseFailure(format!("missing {DOCUMENT_PART}: {e}")))?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| ExtractError::ParseFailure(format!("unreadable {DOCUMENT_PART}: {e}")))?;
    Ok(xml)
}

/// Walks WordprocessingML and returns one string per paragraph, blank ones dropped.
fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:r" => in_run = true,
                b"w:t" => in_text = true,
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:r" => in_run = false,
                b"w:t" => in_text = false,
                b"w:p" => {
                    let paragraph = std::mem::take(&mut current);
                    if !paragraph.trim().is_empty() {
                        paragraphs.push(paragraph);
                    }
                }
                _ => {}
            },
            // Tab stops in `w:pPr/w:tabs` also use `w:tab`; only run content counts.
            Ok(Event::Empty(e)) if in_run => match e.name().as_ref() {
                b"w:tab" => current.push('\t'),
                b"w:br" | b"w:cr" => current.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                let text = e
                    .unescape()
                    .map_err(|err| ExtractError::ParseFailure(format!("bad DOCX text: {err}")))?;
                current.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractError::ParseFailure(format!(
                    "malformed DOCX XML at {}: {e}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
    }

    if !current.trim().is_empty() {
        paragraphs.push(current);
    }
    Ok(paragraphs)
}
