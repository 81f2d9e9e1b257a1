//! PDF reader: recovers positioned text runs per page with `lopdf`, then hands
//! them to the reading-order reconstruction.
//!
//! # Fallback chain
//! 1. Positional pass: interpret each page's content stream and emit one
//!    `TextRun` per text-showing operator.
//! 2. If the document uses composite (Type0) fonts, whose codes this pass
//!    cannot map to Unicode, or no run is recovered at all, the whole document
//!    goes through `pdf-extract` instead.
//! 3. If that also fails, the document is a `ParseFailure`.
//!
//! Runs synchronously; callers wrap it in `spawn_blocking`.

use std::collections::BTreeMap;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, info, warn};

use crate::extraction::errors::ExtractError;
use crate::extraction::models::TextRun;
use crate::extraction::reading_order::{join_pages, reconstruct_pages};

/// `TJ` adjustments at or below this (thousandths of an em) read as a word gap.
const TJ_WORD_GAP: f64 = -250.0;

/// Average glyph advance as a fraction of the font size. Only used to move the
/// pen after a show operator so consecutive runs on one line keep their order.
const APPROX_GLYPH_ADVANCE: f64 = 0.5;

/// Result of the positional pass over a whole document.
#[derive(Debug, Default)]
pub struct PositionedPages {
    pub pages: Vec<Vec<TextRun>>,
    /// At least one page selected a font the positional decoder cannot map.
    pub undecodable_fonts: bool,
}

impl PositionedPages {
    fn run_count(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }
}

/// Extracts reading-order text from PDF bytes, pages joined by the page-break marker.
pub fn extract_pdf_text(bytes: &[u8], line_tolerance: f64) -> Result<String, ExtractError> {
    let positioned = read_positioned_pages(bytes)?;
    info!(
        "PDF has {} pages, {} text runs",
        positioned.pages.len(),
        positioned.run_count()
    );

    if positioned.undecodable_fonts || positioned.run_count() == 0 {
        warn!(
            "Positional pass unusable (undecodable_fonts={}), falling back to pdf-extract",
            positioned.undecodable_fonts
        );
        return extract_with_pdf_extract(bytes);
    }

    let pages = reconstruct_pages(&positioned.pages, line_tolerance);
    for page in &pages {
        debug!("page {}: {} characters", page.page_number, page.text.chars().count());
    }
    let text = join_pages(&pages);
    info!("Extracted {} characters from PDF", text.chars().count());
    Ok(text)
}

/// Loads the document and collects text runs for every page, in page order.
pub fn read_positioned_pages(bytes: &[u8]) -> Result<PositionedPages, ExtractError> {
    let doc = Document::load_mem(bytes)
        .map_err(|e| ExtractError::ParseFailure(format!("invalid PDF: {e}")))?;

    if doc.trailer.get(b"Encrypt").is_ok() {
        return Err(ExtractError::ParseFailure("PDF is encrypted".to_string()));
    }

    let page_ids = doc.get_pages();
    if page_ids.is_empty() {
        return Err(ExtractError::ParseFailure("PDF has no pages".to_string()));
    }

    let mut result = PositionedPages::default();
    for (page_number, page_id) in page_ids {
        let (runs, undecodable) = read_page_runs(&doc, page_id).map_err(|e| {
            ExtractError::ParseFailure(format!("page {page_number}: {e}"))
        })?;
        debug!("page {page_number}: {} runs", runs.len());
        result.undecodable_fonts |= undecodable;
        result.pages.push(runs);
    }
    Ok(result)
}

/// Whole-document text via `pdf-extract`. The library can panic on malformed
/// input, so the call is isolated with `catch_unwind`.
fn extract_with_pdf_extract(bytes: &[u8]) -> Result<String, ExtractError> {
    let outcome = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes));
    match outcome {
        Ok(Ok(text)) if !text.trim().is_empty() => {
            info!("Extracted {} characters via pdf-extract", text.chars().count());
            Ok(text)
        }
        Ok(Ok(_)) => Err(ExtractError::ParseFailure(
            "pdf-extract found no text in the document".to_string(),
        )),
        Ok(Err(e)) => Err(ExtractError::ParseFailure(format!("pdf-extract: {e}"))),
        Err(_) => Err(ExtractError::ParseFailure(
            "pdf-extract panicked while reading the document".to_string(),
        )),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Content stream interpretation
// ────────────────────────────────────────────────────────────────────────────

/// Affine matrix `[a b c d e f]` in PDF order.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f64; 6]);

impl Matrix {
    const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn translation(tx: f64, ty: f64) -> Matrix {
        Matrix([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    /// `self × other`, i.e. apply `self` first.
    fn then(self, other: Matrix) -> Matrix {
        let [a1, b1, c1, d1, e1, f1] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Matrix([
            a1 * a2 + b1 * c2,
            a1 * b2 + b1 * d2,
            c1 * a2 + d1 * c2,
            c1 * b2 + d1 * d2,
            e1 * a2 + f1 * c2 + e2,
            e1 * b2 + f1 * d2 + f2,
        ])
    }

    fn origin(self) -> (f64, f64) {
        (self.0[4], self.0[5])
    }
}

#[derive(Debug, Clone, Copy)]
enum FontDecoding<'a> {
    Simple(&'a str),
    Composite,
}

struct TextState<'a> {
    ctm: Matrix,
    ctm_stack: Vec<Matrix>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    leading: f64,
    font_size: f64,
    font: Option<FontDecoding<'a>>,
    runs: Vec<TextRun>,
    undecodable: bool,
}

impl<'a> TextState<'a> {
    fn new() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            ctm_stack: Vec::new(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            leading: 0.0,
            font_size: 0.0,
            font: None,
            runs: Vec::new(),
            undecodable: false,
        }
    }

    fn move_line(&mut self, tx: f64, ty: f64) {
        self.line_matrix = Matrix::translation(tx, ty).then(self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = self.leading;
        self.move_line(0.0, -leading);
    }

    fn show(&mut self, text: String) {
        let glyphs = text.chars().count() as f64;
        if !text.trim().is_empty() {
            let (x, y) = self.text_matrix.then(self.ctm).origin();
            self.runs.push(TextRun::new(text, x, y));
        }
        let advance = glyphs * self.font_size * APPROX_GLYPH_ADVANCE;
        self.text_matrix = Matrix::translation(advance, 0.0).then(self.text_matrix);
    }

    fn decode(&mut self, bytes: &[u8]) -> String {
        match self.font {
            Some(FontDecoding::Simple(encoding)) => Document::decode_text(Some(encoding), bytes),
            Some(FontDecoding::Composite) => {
                self.undecodable = true;
                String::new()
            }
            None => Document::decode_text(None, bytes),
        }
    }
}

fn read_page_runs(doc: &Document, page_id: ObjectId) -> lopdf::Result<(Vec<TextRun>, bool)> {
    let fonts = page_font_decodings(doc, page_id);
    let content = Content::decode(&doc.get_page_content(page_id)?)?;

    let mut state = TextState::new();
    for operation in &content.operations {
        apply_operation(&mut state, &fonts, operation);
    }
    Ok((state.runs, state.undecodable))
}

fn page_font_decodings<'a>(
    doc: &'a Document,
    page_id: ObjectId,
) -> BTreeMap<Vec<u8>, FontDecoding<'a>> {
    doc.get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| (name, font_decoding(doc, font)))
        .collect()
}

fn font_decoding<'a>(doc: &'a Document, font: &'a Dictionary) -> FontDecoding<'a> {
    if matches!(font.get(b"Subtype"), Ok(Object::Name(subtype)) if subtype == b"Type0") {
        return FontDecoding::Composite;
    }
    let encoding = match font.get(b"Encoding") {
        Ok(Object::Name(name)) => std::str::from_utf8(name).ok(),
        Ok(Object::Reference(id)) => doc
            .get_object(*id)
            .and_then(Object::as_dict)
            .ok()
            .and_then(base_encoding),
        Ok(Object::Dictionary(dict)) => base_encoding(dict),
        _ => None,
    };
    FontDecoding::Simple(encoding.unwrap_or("StandardEncoding"))
}

fn base_encoding(dict: &Dictionary) -> Option<&str> {
    match dict.get(b"BaseEncoding") {
        Ok(Object::Name(name)) => std::str::from_utf8(name).ok(),
        _ => None,
    }
}

fn apply_operation<'a>(
    state: &mut TextState<'a>,
    fonts: &BTreeMap<Vec<u8>, FontDecoding<'a>>,
    operation: &Operation,
) {
    let operands = &operation.operands;
    match operation.operator.as_str() {
        "q" => state.ctm_stack.push(state.ctm),
        "Q" => {
            if let Some(ctm) = state.ctm_stack.pop() {
                state.ctm = ctm;
            }
        }
        "cm" => {
            if let Some(m) = matrix_operand(operands) {
                state.ctm = m.then(state.ctm);
            }
        }
        "BT" => {
            state.text_matrix = Matrix::IDENTITY;
            state.line_matrix = Matrix::IDENTITY;
        }
        "Tf" => {
            state.font = operands
                .first()
                .and_then(|o| match o {
                    Object::Name(name) => fonts.get(name).copied(),
                    _ => None,
                })
                .or(Some(FontDecoding::Simple("StandardEncoding")));
            if let Some(size) = operands.get(1).and_then(number) {
                state.font_size = size;
            }
        }
        "TL" => {
            if let Some(leading) = operands.first().and_then(number) {
                state.leading = leading;
            }
        }
        "Td" => {
            if let (Some(tx), Some(ty)) = (operands.first().and_then(number), operands.get(1).and_then(number)) {
                state.move_line(tx, ty);
            }
        }
        "TD" => {
            if let (Some(tx), Some(ty)) = (operands.first().and_then(number), operands.get(1).and_then(number)) {
                state.leading = -ty;
                state.move_line(tx, ty);
            }
        }
        "Tm" => {
            if let Some(m) = matrix_operand(operands) {
                state.text_matrix = m;
                state.line_matrix = m;
            }
        }
        "T*" => state.next_line(),
        "Tj" => {
            if let Some(Object::String(bytes, _)) = operands.first() {
                let text = state.decode(bytes);
                state.show(text);
            }
        }
        "'" => {
            state.next_line();
            if let Some(Object::String(bytes, _)) = operands.first() {
                let text = state.decode(bytes);
                state.show(text);
            }
        }
        "\"" => {
            state.next_line();
            if let Some(Object::String(bytes, _)) = operands.get(2) {
                let text = state.decode(bytes);
                state.show(text);
            }
        }
        "TJ" => {
            if let Some(Object::Array(items)) = operands.first() {
                let mut text = String::new();
                for item in items {
                    match item {
                        Object::String(bytes, _) => text.push_str(&state.decode(bytes)),
                        other => {
                            if number(other).is_some_and(|adjust| adjust <= TJ_WORD_GAP)
                                && !text.ends_with(' ')
                            {
                                text.push(' ');
                            }
                        }
                    }
                }
                state.show(text);
            }
        }
        _ => {}
    }
}

fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

fn matrix_operand(operands: &[Object]) -> Option<Matrix> {
    if operands.len() < 6 {
        return None;
    }
    let mut values = [0.0; 6];
    for (slot, operand) in values.iter_mut().zip(operands) {
        *slot = number(operand)?;
    }
    Some(Matrix(values))
}
