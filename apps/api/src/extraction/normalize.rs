use crate::extraction::errors::ExtractError;

/// Final content gate: shorter results are reported as empty or corrupt.
pub const MIN_CONTENT_CHARS: usize = 50;

/// Whitespace cleanup applied to every result, cleaned or not.
///
/// Every run of whitespace, line breaks included, becomes a single space and
/// the ends are trimmed, so no blank lines remain. Idempotent: `normalize(normalize(s)) == normalize(s)`.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalizes and enforces the minimum content length (in characters).
pub fn finalize_text(text: &str, min_chars: usize) -> Result<String, ExtractError> {
    let normalized = normalize_whitespace(text);
    let chars = normalized.chars().count();
    if chars < min_chars {
        return Err(ExtractError::EmptyOrCorruptContent { chars });
    }
    Ok(normalized)
}
