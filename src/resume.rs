//! Resume PDF to plain text. Extraction failures are request-fatal; there
//! is no partial-text path.

use crate::error::AppError;

const MAX_CHARS: usize = 60_000;

/// Extract sanitized text from a resume PDF. Strips control characters
/// (keeping newlines and tabs) and bounds the output length. Errors when
/// the document is unreadable or carries no extractable text, e.g. a
/// scanned-image-only PDF.
pub fn extract_text(bytes: &[u8]) -> Result<String, AppError> {
    let raw = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| AppError::ResumeExtraction(format!("could not read PDF: {e}")))?;

    let text = sanitize(&raw, MAX_CHARS);
    if text.trim().is_empty() {
        return Err(AppError::ResumeExtraction(
            "no extractable text in PDF (scanned image?)".to_string(),
        ));
    }
    Ok(text)
}

fn sanitize(raw: &str, max_chars: usize) -> String {
    raw.chars()
        .filter(|&c| !c.is_control() || c == '\n' || c == '\r' || c == '\t')
        .take(max_chars)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_control_characters() {
        let dirty = "Backend\u{0}\u{7} Engineer\nRust\tTokio";
        assert_eq!(sanitize(dirty, 100), "Backend Engineer\nRust\tTokio");
    }

    #[test]
    fn sanitize_bounds_length() {
        let long = "a".repeat(50);
        assert_eq!(sanitize(&long, 10).len(), 10);
    }

    #[test]
    fn garbage_bytes_fail_extraction() {
        assert!(matches!(
            extract_text(b"not a pdf"),
            Err(AppError::ResumeExtraction(_))
        ));
    }
}
