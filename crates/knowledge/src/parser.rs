//! Document parsing and text extraction.

use std::path::Path;
use switchboard_core::{AppError, AppResult};

/// Content type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Pdf,
    Markdown,
    PlainText,
    Unknown,
}

impl ContentType {
    /// Detect content type from file extension.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("pdf") => Self::Pdf,
            Some("md") | Some("markdown") => Self::Markdown,
            Some("txt") => Self::PlainText,
            _ => Self::Unknown,
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Markdown => "markdown",
            Self::PlainText => "text",
            Self::Unknown => "unknown",
        }
    }
}

/// Extract clean text from document bytes.
pub fn parse_bytes(bytes: &[u8], content_type: ContentType) -> AppResult<String> {
    match content_type {
        ContentType::Pdf => extract_pdf_text(bytes),
        ContentType::Markdown => Ok(clean_markdown(&decode_utf8(bytes)?)),
        ContentType::PlainText => decode_utf8(bytes),
        ContentType::Unknown => {
            let raw = decode_utf8(bytes)?;
            if raw.contains('\0') {
                return Err(AppError::Knowledge("Binary file not supported".to_string()));
            }
            Ok(raw)
        }
    }
}

fn decode_utf8(bytes: &[u8]) -> AppResult<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| AppError::Knowledge(format!("Document is not valid UTF-8: {}", e)))
}

/// Extract text from a PDF.
///
/// pdf-extract panics on some malformed inputs, so the call is isolated.
fn extract_pdf_text(bytes: &[u8]) -> AppResult<String> {
    let result = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
        .map_err(|_| AppError::Knowledge("PDF parser aborted on malformed input".to_string()))?;

    let text = result.map_err(|e| AppError::Knowledge(format!("Failed to extract PDF text: {}", e)))?;

    Ok(normalize_whitespace(&text))
}

/// Collapse runs of blank lines and trailing spaces left by PDF layout.
fn normalize_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut blank_run = 0;

    for line in text.lines() {
        let trimmed = line.trim_end();
        if trimmed.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        result.push_str(trimmed);
        result.push('\n');
    }

    result.trim().to_string()
}

/// Clean markdown by removing excess formatting.
fn clean_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for line in text.lines() {
        let trimmed = line.trim_start_matches('#').trim();

        if trimmed.starts_with("---") || trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            continue;
        }

        if !trimmed.is_empty() {
            result.push_str(trimmed);
            result.push('\n');
        }
    }

    result.trim().to_string()
}
