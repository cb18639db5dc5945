//! Leading-text extraction: the first page of a PDF, or the first
//! characters of a Markdown file.
//!
//! Extraction never fails outright. Any read error is logged and reported
//! as an empty string; the driver treats empty or whitespace-only text as
//! "nothing to infer from" and skips the document.
//!
//! ## Why spawn_blocking?
//!
//! pdfium is a C++ library with thread-local state and is not safe to call
//! from async contexts, so PDF text extraction runs on the blocking pool.

use crate::config::DocumentKind;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, warn};

/// Environment variable naming an explicit pdfium shared library.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Return at most `max_chars` characters from the start of the document.
pub async fn extract_leading_text(path: &Path, kind: DocumentKind, max_chars: usize) -> String {
    let result = match kind {
        DocumentKind::Pdf => {
            let owned = path.to_path_buf();
            tokio::task::spawn_blocking(move || first_page_text(&owned))
                .await
                .unwrap_or_else(|e| Err(format!("extraction task panicked: {e}")))
        }
        DocumentKind::Markdown => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| e.to_string()),
    };

    match result {
        Ok(text) => {
            let snippet = truncate_chars(&text, max_chars);
            debug!(
                "Extracted {} chars from '{}'",
                snippet.chars().count(),
                path.display()
            );
            snippet
        }
        Err(e) => {
            warn!("Error extracting text from '{}': {}", path.display(), e);
            String::new()
        }
    }
}

/// The first `max_chars` characters of `text` (not bytes).
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Bind to pdfium: `PDFIUM_LIB_PATH`, then the working directory, then the system.
fn bind_pdfium() -> Result<Pdfium, String> {
    let bindings = match std::env::var(PDFIUM_LIB_PATH_ENV) {
        Ok(path) if !path.is_empty() => Pdfium::bind_to_library(&path),
        _ => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| format!("failed to bind to pdfium library: {e:?}"))?;

    Ok(Pdfium::new(bindings))
}

/// Blocking: text of the first page of a PDF.
fn first_page_text(path: &Path) -> Result<String, String> {
    let pdfium = bind_pdfium()?;
    let document = pdfium
        .load_pdf_from_file(path, None)
        .map_err(|e| format!("cannot open PDF: {e:?}"))?;
    let page = document
        .pages()
        .first()
        .map_err(|e| format!("PDF has no first page: {e:?}"))?;
    let text = page
        .text()
        .map_err(|e| format!("cannot read page text: {e:?}"))?;
    Ok(text.all())
}
