//! PDF loading and per-page text extraction.

use crate::types::PageText;
use guide_core::{AppError, AppResult};
use std::path::Path;

/// Text extracted from a PDF.
#[derive(Debug, Clone)]
pub struct LoadedPdf {
    /// Pages in the document, blank ones included
    pub page_count: usize,

    /// Pages with extractable text, in document order
    pub pages: Vec<PageText>,
}

/// Load a PDF and extract the text of each page.
///
/// Pages whose text is empty or whitespace-only are left out of `pages`
/// but still counted in `page_count`. No pages means the document has no
/// extractable text.
pub fn load_pdf(path: &Path) -> AppResult<LoadedPdf> {
    let document = lopdf::Document::load(path)
        .map_err(|e| AppError::Document(format!("Failed to open PDF {:?}: {}", path, e)))?;

    let page_ids = document.get_pages();
    tracing::debug!("PDF {:?} has {} pages", path, page_ids.len());

    let mut loaded = Vec::with_capacity(page_ids.len());

    for (index, page_number) in page_ids.keys().enumerate() {
        let text = match document.extract_text(&[*page_number]) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Skipping page {} of {:?}: {}", page_number, path, e);
                continue;
            }
        };

        let text = normalize_text(&text);
        if text.trim().is_empty() {
            tracing::debug!("Page {} of {:?} has no text", page_number, path);
            continue;
        }

        loaded.push(PageText {
            source: path.to_path_buf(),
            page: index as u32,
            text,
        });
    }

    tracing::info!(
        "Loaded {} of {} pages with text from {:?}",
        loaded.len(),
        page_ids.len(),
        path
    );

    Ok(LoadedPdf {
        page_count: page_ids.len(),
        pages: loaded,
    })
}

/// Normalize line endings and drop NUL bytes left by some PDF encoders.
fn normalize_text(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\0', "")
}
