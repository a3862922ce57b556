//! PDF text extraction.
//!
//! Wraps the `pdf-extract` crate to turn a PDF file into one [`Page`] per
//! physical page. Extraction failures (unreadable or corrupt files) are
//! fatal to the ingestion run and propagate to the operator.

use std::path::Path;

use anyhow::{Context, Result};

use crate::models::Page;

/// Extract the text of every page of a PDF, numbered from 0.
///
/// The returned pages carry the path string as their `source` so that
/// chunk identifiers remain stable across runs invoked with the same path.
/// Pages with no text at all are kept (they simply produce zero chunks
/// downstream).
pub fn extract_pages(path: &Path) -> Result<Vec<Page>> {
    let source = path.display().to_string();

    let page_texts = pdf_extract::extract_text_by_pages(path)
        .with_context(|| format!("failed to extract text from {}", source))?;

    let pages = page_texts
        .into_iter()
        .enumerate()
        .map(|(i, text)| Page {
            source: source.clone(),
            page: i as i64,
            text,
        })
        .collect();

    Ok(pages)
}
