//! PDF text strategies.
//!
//! `pdf-layout` goes through `pdf-extract`, which positions glyphs and
//! rebuilds spacing and line breaks page by page. `pdf-sequential` walks the
//! page tree with `lopdf` and concatenates each page's text operators; it is
//! cruder but survives several font/encoding problems that trip the first.

use std::panic::{self, AssertUnwindSafe};

use lopdf::Document;
use tracing::debug;

use crate::document::extract::{ExtractionStrategy, StrategyError};

pub struct PdfLayoutStrategy;

impl ExtractionStrategy for PdfLayoutStrategy {
    fn name(&self) -> &'static str {
        "pdf-layout"
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, StrategyError> {
        let pages = catch_parser_panic(|| pdf_extract::extract_text_from_mem_by_pages(bytes))?
            .map_err(|e| StrategyError::Malformed(e.to_string()))?;

        Ok(join_pages(pages))
    }
}

pub struct PdfSequentialStrategy;

impl ExtractionStrategy for PdfSequentialStrategy {
    fn name(&self) -> &'static str {
        "pdf-sequential"
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, StrategyError> {
        catch_parser_panic(|| extract_sequential(bytes))?
    }
}

fn extract_sequential(bytes: &[u8]) -> Result<String, StrategyError> {
    let document =
        Document::load_mem(bytes).map_err(|e| StrategyError::Malformed(e.to_string()))?;
    if document.is_encrypted() {
        return Err(StrategyError::Encrypted);
    }

    let mut pages = Vec::new();
    let mut first_error = None;
    for page_number in document.get_pages().into_keys() {
        match document.extract_text(&[page_number]) {
            Ok(text) => pages.push(text),
            Err(e) => {
                debug!(page = page_number, error = %e, "Skipping unreadable PDF page");
                first_error.get_or_insert_with(|| e.to_string());
            }
        }
    }

    match (pages.is_empty(), first_error) {
        (true, Some(e)) => Err(StrategyError::Malformed(e)),
        _ => Ok(join_pages(pages)),
    }
}

/// Joins non-empty pages, one trailing newline per page.
fn join_pages(pages: Vec<String>) -> String {
    pages
        .into_iter()
        .filter(|p| !p.trim().is_empty())
        .fold(String::new(), |mut acc, page| {
            acc.push_str(page.trim_end());
            acc.push('\n');
            acc
        })
}

/// Both PDF crates can panic on hostile input; treat that as a strategy failure.
fn catch_parser_panic<T>(f: impl FnOnce() -> T) -> Result<T, StrategyError> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        StrategyError::Panicked(message)
    })
}
