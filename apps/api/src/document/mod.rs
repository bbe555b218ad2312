// Document ingestion: media-type detection and the per-format text extraction cascade.
// Extraction is synchronous and CPU-bound; nothing in here awaits.

pub mod docx;
pub mod extract;
pub mod format;
pub mod pdf;
pub mod plain_text;

use bytes::Bytes;

pub use extract::{ExtractionError, TextExtractor};
pub use format::{detect_format, DocumentFormat, UnsupportedFormatError};

/// An uploaded résumé exactly as the caller received it.
///
/// Size limits are the caller's responsibility; the pipeline only borrows it.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub content: Bytes,
    pub media_type: String,
    pub filename: String,
}

impl RawDocument {
    pub fn new(
        content: impl Into<Bytes>,
        media_type: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            media_type: media_type.into(),
            filename: filename.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }
}
