//! One stateless pass per document:
//! detect format → extract text → recognise (fan-out) → reconcile → validate.
//!
//! Only an unsupported media type or a fully failed extraction cascade stop
//! the pass. Everything after extraction degrades instead of failing.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::document::{
    detect_format, DocumentFormat, ExtractionError, RawDocument, TextExtractor,
    UnsupportedFormatError,
};
use crate::entities::{reconcile, EntityRecognizer, EntityRecord};
use crate::quality::{validate, ValidationReport};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    UnsupportedFormat(#[from] UnsupportedFormatError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("extraction task aborted: {0}")]
    Aborted(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Serialize)]
pub struct ParsedResume {
    pub format: DocumentFormat,
    pub text: String,
    pub record: EntityRecord,
    pub report: ValidationReport,
}

pub struct ResumePipeline {
    extractor: Arc<TextExtractor>,
    recognizer: EntityRecognizer,
}

impl ResumePipeline {
    pub fn new(extractor: TextExtractor, recognizer: EntityRecognizer) -> Self {
        Self {
            extractor: Arc::new(extractor),
            recognizer,
        }
    }

    pub fn recognizer(&self) -> &EntityRecognizer {
        &self.recognizer
    }

    #[instrument(skip_all, fields(document_id = %document_id, filename = %document.filename))]
    pub async fn process(
        &self,
        document_id: Uuid,
        document: &RawDocument,
    ) -> Result<ParsedResume, PipelineError> {
        let format = detect_format(&document.media_type)?;
        info!(format = %format, bytes = document.size(), "Processing document");

        // Parsers are CPU-bound; keep them off the async workers.
        let extractor = Arc::clone(&self.extractor);
        let owned = document.clone();
        let extracted =
            tokio::task::spawn_blocking(move || extractor.extract(&owned, format)).await??;

        let fragments = self.recognizer.recognize(&extracted.text).await;
        let record = reconcile(&fragments);
        let report = validate(&extracted.text, &record);

        info!(
            strategy = extracted.strategy,
            skipped_strategies = extracted.failures.len(),
            sources = fragments.len(),
            score = report.score,
            "Document processed"
        );

        Ok(ParsedResume {
            format,
            text: extracted.text,
            record,
            report,
        })
    }
}
