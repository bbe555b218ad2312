//! Extraction cascade: ordered, named strategies per document format.
//!
//! Every strategy obeys the same contract: attempt, and on error or
//! whitespace-only output record a reason and hand over to the next one.
//! The first non-blank output wins.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::document::docx::DocxParagraphTableStrategy;
use crate::document::format::DocumentFormat;
use crate::document::pdf::{PdfLayoutStrategy, PdfSequentialStrategy};
use crate::document::plain_text::EncodingCascadeStrategy;
use crate::document::RawDocument;

/// Failure of a single strategy. Never fatal on its own.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("document is malformed: {0}")]
    Malformed(String),

    #[error("document is password-protected")]
    Encrypted,

    #[error("parser panicked: {0}")]
    Panicked(String),
}

/// A single way of turning document bytes into text.
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract(&self, bytes: &[u8]) -> Result<String, StrategyError>;
}

/// Why one strategy in the cascade did not produce text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyFailure {
    pub strategy: &'static str,
    pub reason: String,
}

impl std::fmt::Display for StrategyFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.strategy, self.reason)
    }
}

/// Output of a successful cascade. `text` is never blank.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    pub text: String,
    pub strategy: &'static str,
    /// Failures of the strategies tried before `strategy`, in attempt order.
    pub failures: Vec<StrategyFailure>,
}

/// Every strategy for the format failed or returned blank text.
#[derive(Debug, Clone, Error)]
#[error("Could not extract text from {format} document: {}", join_reasons(.failures))]
pub struct ExtractionError {
    pub format: DocumentFormat,
    pub failures: Vec<StrategyFailure>,
}

fn join_reasons(failures: &[StrategyFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

const BLANK_OUTPUT: &str = "returned only whitespace";

/// Holds the per-format strategy lists. Built once and shared read-only.
pub struct TextExtractor {
    pdf: Vec<Box<dyn ExtractionStrategy>>,
    docx: Vec<Box<dyn ExtractionStrategy>>,
    plain_text: Vec<Box<dyn ExtractionStrategy>>,
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self {
            pdf: vec![
                Box::new(PdfLayoutStrategy),
                Box::new(PdfSequentialStrategy),
            ],
            docx: vec![Box::new(DocxParagraphTableStrategy)],
            plain_text: vec![Box::new(EncodingCascadeStrategy::default())],
        }
    }
}

impl TextExtractor {
    /// Replaces the cascade for one format.
    #[cfg(test)]
    pub fn with_strategies(
        mut self,
        format: DocumentFormat,
        strategies: Vec<Box<dyn ExtractionStrategy>>,
    ) -> Self {
        *self.strategies_mut(format) = strategies;
        self
    }

    #[cfg(test)]
    pub fn strategy_names(&self, format: DocumentFormat) -> Vec<&'static str> {
        self.strategies(format).iter().map(|s| s.name()).collect()
    }

    pub fn extract(
        &self,
        document: &RawDocument,
        format: DocumentFormat,
    ) -> Result<ExtractionResult, ExtractionError> {
        let mut failures = Vec::new();

        for strategy in self.strategies(format) {
            let reason = match strategy.extract(&document.content) {
                Ok(text) if !text.trim().is_empty() => {
                    debug!(
                        strategy = strategy.name(),
                        chars = text.chars().count(),
                        "Extraction strategy succeeded"
                    );
                    return Ok(ExtractionResult {
                        text,
                        strategy: strategy.name(),
                        failures,
                    });
                }
                Ok(_) => BLANK_OUTPUT.to_string(),
                Err(e) => e.to_string(),
            };

            warn!(
                filename = %document.filename,
                strategy = strategy.name(),
                reason = %reason,
                "Extraction strategy failed, trying next"
            );
            failures.push(StrategyFailure {
                strategy: strategy.name(),
                reason,
            });
        }

        Err(ExtractionError { format, failures })
    }

    fn strategies(&self, format: DocumentFormat) -> &[Box<dyn ExtractionStrategy>] {
        match format {
            DocumentFormat::Pdf => &self.pdf,
            DocumentFormat::Docx => &self.docx,
            DocumentFormat::PlainText => &self.plain_text,
        }
    }

    #[cfg(test)]
    fn strategies_mut(&mut self, format: DocumentFormat) -> &mut Vec<Box<dyn ExtractionStrategy>> {
        match format {
            DocumentFormat::Pdf => &mut self.pdf,
            DocumentFormat::Docx => &mut self.docx,
            DocumentFormat::PlainText => &mut self.plain_text,
        }
    }
}
