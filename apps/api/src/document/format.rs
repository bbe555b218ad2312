use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";
pub const DOCX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const PLAIN_TEXT_MEDIA_TYPE: &str = "text/plain";

/// The closed set of résumé formats the intake pipeline can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::PlainText => "plain_text",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported file type: {media_type}")]
pub struct UnsupportedFormatError {
    pub media_type: String,
}

/// Maps a declared media type onto a [`DocumentFormat`].
///
/// Parameters (`; charset=...`) and surrounding whitespace are ignored and the
/// comparison is ASCII case-insensitive. Anything else is rejected before any
/// extraction is attempted.
pub fn detect_format(media_type: &str) -> Result<DocumentFormat, UnsupportedFormatError> {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        PDF_MEDIA_TYPE => Ok(DocumentFormat::Pdf),
        DOCX_MEDIA_TYPE => Ok(DocumentFormat::Docx),
        PLAIN_TEXT_MEDIA_TYPE => Ok(DocumentFormat::PlainText),
        _ => Err(UnsupportedFormatError {
            media_type: media_type.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_the_three_supported_types() {
        assert_eq!(detect_format("application/pdf").unwrap(), DocumentFormat::Pdf);
        assert_eq!(detect_format(DOCX_MEDIA_TYPE).unwrap(), DocumentFormat::Docx);
        assert_eq!(
            detect_format("text/plain").unwrap(),
            DocumentFormat::PlainText
        );
    }

    #[test]
    fn test_ignores_parameters_and_case() {
        assert_eq!(
            detect_format("Text/Plain; charset=windows-1252").unwrap(),
            DocumentFormat::PlainText
        );
        assert_eq!(
            detect_format("  APPLICATION/PDF ").unwrap(),
            DocumentFormat::Pdf
        );
    }

    #[test]
    fn test_rejects_legacy_word_documents() {
        let err = detect_format("application/msword").unwrap_err();
        assert_eq!(err.media_type, "application/msword");
        assert_eq!(err.to_string(), "Unsupported file type: application/msword");
    }

    #[test]
    fn test_rejects_empty_media_type() {
        assert!(detect_format("").is_err());
    }
}
