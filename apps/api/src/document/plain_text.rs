use encoding_rs::{Encoding, ISO_8859_15, UTF_8, WINDOWS_1252};
use tracing::debug;

use crate::document::extract::{ExtractionStrategy, StrategyError};

/// Decodes plain-text uploads by trying encodings in priority order.
///
/// A byte-order mark short-circuits the list. When nothing decodes cleanly
/// the bytes are read as UTF-8 with undecodable sequences dropped, so this
/// strategy never fails.
pub struct EncodingCascadeStrategy {
    encodings: Vec<&'static Encoding>,
}

impl Default for EncodingCascadeStrategy {
    fn default() -> Self {
        Self::new(vec![UTF_8, WINDOWS_1252, ISO_8859_15])
    }
}

impl EncodingCascadeStrategy {
    pub fn new(encodings: Vec<&'static Encoding>) -> Self {
        Self { encodings }
    }

    /// Returns the decoded text and the name of the encoding that produced it.
    pub fn decode(&self, bytes: &[u8]) -> (String, &'static str) {
        if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
            if let Some(text) =
                encoding.decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
            {
                return (text.into_owned(), encoding.name());
            }
        }

        for encoding in &self.encodings {
            if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes)
            {
                return (text.into_owned(), encoding.name());
            }
        }

        let text = String::from_utf8_lossy(bytes)
            .chars()
            .filter(|c| *c != char::REPLACEMENT_CHARACTER)
            .collect();
        (text, "utf-8-lossy")
    }
}

impl ExtractionStrategy for EncodingCascadeStrategy {
    fn name(&self) -> &'static str {
        "text-encoding-cascade"
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, StrategyError> {
        let (text, encoding) = self.decode(bytes);
        debug!(encoding, "Decoded plain-text upload");
        Ok(text)
    }
}
