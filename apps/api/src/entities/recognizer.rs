//! Recognition fan-out.
//!
//! The learned sources (statistical NER model, linguistic pipeline) are
//! optional, individually time-boxed and allowed to fail; the pattern matcher
//! always runs. All three run concurrently over the same shared text and the
//! caller only sees the joined result.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::entities::models::{EntityFragment, SourceKind};
use crate::entities::patterns::PatternMatcher;

#[derive(Debug, Error)]
pub enum RecognizerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model backend error (status {status}): {message}")]
    Backend { status: u16, message: String },

    #[error("recognizer crashed: {0}")]
    Crashed(String),
}

/// A fallible recognition source. Implementations normalise whatever their
/// backend returns into an [`EntityFragment`] before handing it back.
#[async_trait]
pub trait EntitySource: Send + Sync {
    fn kind(&self) -> SourceKind;

    async fn recognize(&self, text: Arc<str>) -> Result<EntityFragment, RecognizerError>;
}

#[derive(Debug, Clone, Copy)]
pub struct RecognizerTimeouts {
    pub statistical: Duration,
    pub linguistic: Duration,
}

impl Default for RecognizerTimeouts {
    fn default() -> Self {
        Self {
            statistical: Duration::from_millis(5000),
            linguistic: Duration::from_millis(2000),
        }
    }
}

pub struct EntityRecognizer {
    statistical: Option<Arc<dyn EntitySource>>,
    linguistic: Option<Arc<dyn EntitySource>>,
    patterns: PatternMatcher,
    timeouts: RecognizerTimeouts,
}

impl EntityRecognizer {
    pub fn new(
        statistical: Option<Arc<dyn EntitySource>>,
        linguistic: Option<Arc<dyn EntitySource>>,
        timeouts: RecognizerTimeouts,
    ) -> Self {
        Self {
            statistical,
            linguistic,
            patterns: PatternMatcher,
            timeouts,
        }
    }

    pub fn has_statistical(&self) -> bool {
        self.statistical.is_some()
    }

    pub fn has_linguistic(&self) -> bool {
        self.linguistic.is_some()
    }

    /// Returns one fragment per source that completed, in priority order.
    pub async fn recognize(&self, text: &str) -> Vec<EntityFragment> {
        let shared: Arc<str> = Arc::from(text);

        let (statistical, linguistic, patterns) = tokio::join!(
            run_learned(
                self.statistical.as_ref(),
                Arc::clone(&shared),
                self.timeouts.statistical
            ),
            run_learned(
                self.linguistic.as_ref(),
                Arc::clone(&shared),
                self.timeouts.linguistic
            ),
            async { self.patterns.recognize(&shared) },
        );

        [statistical, linguistic, Some(patterns)]
            .into_iter()
            .flatten()
            .collect()
    }
}

async fn run_learned(
    source: Option<&Arc<dyn EntitySource>>,
    text: Arc<str>,
    limit: Duration,
) -> Option<EntityFragment> {
    let source = source?;
    let kind = source.kind().as_str();

    match timeout(limit, source.recognize(text)).await {
        Ok(Ok(fragment)) => {
            debug!(
                source = kind,
                organizations = fragment.organizations.len(),
                locations = fragment.locations.len(),
                has_name = fragment.name.is_some(),
                "Recognition source completed"
            );
            Some(fragment)
        }
        Ok(Err(e)) => {
            warn!(source = kind, error = %e, "Recognition source failed, skipping");
            None
        }
        Err(_) => {
            warn!(
                source = kind,
                timeout_ms = limit.as_millis() as u64,
                "Recognition source timed out, skipping"
            );
            None
        }
    }
}
