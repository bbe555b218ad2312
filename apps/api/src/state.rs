use std::sync::Arc;

use crate::config::Config;
use crate::intake::ResumePipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Extractor strategies and recognizer handles are built once at startup
    /// and only read afterwards.
    pub pipeline: Arc<ResumePipeline>,
    pub config: Config,
}
