use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version and which learned recognizers are enabled.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let recognizer = state.pipeline.recognizer();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": env!("CARGO_PKG_NAME"),
        "recognizers": {
            "statistical_ner": recognizer.has_statistical(),
            "linguistic_pipeline": recognizer.has_linguistic(),
            "pattern_matcher": true
        }
    }))
}
