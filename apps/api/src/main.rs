mod config;
mod document;
mod entities;
mod errors;
mod intake;
mod quality;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::document::TextExtractor;
use crate::entities::{
    EntityRecognizer, EntitySource, LinguisticPipeline, LinguisticSource, RecognizerTimeouts,
    StatisticalNerModel,
};
use crate::intake::ResumePipeline;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume intake v{}", env!("CARGO_PKG_VERSION"));

    let recognizer = build_recognizer(&config)?;
    let pipeline = ResumePipeline::new(TextExtractor::default(), recognizer);

    let state = AppState {
        pipeline: Arc::new(pipeline),
        config: config.clone(),
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Learned sources are built once here and shared read-only by every request.
fn build_recognizer(config: &Config) -> Result<EntityRecognizer> {
    let statistical: Option<Arc<dyn EntitySource>> = match &config.ner_model_url {
        Some(url) => {
            let model = StatisticalNerModel::new(
                url.clone(),
                config.ner_api_token.clone(),
                config.ner_timeout,
            )
            .context("Failed to build NER model client")?;
            info!("Statistical NER enabled (endpoint: {url})");
            Some(Arc::new(model))
        }
        None => {
            info!("NER_MODEL_URL not set, statistical NER disabled");
            None
        }
    };

    let linguistic: Option<Arc<dyn EntitySource>> = if config.enable_linguistic_pipeline {
        info!("Linguistic pipeline enabled");
        Some(Arc::new(LinguisticSource::new(LinguisticPipeline::shared())))
    } else {
        info!("Linguistic pipeline disabled");
        None
    };

    Ok(EntityRecognizer::new(
        statistical,
        linguistic,
        RecognizerTimeouts {
            statistical: config.ner_timeout,
            linguistic: config.linguistic_timeout,
        },
    ))
}
