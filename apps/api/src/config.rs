use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Every value has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub max_upload_bytes: usize,
    /// Inference endpoint of the statistical NER model. Unset disables it.
    pub ner_model_url: Option<String>,
    pub ner_api_token: Option<String>,
    pub ner_timeout: Duration,
    pub linguistic_timeout: Duration,
    pub enable_linguistic_pipeline: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            ner_model_url: None,
            ner_api_token: None,
            ner_timeout: Duration::from_millis(5000),
            linguistic_timeout: Duration::from_millis(2000),
            enable_linguistic_pipeline: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        Ok(Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            ner_model_url: optional_env("NER_MODEL_URL"),
            ner_api_token: optional_env("NER_API_TOKEN"),
            ner_timeout: Duration::from_millis(parse_env(
                "NER_TIMEOUT_MS",
                defaults.ner_timeout.as_millis() as u64,
            )?),
            linguistic_timeout: Duration::from_millis(parse_env(
                "LINGUISTIC_TIMEOUT_MS",
                defaults.linguistic_timeout.as_millis() as u64,
            )?),
            enable_linguistic_pipeline: parse_env(
                "ENABLE_LINGUISTIC_PIPELINE",
                defaults.enable_linguistic_pipeline,
            )?,
        })
    }
}

/// Unset or blank counts as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}
