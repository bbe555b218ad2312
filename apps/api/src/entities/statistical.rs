//! Statistical NER backed by a remote token-classification model.
//!
//! The model is served behind an HTTP inference endpoint that accepts
//! `{"inputs": "...", "parameters": {"aggregation_strategy": "simple"}}` and
//! returns grouped spans. Only person, organisation and location spans
//! scoring at least [`MIN_SPAN_SCORE`] are used; everything else the model
//! emits is ignored.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::entities::models::{EntityFragment, SourceKind};
use crate::entities::recognizer::{EntitySource, RecognizerError};

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    aggregation_strategy: &'static str,
}

/// Spans the model is less sure of than this are dropped.
pub const MIN_SPAN_SCORE: f32 = 0.5;

/// One aggregated span as returned by the inference endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct NerSpan {
    #[serde(alias = "entity")]
    pub entity_group: String,
    pub word: String,
    /// Absent in some backends' output; treated as fully confident.
    #[serde(default = "full_confidence")]
    pub score: f32,
}

fn full_confidence() -> f32 {
    1.0
}

#[derive(Clone)]
pub struct StatisticalNerModel {
    client: Client,
    endpoint: String,
    api_token: Option<String>,
}

impl StatisticalNerModel {
    /// `request_timeout` bounds the HTTP exchange only; the recognizer applies
    /// its own deadline on top.
    pub fn new(
        endpoint: String,
        api_token: Option<String>,
        request_timeout: Duration,
    ) -> Result<Self, RecognizerError> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_token,
        })
    }

    pub async fn predict(&self, text: &str) -> Result<Vec<NerSpan>, RecognizerError> {
        let body = InferenceRequest {
            inputs: text,
            parameters: InferenceParameters {
                aggregation_strategy: "simple",
            },
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("NER model returned {}: {}", status, message);
            return Err(RecognizerError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        let spans: Vec<NerSpan> = response.json().await?;
        debug!(spans = spans.len(), "NER model call succeeded");
        Ok(spans)
    }
}

#[async_trait]
impl EntitySource for StatisticalNerModel {
    fn kind(&self) -> SourceKind {
        SourceKind::StatisticalNer
    }

    async fn recognize(&self, text: Arc<str>) -> Result<EntityFragment, RecognizerError> {
        let spans = self.predict(&text).await?;
        Ok(fragment_from_spans(&spans))
    }
}

/// Folds model spans into a fragment: the first person span becomes the name,
/// organisation and location spans are collected in order, exact repeats dropped.
pub fn fragment_from_spans(spans: &[NerSpan]) -> EntityFragment {
    let mut fragment = EntityFragment::empty(SourceKind::StatisticalNer);

    for span in spans.iter().filter(|s| s.score >= MIN_SPAN_SCORE) {
        let word = clean_word(&span.word);
        if word.is_empty() {
            continue;
        }

        let target = match bare_label(&span.entity_group) {
            "PER" | "PERSON" => {
                if fragment.name.is_none() {
                    fragment.name = Some(word);
                }
                continue;
            }
            "ORG" => &mut fragment.organizations,
            "LOC" | "GPE" => &mut fragment.locations,
            _ => continue,
        };

        if !target.contains(&word) {
            target.push(word);
        }
    }

    fragment
}

/// Strips BIO prefixes: "B-ORG" -> "ORG".
fn bare_label(label: &str) -> &str {
    label
        .strip_prefix("B-")
        .or_else(|| label.strip_prefix("I-"))
        .unwrap_or(label)
}

/// Removes word-piece markers left by the tokenizer.
fn clean_word(word: &str) -> String {
    word.replace("##", "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(label: &str, word: &str) -> NerSpan {
        NerSpan {
            entity_group: label.to_string(),
            word: word.to_string(),
            score: 0.99,
        }
    }

    #[test]
    fn test_first_person_becomes_name() {
        let fragment = fragment_from_spans(&[
            span("PER", "Jane Doe"),
            span("PER", "John Smith"),
        ]);
        assert_eq!(fragment.name.as_deref(), Some("Jane Doe"));
        assert_eq!(fragment.source, SourceKind::StatisticalNer);
    }

    #[test]
    fn test_bio_prefixes_and_word_pieces() {
        let fragment = fragment_from_spans(&[
            span("B-ORG", "Init##ech"),
            span("I-LOC", " Austin "),
            span("MISC", "Rust"),
        ]);
        assert_eq!(fragment.organizations, vec!["Initech"]);
        assert_eq!(fragment.locations, vec!["Austin"]);
        assert_eq!(fragment.name, None);
    }

    #[test]
    fn test_repeated_spans_are_collapsed() {
        let fragment = fragment_from_spans(&[
            span("ORG", "Globex"),
            span("ORG", "Globex"),
            span("GPE", "Seattle"),
            span("LOC", "Seattle"),
        ]);
        assert_eq!(fragment.organizations, vec!["Globex"]);
        assert_eq!(fragment.locations, vec!["Seattle"]);
    }

    #[test]
    fn test_blank_words_are_ignored() {
        let fragment = fragment_from_spans(&[span("PER", "##"), span("PER", "Jane")]);
        assert_eq!(fragment.name.as_deref(), Some("Jane"));
    }

    #[test]
    fn test_low_confidence_spans_are_dropped() {
        let mut unsure = span("PER", "Acme Corp");
        unsure.score = 0.31;
        let mut unsure_org = span("ORG", "Python");
        unsure_org.score = 0.2;

        let fragment = fragment_from_spans(&[unsure, unsure_org, span("PER", "Jane Doe")]);
        assert_eq!(fragment.name.as_deref(), Some("Jane Doe"));
        assert!(fragment.organizations.is_empty());
    }

    #[test]
    fn test_missing_score_counts_as_confident() {
        let spans: Vec<NerSpan> =
            serde_json::from_str(r#"[{"entity_group": "ORG", "word": "Globex"}]"#).unwrap();
        assert_eq!(spans[0].score, 1.0);
        assert_eq!(fragment_from_spans(&spans).organizations, vec!["Globex"]);
    }

    #[test]
    fn test_span_deserializes_from_ungrouped_output() {
        let spans: Vec<NerSpan> =
            serde_json::from_str(r#"[{"entity": "B-PER", "word": "Jane", "score": 0.98}]"#)
                .unwrap();
        assert_eq!(bare_label(&spans[0].entity_group), "PER");
    }

    /// Serves `router` on an ephemeral local port and returns its base URL.
    async fn serve_stub(router: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn stub_model(base: &str, path: &str, token: Option<&str>) -> StatisticalNerModel {
        StatisticalNerModel::new(
            format!("{base}{path}"),
            token.map(str::to_string),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn stub_backend() -> axum::Router {
        use axum::http::{header, HeaderMap, StatusCode};
        use axum::routing::post;
        use axum::Json;
        use serde_json::{json, Value};

        axum::Router::new()
            .route(
                "/ner",
                post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                    assert_eq!(body["parameters"]["aggregation_strategy"], "simple");
                    assert!(body["inputs"].as_str().unwrap().contains("Jane Doe"));
                    assert_eq!(
                        headers.get(header::AUTHORIZATION).unwrap(),
                        "Bearer secret-token"
                    );
                    Json(json!([
                        {"entity_group": "PER", "word": "Jane Doe", "score": 0.99},
                        {"entity_group": "ORG", "word": "Acme Corp", "score": 0.97},
                        {"entity_group": "LOC", "word": "Berlin", "score": 0.12}
                    ]))
                }),
            )
            .route(
                "/down",
                post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "model is loading") }),
            )
    }

    #[tokio::test]
    async fn test_predict_parses_backend_spans() {
        let base = serve_stub(stub_backend()).await;
        let model = stub_model(&base, "/ner", Some("secret-token"));

        let spans = model
            .predict("Jane Doe, Software Engineer at Acme Corp")
            .await
            .unwrap();
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[1].word, "Acme Corp");

        let fragment = model
            .recognize(Arc::from("Jane Doe, Software Engineer at Acme Corp"))
            .await
            .unwrap();
        assert_eq!(fragment.name.as_deref(), Some("Jane Doe"));
        assert_eq!(fragment.organizations, vec!["Acme Corp"]);
        assert!(fragment.locations.is_empty());
    }

    #[tokio::test]
    async fn test_predict_maps_non_success_status_to_backend_error() {
        let base = serve_stub(stub_backend()).await;
        let model = stub_model(&base, "/down", None);

        let err = model.predict("Jane Doe").await.unwrap_err();
        match err {
            RecognizerError::Backend { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "model is loading");
            }
            other => panic!("expected backend error, got {other:?}"),
        }
    }
}
