pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::intake::handlers;
use crate::state::AppState;

/// Room for multipart framing on top of the file itself, so an oversized
/// file still reaches the handler and gets a typed 413.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/resumes/parse", post(handlers::handle_parse))
        .route("/api/v1/resumes/report", post(handlers::handle_report))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::document::TextExtractor;
    use crate::entities::{EntityRecognizer, RecognizerTimeouts};
    use crate::intake::ResumePipeline;

    const BOUNDARY: &str = "resume-intake-test-boundary";

    fn test_app(max_upload_bytes: usize) -> Router {
        let pipeline = ResumePipeline::new(
            TextExtractor::default(),
            EntityRecognizer::new(None, None, RecognizerTimeouts::default()),
        );
        build_router(AppState {
            pipeline: Arc::new(pipeline),
            config: Config {
                max_upload_bytes,
                ..Config::default()
            },
        })
    }

    fn upload_request(filename: &str, media_type: &str, content: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: {media_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/v1/resumes/parse")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_enabled_recognizers() {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = test_app(1024).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["recognizers"]["statistical_ner"], false);
        assert_eq!(body["recognizers"]["pattern_matcher"], true);
    }

    #[tokio::test]
    async fn test_parse_plain_text_upload() {
        let content = b"Jane Doe\njane@example.com\nSoftware Engineer at Acme Corp\n";
        let response = test_app(1024)
            .oneshot(upload_request("cv.txt", "text/plain", content))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["filename"], "cv.txt");
        assert_eq!(body["format"], "plain_text");
        assert_eq!(body["record"]["email"], "jane@example.com");
        assert_eq!(body["record"]["experience"][0]["company"], "Acme Corp");
        assert!(body["report"]["score"].is_u64());
    }

    #[tokio::test]
    async fn test_parse_rejects_unsupported_type() {
        let response = test_app(1024)
            .oneshot(upload_request("cv.png", "image/png", b"\x89PNG"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "UNSUPPORTED_MEDIA_TYPE");
        assert_eq!(body["error"]["message"], "Unsupported file type: image/png");
    }

    #[tokio::test]
    async fn test_parse_rejects_empty_upload() {
        let response = test_app(1024)
            .oneshot(upload_request("cv.txt", "text/plain", b""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_parse_rejects_oversized_upload() {
        let response = test_app(16)
            .oneshot(upload_request("cv.txt", "text/plain", &[b'a'; 64]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_parse_reports_unreadable_pdf_as_unprocessable() {
        let response = test_app(1024)
            .oneshot(upload_request("cv.pdf", "application/pdf", b"not a pdf"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_report_endpoint_recomputes_from_json() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/resumes/report")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"text": "Just a short note about nothing at all.."}"#))
            .unwrap();
        let response = test_app(1024).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["score"], 0);
        assert_eq!(body["warnings"][0]["kind"], "missing_email");
    }
}
