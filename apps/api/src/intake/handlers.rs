//! Axum route handlers for the résumé intake API.
//!
//! The upload handler is the pipeline's caller: it owns size, filename and
//! emptiness checks, while the media type is judged by format detection.

use axum::{
    extract::{multipart::Field, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::document::{DocumentFormat, RawDocument};
use crate::entities::EntityRecord;
use crate::errors::AppError;
use crate::quality::{validate, ValidationReport};
use crate::state::AppState;

const FILE_FIELD: &str = "file";
const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ParseResponse {
    pub document_id: Uuid,
    pub filename: String,
    pub format: DocumentFormat,
    pub text: String,
    pub record: EntityRecord,
    pub report: ValidationReport,
    pub parsed_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub text: String,
    #[serde(default)]
    pub record: EntityRecord,
}

struct Upload {
    filename: String,
    media_type: String,
    content: Bytes,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/parse
///
/// Multipart upload with a single `file` field.
pub async fn handle_parse(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ParseResponse>, AppError> {
    let limit = state.config.max_upload_bytes;
    let mut upload: Option<Upload> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!("Malformed multipart body: {e}");
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge { limit_bytes: limit }
        } else {
            AppError::Validation(format!("Malformed multipart body: {}", e.body_text()))
        }
    })? {
        if field.name() == Some(FILE_FIELD) {
            upload = Some(read_upload(field, limit).await?);
        }
    }

    let upload = upload.ok_or_else(|| {
        AppError::Validation(format!("Missing multipart field '{FILE_FIELD}'"))
    })?;
    check_upload(&upload, limit)?;

    let document = RawDocument::new(upload.content, upload.media_type, upload.filename);
    let document_id = Uuid::new_v4();
    let parsed = state.pipeline.process(document_id, &document).await?;

    Ok(Json(ParseResponse {
        document_id,
        filename: document.filename,
        format: parsed.format,
        text: parsed.text,
        record: parsed.record,
        report: parsed.report,
        parsed_at: Utc::now(),
    }))
}

/// POST /api/v1/resumes/report
///
/// Recomputes the validation report for an already-extracted text and record.
pub async fn handle_report(Json(request): Json<ReportRequest>) -> Json<ValidationReport> {
    Json(validate(&request.text, &request.record))
}

async fn read_upload(field: Field<'_>, limit: usize) -> Result<Upload, AppError> {
    let filename = field.file_name().unwrap_or_default().to_string();
    let media_type = field
        .content_type()
        .unwrap_or(FALLBACK_MEDIA_TYPE)
        .to_string();

    let content = field.bytes().await.map_err(|e| {
        warn!("Failed to read upload bytes: {e}");
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge { limit_bytes: limit }
        } else {
            AppError::Validation("Failed to read file data".to_string())
        }
    })?;

    Ok(Upload {
        filename,
        media_type,
        content,
    })
}

fn check_upload(upload: &Upload, limit: usize) -> Result<(), AppError> {
    if upload.content.len() > limit {
        return Err(AppError::PayloadTooLarge { limit_bytes: limit });
    }
    if upload.filename.trim().is_empty() {
        return Err(AppError::Validation("Invalid file name".to_string()));
    }
    if upload.content.is_empty() {
        return Err(AppError::Validation("File appears to be empty".to_string()));
    }
    Ok(())
}
