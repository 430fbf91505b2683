//! Axum route handlers for the Résumé API.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::ingestion::handlers::read_multipart;
use crate::ingestion::progress::NoProgress;
use crate::models::resume::{ResumeAnalysisRow, ResumeRow};
use crate::resumes::repository::{self, NewResume};
use crate::resumes::storage::{delete_original, discard_on_error, storage_key, upload_original};
use crate::state::AppState;

/// Multipart text field naming the owner of the upload.
pub const USER_ID_FIELD: &str = "user_id";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    pub job_description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResumeDetailResponse {
    pub resume: ResumeRow,
    pub analyses: Vec<ResumeAnalysisRow>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes
///
/// Ingestion pipeline → AI structuring → S3 copy of the original → DB row.
/// The S3 copy is removed again if the row cannot be written.
/// A failed structuring call is logged and stored as null; the upload still succeeds.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ResumeRow>), AppError> {
    let (document, fields) = read_multipart(multipart).await?;
    let user_id = parse_user_id(fields.get(USER_ID_FIELD).map(String::as_str))?;

    let bytes = document.bytes.clone();
    let file_name = document.file_name.clone();
    let mime_type = document.mime_type.clone();

    let extraction = state.extractor.extract_blocking(document, NoProgress).await?;

    let structured = match state.resume_ai.structure(&extraction.text).await {
        Ok(structured) => Some(structured),
        Err(e) => {
            warn!("Keeping résumé '{file_name}' unstructured: {e}");
            None
        }
    };

    let key = storage_key(user_id, &file_name, Utc::now());
    let content_type = if mime_type.is_empty() {
        "application/octet-stream"
    } else {
        mime_type.as_str()
    };
    upload_original(&state.s3, &state.config.s3_bucket, &key, bytes, content_type)
        .await
        .map_err(|e| AppError::S3(format!("{e:#}")))?;

    let inserted = repository::insert_resume(
        &state.db,
        NewResume {
            user_id,
            file_name: &file_name,
            storage_key: &key,
            extraction: &extraction,
            structured: structured.as_ref(),
        },
    )
    .await;
    let row = discard_on_error(
        inserted,
        delete_original(&state.s3, &state.config.s3_bucket, &key),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<ResumeDetailResponse>, AppError> {
    let resume = repository::get_resume(&state.db, resume_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))?;
    let analyses = repository::list_analyses(&state.db, resume_id).await?;

    Ok(Json(ResumeDetailResponse { resume, analyses }))
}

/// POST /api/v1/resumes/:id/analyze
///
/// Scores the résumé against an optional job description and stores the
/// analysis. Without one, the résumé is assessed against the general market.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    request: Option<Json<AnalyzeRequest>>,
) -> Result<(StatusCode, Json<ResumeAnalysisRow>), AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let job_description = request
        .job_description
        .as_deref()
        .map(str::trim)
        .filter(|jd| !jd.is_empty());

    let resume = repository::get_resume(&state.db, resume_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))?;

    let analysis = state
        .resume_ai
        .analyze(&resume.raw_text, job_description)
        .await?;

    let row =
        repository::insert_analysis(&state.db, resume_id, job_description, &analysis).await?;
    info!("Analyzed résumé {resume_id}");

    Ok((StatusCode::CREATED, Json(row)))
}

fn parse_user_id(raw: Option<&str>) -> Result<Uuid, AppError> {
    let raw = raw
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{USER_ID_FIELD} is required")))?;
    Uuid::parse_str(raw)
        .map_err(|_| AppError::Validation(format!("{USER_ID_FIELD} must be a UUID")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_id_accepts_uuid() {
        let id = parse_user_id(Some(" 6f1c2b1e-9d4b-4c55-9a39-0d5f5b8f2a10 ")).unwrap();
        assert_eq!(id.to_string(), "6f1c2b1e-9d4b-4c55-9a39-0d5f5b8f2a10");
    }

    #[test]
    fn test_parse_user_id_rejects_missing_or_malformed() {
        assert!(matches!(parse_user_id(None), Err(AppError::Validation(_))));
        assert!(matches!(parse_user_id(Some("  ")), Err(AppError::Validation(_))));
        assert!(matches!(parse_user_id(Some("42")), Err(AppError::Validation(_))));
    }
}
