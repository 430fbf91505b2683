use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::ingestion::types::ExtractionResult;
use crate::models::resume::{ResumeAnalysisRow, ResumeRow};
use crate::resumes::ai::{ResumeAnalysis, StructuredResume};

/// Parameters for inserting a freshly ingested résumé.
pub struct NewResume<'a> {
    pub user_id: Uuid,
    pub file_name: &'a str,
    pub storage_key: &'a str,
    pub extraction: &'a ExtractionResult,
    pub structured: Option<&'a StructuredResume>,
}

pub async fn insert_resume(pool: &PgPool, params: NewResume<'_>) -> Result<ResumeRow, sqlx::Error> {
    let NewResume {
        user_id,
        file_name,
        storage_key,
        extraction,
        structured,
    } = params;

    let row = sqlx::query_as::<_, ResumeRow>(
        r#"
        INSERT INTO resumes
            (id, user_id, file_name, file_type, storage_key, raw_text,
             structured, is_scanned, page_count, ocr_confidence)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(file_name)
    .bind(extraction.file_type.as_str())
    .bind(storage_key)
    .bind(&extraction.text)
    .bind(structured.map(Json))
    .bind(extraction.is_scanned)
    .bind(i32::try_from(extraction.page_count).unwrap_or(i32::MAX))
    .bind(extraction.ocr_confidence)
    .fetch_one(pool)
    .await?;

    info!("Inserted résumé {} for user {user_id}", row.id);
    Ok(row)
}

pub async fn get_resume(pool: &PgPool, resume_id: Uuid) -> Result<Option<ResumeRow>, sqlx::Error> {
    sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1")
        .bind(resume_id)
        .fetch_optional(pool)
        .await
}

pub async fn insert_analysis(
    pool: &PgPool,
    resume_id: Uuid,
    job_description: Option<&str>,
    analysis: &ResumeAnalysis,
) -> Result<ResumeAnalysisRow, sqlx::Error> {
    let row = sqlx::query_as::<_, ResumeAnalysisRow>(
        r#"
        INSERT INTO resume_analyses
            (id, resume_id, job_description, compatibility_score,
             optimized_resume, market_summary, action_plan)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(resume_id)
    .bind(job_description)
    .bind(analysis.compatibility_score)
    .bind(&analysis.optimized_resume)
    .bind(&analysis.market_summary)
    .bind(Json(&analysis.action_plan))
    .fetch_one(pool)
    .await?;

    info!(
        "Stored analysis {} for résumé {resume_id} (score {:.0})",
        row.id, row.compatibility_score
    );
    Ok(row)
}

/// Newest first.
pub async fn list_analyses(
    pool: &PgPool,
    resume_id: Uuid,
) -> Result<Vec<ResumeAnalysisRow>, sqlx::Error> {
    sqlx::query_as::<_, ResumeAnalysisRow>(
        "SELECT * FROM resume_analyses WHERE resume_id = $1 ORDER BY created_at DESC",
    )
    .bind(resume_id)
    .fetch_all(pool)
    .await
}
