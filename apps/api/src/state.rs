use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::config::Config;
use crate::ingestion::DocumentExtractor;
use crate::resumes::ai::ResumeAi;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    pub config: Config,
    /// Ingestion pipeline; PDF engine and OCR provider are shared across requests.
    pub extractor: DocumentExtractor,
    /// Pluggable résumé AI. Default: LlmResumeAi.
    pub resume_ai: Arc<dyn ResumeAi>,
}
