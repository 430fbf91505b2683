use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub file_type: String,
    pub storage_key: String,
    pub raw_text: String,
    /// `StructuredResume` as returned by the AI; null when structuring failed.
    pub structured: Option<Value>,
    pub is_scanned: bool,
    pub page_count: i32,
    pub ocr_confidence: Option<f32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeAnalysisRow {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub job_description: Option<String>,
    pub compatibility_score: f64, // 0 – 100
    pub optimized_resume: String,
    pub market_summary: String,
    /// JSON array of `{ day, title, tasks }`.
    pub action_plan: Value,
    pub created_at: DateTime<Utc>,
}
