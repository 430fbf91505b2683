use std::str::FromStr;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Upper bound for multipart request bodies, in bytes.
    pub max_upload_bytes: usize,
    pub ingestion: IngestionConfig,
}

/// Tunables of the document-ingestion pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestionConfig {
    /// Directory holding the PDFium shared library. `None` binds the system library.
    pub pdfium_library_path: Option<String>,
    /// A PDF averaging fewer extracted characters per page than this is treated as scanned.
    pub scanned_min_chars_per_page: f64,
    /// Tesseract language set, `+`-separated.
    pub ocr_languages: String,
    /// Page rasterization factor for OCR.
    pub ocr_render_scale: f32,
    /// DOCX text shorter than this (after trimming) is rejected as empty.
    pub docx_min_chars: usize,
}

/// Divisor used to estimate DOCX page counts for the progress UI.
pub const DOCX_CHARS_PER_PAGE: usize = 2500;

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            pdfium_library_path: None,
            scanned_min_chars_per_page: 100.0,
            ocr_languages: "por+eng".to_string(),
            ocr_render_scale: 2.0,
            docx_min_chars: 20,
        }
    }
}

impl IngestionConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            pdfium_library_path: std::env::var("PDFIUM_LIBRARY_PATH").ok(),
            scanned_min_chars_per_page: optional_env(
                "SCANNED_PDF_MIN_CHARS_PER_PAGE",
                defaults.scanned_min_chars_per_page,
            )?,
            ocr_languages: std::env::var("OCR_LANGUAGES").unwrap_or(defaults.ocr_languages),
            ocr_render_scale: optional_env("OCR_RENDER_SCALE", defaults.ocr_render_scale)?,
            docx_min_chars: optional_env("DOCX_MIN_CHARS", defaults.docx_min_chars)?,
        })
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let max_upload_mb: usize = optional_env("MAX_UPLOAD_MB", 20)?;
        let max_upload_bytes = upload_limit_bytes(max_upload_mb)?;

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: optional_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_upload_bytes,
            ingestion: IngestionConfig::from_env()?,
        })
    }
}

fn upload_limit_bytes(megabytes: usize) -> Result<usize> {
    megabytes
        .checked_mul(1024 * 1024)
        .with_context(|| format!("MAX_UPLOAD_MB={megabytes} is too large"))
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
