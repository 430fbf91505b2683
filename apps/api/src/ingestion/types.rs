use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A file as received from the client. Lives for a single ingestion call.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub bytes: Bytes,
    pub mime_type: String,
    pub file_name: String,
}

impl UploadedDocument {
    pub fn new(bytes: impl Into<Bytes>, mime_type: &str, file_name: &str) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.to_string(),
            file_name: file_name.to_string(),
        }
    }
}

/// Format of a successfully extracted document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Docx,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Pdf => "pdf",
            FileType::Docx => "docx",
        }
    }
}

/// Plain text pulled out of an upload, plus how it was obtained.
///
/// `page_count >= 1` and `text` is non-empty for every value the pipeline
/// returns; `ocr_confidence` is present exactly when `is_scanned` is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub text: String,
    pub is_scanned: bool,
    pub page_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_confidence: Option<f32>,
    pub file_type: FileType,
}
