use std::path::Path;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const DOC_MIME: &str = "application/msword";

/// What an upload claims to be, judged from its MIME type and file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Docx,
    /// Word 97-2003 binary format. Recognized only to reject it with guidance.
    LegacyDoc,
    Unsupported,
}

/// Classifies an upload. MIME type and extension are OR'd: browsers and
/// operating systems disagree on what to report, so either one matching wins.
pub fn detect_file_kind(mime_type: &str, file_name: &str) -> FileKind {
    let mime = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    if mime == PDF_MIME || extension == "pdf" {
        FileKind::Pdf
    } else if mime == DOCX_MIME || extension == "docx" {
        FileKind::Docx
    } else if mime == DOC_MIME || extension == "doc" {
        FileKind::LegacyDoc
    } else {
        FileKind::Unsupported
    }
}
