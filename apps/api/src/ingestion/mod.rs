// Document ingestion: turns an uploaded résumé (PDF or DOCX) into plain text.
// PDFs with a thin text layer fall back to OCR. Each upload is processed
// sequentially and in isolation; results are all-or-nothing.

pub mod docx;
pub mod error;
pub mod file_type;
pub mod handlers;
pub mod normalize;
pub mod ocr;
pub mod pdf;
pub mod pdfium;
pub mod progress;
pub mod types;

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::IngestionConfig;
use crate::ingestion::error::ExtractionError;
use crate::ingestion::file_type::{detect_file_kind, FileKind};
use crate::ingestion::ocr::{run_ocr, OcrProvider, TesseractProvider};
use crate::ingestion::pdf::{read_text_layer, PdfBackend, EXTRACTING_START};
use crate::ingestion::pdfium::PdfiumBackend;
use crate::ingestion::progress::{ProgressSink, ProgressTracker, Stage};
use crate::ingestion::types::{ExtractionResult, FileType, UploadedDocument};

/// Entry point of the ingestion pipeline. Cheap to clone; engines are shared.
#[derive(Clone)]
pub struct DocumentExtractor {
    pdf: Arc<dyn PdfBackend>,
    ocr: Arc<dyn OcrProvider>,
    config: IngestionConfig,
}

impl DocumentExtractor {
    pub fn new(
        pdf: Arc<dyn PdfBackend>,
        ocr: Arc<dyn OcrProvider>,
        config: IngestionConfig,
    ) -> Self {
        Self { pdf, ocr, config }
    }

    /// PDFium for PDFs, Tesseract for OCR.
    pub fn from_config(config: IngestionConfig) -> Self {
        Self::new(
            Arc::new(PdfiumBackend::new(config.pdfium_library_path.clone())),
            Arc::new(TesseractProvider::new(config.ocr_languages.clone())),
            config,
        )
    }

    /// Extracts text from `document`, reporting progress to `sink`.
    ///
    /// Unsupported and legacy `.doc` uploads are rejected before any parsing
    /// and before the first progress event. On failure no `complete` event is
    /// emitted.
    pub fn extract(
        &self,
        document: &UploadedDocument,
        sink: &mut dyn ProgressSink,
    ) -> Result<ExtractionResult, ExtractionError> {
        let kind = detect_file_kind(&document.mime_type, &document.file_name);
        debug!(
            "Ingesting '{}' ({}, {} bytes) as {kind:?}",
            document.file_name,
            document.mime_type,
            document.bytes.len()
        );

        let tracker = ProgressTracker::new(sink);
        match kind {
            FileKind::Unsupported => Err(ExtractionError::UnsupportedFormat),
            FileKind::LegacyDoc => Err(ExtractionError::LegacyDoc),
            FileKind::Pdf => self.extract_pdf(&document.bytes, tracker),
            FileKind::Docx => self.extract_docx(&document.bytes, tracker),
        }
    }

    /// Runs [`extract`](Self::extract) on the blocking pool. A panic inside a
    /// native engine is reported as an unknown error.
    pub async fn extract_blocking<S>(
        &self,
        document: UploadedDocument,
        mut sink: S,
    ) -> Result<ExtractionResult, ExtractionError>
    where
        S: ProgressSink + Send + 'static,
    {
        let extractor = self.clone();
        tokio::task::spawn_blocking(move || extractor.extract(&document, &mut sink))
            .await
            .map_err(|e| ExtractionError::Unknown(format!("extraction task failed: {e}")))?
    }

    fn extract_pdf(
        &self,
        bytes: &[u8],
        mut tracker: ProgressTracker<'_>,
    ) -> Result<ExtractionResult, ExtractionError> {
        tracker.report(Stage::Loading, 0, "Carregando PDF...");

        let pages = self.pdf.open(bytes)?;
        let page_count = pages.page_count();
        if page_count == 0 {
            return Err(ExtractionError::EmptyPdf);
        }
        tracker.report(
            Stage::Loading,
            EXTRACTING_START,
            format!("PDF carregado: {page_count} página(s)"),
        );

        let layer = read_text_layer(pages.as_ref(), &mut tracker);
        let threshold = self.config.scanned_min_chars_per_page;

        if !layer.is_scanned(threshold) {
            info!(
                "PDF text layer: {page_count} pages, {:.1} chars/page, {} skipped",
                layer.avg_chars_per_page(),
                layer.skipped_pages.len()
            );
            tracker.complete("Texto extraído com sucesso!");
            return Ok(ExtractionResult {
                text: layer.text,
                is_scanned: false,
                page_count,
                ocr_confidence: None,
                file_type: FileType::Pdf,
            });
        }

        info!(
            "PDF looks scanned ({:.1} chars/page < {threshold}), running OCR on {page_count} pages",
            layer.avg_chars_per_page()
        );
        let ocr = run_ocr(
            pages.as_ref(),
            self.ocr.as_ref(),
            self.config.ocr_render_scale,
            &mut tracker,
        )?;

        tracker.complete(format!(
            "Texto reconhecido com {:.0}% de confiança",
            ocr.confidence
        ));
        Ok(ExtractionResult {
            text: ocr.text,
            is_scanned: true,
            page_count,
            ocr_confidence: Some(ocr.confidence),
            file_type: FileType::Pdf,
        })
    }

    fn extract_docx(
        &self,
        bytes: &[u8],
        mut tracker: ProgressTracker<'_>,
    ) -> Result<ExtractionResult, ExtractionError> {
        tracker.report(Stage::Loading, 0, "Carregando documento Word...");
        tracker.report(Stage::Extracting, 30, "Extraindo texto do DOCX...");

        let docx = docx::extract_docx(bytes, self.config.docx_min_chars)?;
        info!(
            "DOCX text: {} chars, ~{} pages",
            docx.text.chars().count(),
            docx.estimated_pages
        );

        tracker.complete("Texto extraído com sucesso!");
        Ok(ExtractionResult {
            text: docx.text,
            is_scanned: false,
            page_count: docx.estimated_pages,
            ocr_confidence: None,
            file_type: FileType::Docx,
        })
    }
}
