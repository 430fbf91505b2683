//! OCR fallback for scanned PDFs.
//!
//! Pages are rendered and recognized one at a time. The OCR session is held
//! for the duration of [`run_ocr`] only and released when it returns,
//! whichever way it returns.

use tracing::{debug, info, warn};

use crate::ingestion::error::ExtractionError;
use crate::ingestion::normalize::clean_text;
use crate::ingestion::pdf::{PdfPages, PAGE_SEPARATOR};
use crate::ingestion::progress::{band, ProgressTracker, Stage};

pub const OCR_START: u8 = 50;
pub const OCR_END: u8 = 95;

/// Text recognized on one page image.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrPage {
    pub text: String,
    /// Engine-reported confidence, 0–100.
    pub confidence: f32,
}

/// Starts OCR sessions. Starting is where engine initialization failures surface.
pub trait OcrProvider: Send + Sync {
    fn start(&self) -> Result<Box<dyn OcrSession>, ExtractionError>;
}

/// A live OCR worker. Dropping it releases the engine.
pub trait OcrSession {
    fn recognize(&mut self, png: &[u8]) -> anyhow::Result<OcrPage>;
}

#[derive(Debug, Clone, PartialEq)]
enum OcrPageOutcome {
    Recognized(OcrPage),
    Skipped { index: usize, reason: String },
}

/// Aggregated OCR output for a document.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrOutcome {
    pub text: String,
    /// Unweighted mean of the recognized pages' confidences, 0–100.
    pub confidence: f32,
    pub recognized_pages: usize,
}

impl OcrOutcome {
    fn fold(outcomes: Vec<OcrPageOutcome>) -> Result<Self, ExtractionError> {
        let mut texts = Vec::new();
        let mut confidences = Vec::new();
        for outcome in outcomes {
            match outcome {
                OcrPageOutcome::Recognized(page) => {
                    // Every recognized page weighs the same, even a blank one.
                    confidences.push(page.confidence);
                    if !page.text.is_empty() {
                        texts.push(page.text);
                    }
                }
                OcrPageOutcome::Skipped { index, reason } => {
                    debug!("page {} left out of OCR result: {reason}", index + 1);
                }
            }
        }

        if texts.is_empty() {
            return Err(ExtractionError::UnreadableScan);
        }

        let confidence = confidences.iter().sum::<f32>() / confidences.len() as f32;
        Ok(Self {
            text: texts.join(PAGE_SEPARATOR),
            confidence: confidence.clamp(0.0, 100.0),
            recognized_pages: confidences.len(),
        })
    }
}

/// Renders every page at `scale`, runs OCR on it and aggregates the result.
/// Render or recognition failures on a page are logged and skipped.
pub fn run_ocr(
    pages: &dyn PdfPages,
    provider: &dyn OcrProvider,
    scale: f32,
    tracker: &mut ProgressTracker<'_>,
) -> Result<OcrOutcome, ExtractionError> {
    let page_count = pages.page_count();
    tracker.report(
        Stage::Ocr,
        OCR_START,
        "PDF digitalizado detectado. Iniciando reconhecimento de texto (OCR)...",
    );

    let mut session = provider.start()?;
    let mut outcomes = Vec::with_capacity(page_count);

    for index in 0..page_count {
        let recognized = pages
            .render_page_png(index, scale)
            .and_then(|png| session.recognize(&png));

        let outcome = match recognized {
            Ok(page) => {
                debug!(
                    "OCR page {}: {:.1}% confidence",
                    index + 1,
                    page.confidence
                );
                OcrPageOutcome::Recognized(OcrPage {
                    text: clean_text(&page.text),
                    confidence: page.confidence,
                })
            }
            Err(e) => {
                warn!("Skipping OCR for page {}: {e:#}", index + 1);
                OcrPageOutcome::Skipped {
                    index,
                    reason: e.to_string(),
                }
            }
        };
        outcomes.push(outcome);

        tracker.report(
            Stage::Ocr,
            band(OCR_START, OCR_END, index + 1, page_count),
            format!("Reconhecendo texto: página {} de {page_count}", index + 1),
        );
    }

    drop(session);

    let outcome = OcrOutcome::fold(outcomes)?;
    info!(
        "OCR finished: {}/{} pages recognized, {:.1}% mean confidence",
        outcome.recognized_pages, page_count, outcome.confidence
    );
    Ok(outcome)
}

/// Tesseract-backed provider. Without the `ocr` feature every start fails,
/// which surfaces to users as an OCR initialization error.
pub struct TesseractProvider {
    languages: String,
}

impl TesseractProvider {
    pub fn new(languages: impl Into<String>) -> Self {
        Self {
            languages: languages.into(),
        }
    }
}

#[cfg(feature = "ocr")]
impl OcrProvider for TesseractProvider {
    fn start(&self) -> Result<Box<dyn OcrSession>, ExtractionError> {
        let engine = tesseract::Tesseract::new(None, Some(self.languages.as_str())).map_err(|e| {
            warn!("Tesseract init failed for '{}': {e}", self.languages);
            ExtractionError::OcrInit(e.to_string())
        })?;
        info!("Tesseract worker started ({})", self.languages);
        Ok(Box::new(TesseractSession {
            engine: Some(engine),
            languages: self.languages.clone(),
        }))
    }
}

#[cfg(not(feature = "ocr"))]
impl OcrProvider for TesseractProvider {
    fn start(&self) -> Result<Box<dyn OcrSession>, ExtractionError> {
        warn!(
            "OCR requested ({}) but this build has no OCR engine",
            self.languages
        );
        Err(ExtractionError::OcrInit(
            "built without the `ocr` feature".to_string(),
        ))
    }
}

#[cfg(feature = "ocr")]
struct TesseractSession {
    /// Tesseract's builder API consumes the engine on every call; `None`
    /// means the last call failed midway and a fresh engine is needed.
    engine: Option<tesseract::Tesseract>,
    languages: String,
}

#[cfg(feature = "ocr")]
impl OcrSession for TesseractSession {
    fn recognize(&mut self, png: &[u8]) -> anyhow::Result<OcrPage> {
        use anyhow::anyhow;

        let engine = match self.engine.take() {
            Some(engine) => engine,
            None => tesseract::Tesseract::new(None, Some(self.languages.as_str()))
                .map_err(|e| anyhow!("Tesseract re-init: {e}"))?,
        };

        let mut engine = engine
            .set_image_from_mem(png)
            .map_err(|e| anyhow!("Tesseract image: {e}"))?
            .recognize()
            .map_err(|e| anyhow!("Tesseract recognize: {e}"))?;

        let text = engine
            .get_text()
            .map_err(|e| anyhow!("OCR text: {e}"))?;
        let confidence = engine.mean_text_conf() as f32;
        self.engine = Some(engine);

        Ok(OcrPage { text, confidence })
    }
}

#[cfg(feature = "ocr")]
impl Drop for TesseractSession {
    fn drop(&mut self) {
        debug!("Tesseract worker released");
    }
}
