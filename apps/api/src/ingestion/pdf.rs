//! PDF text-layer extraction and the scanned-document heuristic.
//!
//! The PDF engine is reached through [`PdfBackend`] so the pipeline can be
//! exercised without a native library; see `pdfium.rs` for the real one.

use tracing::{debug, warn};

use crate::ingestion::error::ExtractionError;
use crate::ingestion::progress::{band, ProgressTracker, Stage};

/// Separator placed between the text of consecutive pages.
pub const PAGE_SEPARATOR: &str = "\n\n";

pub const EXTRACTING_START: u8 = 10;
pub const EXTRACTING_END: u8 = 50;

/// Opens PDF documents from memory.
pub trait PdfBackend: Send + Sync {
    /// Fails with [`ExtractionError::PdfOpen`] for corrupt or encrypted input.
    fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<Box<dyn PdfPages + 'a>, ExtractionError>;
}

/// An opened document. Page indices are zero-based.
pub trait PdfPages {
    fn page_count(&self) -> usize;
    fn page_text(&self, index: usize) -> anyhow::Result<String>;
    /// Rasterizes a page at `scale` times its native size, encoded as PNG.
    fn render_page_png(&self, index: usize, scale: f32) -> anyhow::Result<Vec<u8>>;
}

/// Result of reading one page's text layer.
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    Extracted { text: String },
    Skipped { index: usize, reason: String },
}

/// Aggregate of every page's text layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayer {
    pub text: String,
    /// Non-whitespace characters across all pages.
    pub total_chars: usize,
    pub page_count: usize,
    /// Zero-based indices of pages whose text layer could not be read.
    pub skipped_pages: Vec<usize>,
}

impl TextLayer {
    pub fn avg_chars_per_page(&self) -> f64 {
        if self.page_count == 0 {
            return 0.0;
        }
        self.total_chars as f64 / self.page_count as f64
    }

    /// True when the text layer is too thin to trust and OCR should run.
    pub fn is_scanned(&self, min_chars_per_page: f64) -> bool {
        self.total_chars == 0 || self.avg_chars_per_page() < min_chars_per_page
    }

    fn fold(outcomes: Vec<PageOutcome>, page_count: usize) -> Self {
        let mut texts = Vec::with_capacity(outcomes.len());
        let mut skipped_pages = Vec::new();
        for outcome in outcomes {
            match outcome {
                PageOutcome::Extracted { text } => texts.push(text),
                PageOutcome::Skipped { index, reason } => {
                    debug!("page {} left out of text layer: {reason}", index + 1);
                    skipped_pages.push(index);
                }
            }
        }
        let total_chars = texts
            .iter()
            .map(|t| t.chars().filter(|c| !c.is_whitespace()).count())
            .sum();
        Self {
            text: texts.join(PAGE_SEPARATOR),
            total_chars,
            page_count,
            skipped_pages,
        }
    }
}

/// Reads every page's text layer in order. A page whose text cannot be read
/// is logged and left out; it still counts towards the page total.
pub fn read_text_layer(pages: &dyn PdfPages, tracker: &mut ProgressTracker<'_>) -> TextLayer {
    let page_count = pages.page_count();
    let mut outcomes = Vec::with_capacity(page_count);

    for index in 0..page_count {
        let outcome = match pages.page_text(index) {
            Ok(text) => {
                debug!("page {}: {} chars in text layer", index + 1, text.chars().count());
                PageOutcome::Extracted { text }
            }
            Err(e) => {
                warn!("Skipping page {} text layer: {e:#}", index + 1);
                PageOutcome::Skipped {
                    index,
                    reason: e.to_string(),
                }
            }
        };
        outcomes.push(outcome);

        tracker.report(
            Stage::Extracting,
            band(EXTRACTING_START, EXTRACTING_END, index + 1, page_count),
            format!("Extraindo texto: página {} de {page_count}", index + 1),
        );
    }

    TextLayer::fold(outcomes, page_count)
}
