//! PDFium-backed [`PdfBackend`].
//!
//! Binding the PDFium shared library is expensive, so it happens once per
//! process on first use and the handle is shared by every upload afterwards.

use std::io::Cursor;

use anyhow::Context;
use once_cell::sync::OnceCell;
use pdfium_render::prelude::*;
use tracing::{info, warn};

use crate::ingestion::error::ExtractionError;
use crate::ingestion::pdf::{PdfBackend, PdfPages};

static PDFIUM: OnceCell<Pdfium> = OnceCell::new();

/// Returns the process-wide PDFium handle, binding the library on first call.
/// A failed bind is not cached, so a later call may succeed once the library
/// is installed.
fn pdfium(library_path: Option<&str>) -> Result<&'static Pdfium, PdfiumError> {
    PDFIUM.get_or_try_init(|| {
        let bindings = match library_path {
            Some(path) => {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(path))
                    .or_else(|e| {
                        warn!("PDFium not found under {path} ({e}), trying system library");
                        Pdfium::bind_to_system_library()
                    })?
            }
            None => Pdfium::bind_to_system_library()?,
        };
        info!("PDFium library bound");
        Ok(Pdfium::new(bindings))
    })
}

pub struct PdfiumBackend {
    library_path: Option<String>,
}

impl PdfiumBackend {
    pub fn new(library_path: Option<String>) -> Self {
        Self { library_path }
    }
}

impl PdfBackend for PdfiumBackend {
    fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<Box<dyn PdfPages + 'a>, ExtractionError> {
        let pdfium = pdfium(self.library_path.as_deref())
            .map_err(|e| ExtractionError::Unknown(format!("PDF engine unavailable: {e}")))?;

        let document = pdfium.load_pdf_from_byte_slice(bytes, None).map_err(|e| {
            warn!("Failed to open PDF: {e}");
            ExtractionError::PdfOpen
        })?;

        Ok(Box::new(PdfiumPages { document }))
    }
}

struct PdfiumPages<'a> {
    document: PdfDocument<'a>,
}

impl PdfiumPages<'_> {
    fn page(&self, index: usize) -> anyhow::Result<PdfPage<'_>> {
        let index = PdfPageIndex::try_from(index).context("page index out of range")?;
        Ok(self.document.pages().get(index)?)
    }
}

impl PdfPages for PdfiumPages<'_> {
    fn page_count(&self) -> usize {
        usize::from(self.document.pages().len())
    }

    fn page_text(&self, index: usize) -> anyhow::Result<String> {
        Ok(self.page(index)?.text()?.all())
    }

    fn render_page_png(&self, index: usize, scale: f32) -> anyhow::Result<Vec<u8>> {
        let page = self.page(index)?;
        let config = PdfRenderConfig::new().scale_page_by_factor(scale);
        let image = page.render_with_config(&config)?.as_image();

        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .context("PNG encoding failed")?;
        Ok(png)
    }
}
