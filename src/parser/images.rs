//! Image region extraction, with optional OCR.
//!
//! OCR is best effort: an image that cannot be loaded or recognized still
//! yields its region, just without text.

use crate::error::Result;
use crate::model::RawImageRegion;

use super::interpreter::{ImagePlacement, PageFrame};
use super::ocr::{ImageData, OcrEngine};

/// Turns image placements into page-coordinate regions.
pub struct ImageRegionBuilder<'a> {
    ocr: Option<&'a dyn OcrEngine>,
}

impl<'a> ImageRegionBuilder<'a> {
    /// Create a builder, optionally running OCR on every placed image.
    pub fn new(ocr: Option<&'a dyn OcrEngine>) -> Self {
        Self { ocr }
    }

    /// Build regions for a page's placements.
    ///
    /// Placements that cover no area (masks, hairlines) are skipped. `load`
    /// fetches an image's data by XObject name and is only called when an
    /// OCR engine is configured.
    pub fn build<L>(
        &self,
        placements: &[ImagePlacement],
        frame: &PageFrame,
        page_number: u32,
        load: L,
    ) -> Vec<RawImageRegion>
    where
        L: Fn(&[u8]) -> Result<ImageData>,
    {
        let mut regions = Vec::with_capacity(placements.len());

        for placement in placements {
            if placement.bbox.area() <= 0.0 {
                continue;
            }

            let mut region = RawImageRegion::new(page_number, frame.to_page(&placement.bbox));
            if let Some(engine) = self.ocr {
                let name = String::from_utf8_lossy(&placement.name);
                match load(&placement.name).and_then(|image| engine.recognize(&image)) {
                    Ok(Some(text)) => {
                        log::debug!(
                            "Page {}: OCR recovered {} chars from {}",
                            page_number,
                            text.len(),
                            name
                        );
                        region = region.with_ocr_text(text);
                    }
                    Ok(None) => {}
                    Err(e) => log::warn!("Page {}: OCR skipped for {}: {}", page_number, name, e),
                }
            }
            regions.push(region);
        }

        regions
    }
}
