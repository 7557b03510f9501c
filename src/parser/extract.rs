//! Extractor interfaces and per-page collection.

use crate::error::Result;
use crate::model::{
    DocumentPrimitives, PagePrimitives, RawImageRegion, RawTableRegion, RawTextBlock,
};

use super::options::ErrorMode;

/// Produces positioned text blocks with font metadata.
pub trait TextExtractor {
    /// Text blocks of one page (1-indexed).
    fn text_blocks(&self, page_number: u32) -> Result<Vec<RawTextBlock>>;
}

/// Produces table regions with their cell matrices.
pub trait TableExtractor {
    /// Tables of one page (1-indexed).
    fn tables(&self, page_number: u32) -> Result<Vec<RawTableRegion>>;
}

/// Produces image regions, optionally with OCR text.
pub trait ImageExtractor {
    /// Images of one page (1-indexed).
    fn images(&self, page_number: u32) -> Result<Vec<RawImageRegion>>;
}

/// Run the three extractors over pages `1..=page_count`.
///
/// In [`ErrorMode::Lenient`] a failing extractor costs only its own stream
/// on that page; the other streams and pages are kept.
pub fn collect_primitives(
    page_count: u32,
    text: &dyn TextExtractor,
    tables: &dyn TableExtractor,
    images: &dyn ImageExtractor,
    mode: ErrorMode,
) -> Result<DocumentPrimitives> {
    let mut document = DocumentPrimitives::new();

    for page_number in 1..=page_count {
        let mut page = PagePrimitives::new(page_number);
        page.text_blocks = isolate(text.text_blocks(page_number), mode, page_number, "text")?;
        page.tables = isolate(tables.tables(page_number), mode, page_number, "table")?;
        page.images = isolate(images.images(page_number), mode, page_number, "image")?;

        log::debug!(
            "Page {}: {} text blocks, {} tables, {} images",
            page_number,
            page.text_blocks.len(),
            page.tables.len(),
            page.images.len()
        );
        document.add_page(page);
    }

    Ok(document)
}

fn isolate<T>(result: Result<Vec<T>>, mode: ErrorMode, page: u32, stream: &str) -> Result<Vec<T>> {
    match (result, mode) {
        (Ok(items), _) => Ok(items),
        (Err(e), ErrorMode::Strict) => Err(e),
        (Err(e), ErrorMode::Lenient) => {
            log::warn!("Page {}: {} extraction failed, skipping: {}", page, stream, e);
            Ok(Vec::new())
        }
    }
}
