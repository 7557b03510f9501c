//! PDF extraction front-end using lopdf.

use std::cell::RefCell;
use std::io::Read;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use crate::detect::{detect_format_from_bytes, detect_format_from_path};
use crate::error::{Error, Result};
use crate::model::{DocumentPrimitives, RawImageRegion, RawTableRegion, RawTextBlock};

use super::backend::{LopdfBackend, PageId, PdfBackend};
use super::extract::{collect_primitives, ImageExtractor, TableExtractor, TextExtractor};
use super::images::ImageRegionBuilder;
use super::interpreter::{ContentInterpreter, PageContent, PageFrame};
use super::lattice::LatticeDetector;
use super::ocr::OcrEngine;
use super::options::ParseOptions;
use super::table_detector::TableDetector;
use super::text::build_text_blocks;

/// One page's content stream, interpreted.
struct InterpretedPage {
    number: u32,
    id: PageId,
    frame: PageFrame,
    content: PageContent,
}

/// PDF parser producing layout primitives.
///
/// Implements all three extractor traits. Each page's content stream is
/// interpreted once and shared by the extractors while they work on it.
pub struct PdfParser {
    backend: LopdfBackend,
    options: ParseOptions,
    tables: TableDetector,
    lattice: LatticeDetector,
    ocr: Option<Arc<dyn OcrEngine>>,
    last_page: RefCell<Option<Rc<InterpretedPage>>>,
}

impl PdfParser {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        detect_format_from_path(path)?;
        Ok(Self::with_backend(LopdfBackend::load_file(path)?, options))
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Parse a PDF from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        detect_format_from_bytes(data)?;
        Ok(Self::with_backend(LopdfBackend::load_bytes(data)?, options))
    }

    /// Parse a PDF from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ParseOptions::default())
    }

    /// Parse a PDF from a reader with custom options.
    pub fn from_reader_with_options<R: Read>(mut reader: R, options: ParseOptions) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes_with_options(&data, options)
    }

    fn with_backend(backend: LopdfBackend, options: ParseOptions) -> Self {
        Self {
            tables: TableDetector::with_config(options.table_detector.clone()),
            lattice: options.table_detector.lattice_detector(),
            backend,
            options,
            ocr: None,
            last_page: RefCell::new(None),
        }
    }

    /// Run OCR on image regions with the given engine.
    pub fn with_ocr(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.ocr = Some(engine);
        self
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> u32 {
        self.backend.pages().len() as u32
    }

    /// Get PDF version.
    pub fn version(&self) -> String {
        self.backend.version()
    }

    /// Check if the document is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.backend.is_encrypted()
    }

    /// Extract the primitives of every page.
    pub fn extract(&self) -> Result<DocumentPrimitives> {
        let result = collect_primitives(
            self.page_count(),
            self,
            self,
            self,
            self.options.error_mode,
        );
        self.last_page.borrow_mut().take();
        result
    }

    /// Interpreted content of a page, reusing the last one when it matches.
    fn page(&self, page_number: u32) -> Result<Rc<InterpretedPage>> {
        if let Some(page) = self.last_page.borrow().as_ref() {
            if page.number == page_number {
                return Ok(Rc::clone(page));
            }
        }

        let page = Rc::new(self.interpret(page_number)?);
        *self.last_page.borrow_mut() = Some(Rc::clone(&page));
        Ok(page)
    }

    fn interpret(&self, page_number: u32) -> Result<InterpretedPage> {
        let pages = self.backend.pages();
        let id = *pages
            .get(&page_number)
            .ok_or(Error::PageOutOfRange(page_number, pages.len() as u32))?;

        let frame = PageFrame::from_media_box(self.backend.media_box(id)?);
        let ops = self
            .backend
            .decode_content(&self.backend.page_content(id)?)?;

        let image_names = if self.options.extract_images {
            self.backend.image_names(id)?
        } else {
            Vec::new()
        };

        let interpreter = ContentInterpreter::new(|font: &[u8], bytes: &[u8]| {
            self.backend.decode_text(id, font, bytes)
        })
        .with_fonts(self.backend.page_fonts(id)?)
        .with_images(image_names);

        let content = interpreter.run(&ops);
        log::debug!(
            "Page {}: {} ops, {} spans, {} image placements, {} rulings",
            page_number,
            ops.len(),
            content.spans.len(),
            content.images.len(),
            content.rulings.len()
        );

        Ok(InterpretedPage {
            number: page_number,
            id,
            frame,
            content,
        })
    }

    /// Fetch a page for one extraction stream, tagging failures with it.
    fn page_for(&self, page_number: u32, tag: fn(String) -> Error) -> Result<Rc<InterpretedPage>> {
        self.page(page_number).map_err(|e| match e {
            Error::PageOutOfRange(..) => e,
            other => tag(format!("page {}: {}", page_number, other)),
        })
    }
}

impl TextExtractor for PdfParser {
    fn text_blocks(&self, page_number: u32) -> Result<Vec<RawTextBlock>> {
        let page = self.page_for(page_number, Error::TextExtract)?;
        Ok(build_text_blocks(&page.content.spans, &page.frame, page_number))
    }
}

impl TableExtractor for PdfParser {
    fn tables(&self, page_number: u32) -> Result<Vec<RawTableRegion>> {
        if !self.options.extract_tables {
            return Ok(Vec::new());
        }
        let page = self.page_for(page_number, Error::TableExtract)?;
        let mut regions: Vec<RawTableRegion> = self
            .tables
            .detect(&page.content.spans)
            .iter()
            .map(|t| self.tables.to_region(t, &page.frame, page_number))
            .collect();

        // Ruled grids only when text alignment found nothing
        let ruled = self.tables.config().lattice && !page.content.rulings.is_empty();
        if regions.is_empty() && ruled {
            regions = self
                .lattice
                .detect(&page.content.rulings, &page.content.spans)
                .iter()
                .map(|t| t.to_region(&page.frame, page_number))
                .collect();
            if !regions.is_empty() {
                log::debug!("Page {}: {} ruled tables", page_number, regions.len());
            }
        }

        regions.retain(|r| r.bbox.is_valid());
        Ok(regions)
    }
}

impl ImageExtractor for PdfParser {
    fn images(&self, page_number: u32) -> Result<Vec<RawImageRegion>> {
        if !self.options.extract_images {
            return Ok(Vec::new());
        }
        let page = self.page_for(page_number, Error::ImageExtract)?;
        Ok(ImageRegionBuilder::new(self.ocr.as_deref()).build(
            &page.content.images,
            &page.frame,
            page_number,
            |name| self.backend.image_data(page.id, name),
        ))
    }
}
