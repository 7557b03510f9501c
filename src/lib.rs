//! # structpdf
//!
//! Section-aware PDF to JSON conversion.
//!
//! Extractors pull positioned text blocks, tables and images out of each
//! page. The layout engine classifies them as headings, paragraphs, tables
//! or charts, orders them top to bottom and stamps every item with the
//! section it belongs to.
//!
//! ## Quick Start
//!
//! ```no_run
//! use structpdf::{convert_file, to_json, JsonFormat};
//!
//! fn main() -> structpdf::Result<()> {
//!     let doc = convert_file("report.pdf")?;
//!     println!("{}", to_json(&doc, JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Bring your own extractors
//!
//! The layout engine only sees [`DocumentPrimitives`]. Anything that can
//! produce text blocks, table regions and image regions per page can feed
//! it, either through the [`parser::TextExtractor`] family of traits or by
//! building the primitives directly:
//!
//! ```
//! use structpdf::geometry::BoundingBox;
//! use structpdf::model::{ContentItem, DocumentPrimitives, PagePrimitives, RawTextBlock};
//!
//! let mut primitives = DocumentPrimitives::new();
//! primitives.add_page(
//!     PagePrimitives::new(1)
//!         .with_text(RawTextBlock::new(1, "Introduction", BoundingBox::new(72.0, 72.0, 300.0, 96.0), 24.0, true))
//!         .with_text(RawTextBlock::new(1, "Body text.", BoundingBox::new(72.0, 110.0, 540.0, 122.0), 11.0, false))
//!         .with_text(RawTextBlock::new(1, "More body.", BoundingBox::new(72.0, 130.0, 540.0, 142.0), 11.0, false)),
//! );
//!
//! let doc = structpdf::convert_primitives(&primitives).unwrap();
//! assert_eq!(doc.pages[0].content[0], ContentItem::heading(1, "Introduction"));
//! assert_eq!(doc.pages[0].content[1].section(), Some("Introduction"));
//! ```

pub mod detect;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf, PdfFormat};
pub use error::{Error, Result};
pub use geometry::BoundingBox;
pub use layout::{ConvertOptions, LayoutConfig, LayoutEngine};
pub use model::{
    ContentItem, Document, DocumentPrimitives, Page, PagePrimitives, RawImageRegion,
    RawTableRegion, RawTextBlock,
};
pub use parser::{ErrorMode, ImageData, OcrEngine, ParseOptions, PdfParser};
pub use render::JsonFormat;

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

/// Run the layout engine on already extracted primitives.
pub fn convert_primitives(primitives: &DocumentPrimitives) -> Result<Document> {
    LayoutEngine::default().run(primitives)
}

/// Convert a PDF file into a structured document.
///
/// # Example
///
/// ```no_run
/// let doc = structpdf::convert_file("report.pdf").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn convert_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    StructPdf::new()
        .convert_file(path)
        .map(Conversion::into_document)
}

/// Convert a PDF held in memory.
pub fn convert_bytes(data: &[u8]) -> Result<Document> {
    StructPdf::new()
        .convert_bytes(data)
        .map(Conversion::into_document)
}

/// Convert a PDF from a reader.
pub fn convert_reader<R: Read>(reader: R) -> Result<Document> {
    StructPdf::new()
        .convert_reader(reader)
        .map(Conversion::into_document)
}

/// Render a document as JSON.
pub fn to_json(doc: &Document, format: JsonFormat) -> Result<String> {
    render::to_json(doc, format)
}

/// Builder for configuring a conversion.
///
/// # Example
///
/// ```no_run
/// use structpdf::{LayoutConfig, StructPdf};
///
/// let json = StructPdf::new()
///     .lenient()
///     .with_worker_threads(4)
///     .with_layout(LayoutConfig::new().with_numbered_heading_levels(true))
///     .convert_file("report.pdf")?
///     .to_json_compact()?;
/// # Ok::<(), structpdf::Error>(())
/// ```
pub struct StructPdf {
    parse_options: ParseOptions,
    convert_options: ConvertOptions,
    ocr: Option<Arc<dyn OcrEngine>>,
}

impl StructPdf {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::default(),
            convert_options: ConvertOptions::default(),
            ocr: None,
        }
    }

    /// Skip a failing extractor for a page instead of aborting.
    pub fn lenient(mut self) -> Self {
        self.parse_options = self.parse_options.lenient();
        self
    }

    /// Disable parallel page analysis.
    pub fn sequential(mut self) -> Self {
        self.convert_options = self.convert_options.sequential();
        self
    }

    /// Bound the analysis pool to `threads` workers.
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.convert_options = self.convert_options.with_worker_threads(threads);
        self
    }

    /// Set the layout heuristics.
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.convert_options = self.convert_options.with_layout(layout);
        self
    }

    /// Enable or disable table detection.
    pub fn with_tables(mut self, enabled: bool) -> Self {
        self.parse_options = self.parse_options.with_tables(enabled);
        self
    }

    /// Enable or disable image regions.
    pub fn with_images(mut self, enabled: bool) -> Self {
        self.parse_options = self.parse_options.with_images(enabled);
        self
    }

    /// Run OCR on image regions; recognized text becomes the chart description.
    pub fn with_ocr(mut self, engine: impl OcrEngine + 'static) -> Self {
        self.ocr = Some(Arc::new(engine));
        self
    }

    /// Extract the primitives of a PDF file without running the layout engine.
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> Result<DocumentPrimitives> {
        let parser = PdfParser::open_with_options(path, self.parse_options.clone())?;
        self.attach_ocr(parser).extract()
    }

    /// Convert a PDF file.
    pub fn convert_file<P: AsRef<Path>>(&self, path: P) -> Result<Conversion> {
        let primitives = self.extract_file(path)?;
        self.convert_primitives(&primitives)
    }

    /// Convert a PDF held in memory.
    pub fn convert_bytes(&self, data: &[u8]) -> Result<Conversion> {
        let parser = PdfParser::from_bytes_with_options(data, self.parse_options.clone())?;
        let primitives = self.attach_ocr(parser).extract()?;
        self.convert_primitives(&primitives)
    }

    /// Convert a PDF from a reader.
    pub fn convert_reader<R: Read>(&self, reader: R) -> Result<Conversion> {
        let parser = PdfParser::from_reader_with_options(reader, self.parse_options.clone())?;
        let primitives = self.attach_ocr(parser).extract()?;
        self.convert_primitives(&primitives)
    }

    /// Run the layout engine on already extracted primitives.
    pub fn convert_primitives(&self, primitives: &DocumentPrimitives) -> Result<Conversion> {
        let document = LayoutEngine::new(self.convert_options.clone()).run(primitives)?;
        Ok(Conversion { document })
    }

    fn attach_ocr(&self, parser: PdfParser) -> PdfParser {
        match &self.ocr {
            Some(engine) => parser.with_ocr(Arc::clone(engine)),
            None => parser,
        }
    }
}

impl Default for StructPdf {
    fn default() -> Self {
        Self::new()
    }
}

/// A finished conversion.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// The converted document
    pub document: Document,
}

impl Conversion {
    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        render::to_json(&self.document, JsonFormat::Pretty)
    }

    /// Compact JSON.
    pub fn to_json_compact(&self) -> Result<String> {
        render::to_json(&self.document, JsonFormat::Compact)
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Take the document.
    pub fn into_document(self) -> Document {
        self.document
    }
}

impl From<Conversion> for Document {
    fn from(conversion: Conversion) -> Self {
        conversion.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = StructPdf::default();
        assert!(builder.convert_options.parallel);
        assert!(builder.ocr.is_none());
        assert_eq!(builder.parse_options.error_mode, ErrorMode::Strict);
    }

    #[test]
    fn test_builder_chained() {
        let builder = StructPdf::new()
            .lenient()
            .sequential()
            .with_worker_threads(3)
            .with_tables(false)
            .with_ocr(|_: &ImageData| -> Result<Option<String>> { Ok(None) });

        assert_eq!(builder.parse_options.error_mode, ErrorMode::Lenient);
        assert!(!builder.parse_options.extract_tables);
        assert!(!builder.convert_options.parallel);
        assert_eq!(builder.convert_options.worker_threads, Some(3));
        assert!(builder.ocr.is_some());
    }

    #[test]
    fn test_convert_bytes_rejects_non_pdf() {
        assert!(matches!(
            convert_bytes(b"not a pdf"),
            Err(Error::UnknownFormat)
        ));
        assert!(convert_bytes(&[]).is_err());
    }

    #[test]
    fn test_convert_primitives_empty_document() {
        let doc = convert_primitives(&DocumentPrimitives::new()).unwrap();
        assert!(doc.is_empty());
        assert_eq!(
            to_json(&doc, JsonFormat::Compact).unwrap(),
            r#"{"pages":[]}"#
        );
    }

    #[test]
    fn test_conversion_into_document() {
        let mut primitives = DocumentPrimitives::new();
        primitives.add_page(PagePrimitives::new(1));
        let conversion = StructPdf::new()
            .sequential()
            .convert_primitives(&primitives)
            .unwrap();

        assert_eq!(conversion.document().page_count(), 1);
        let doc: Document = conversion.into();
        assert!(doc.pages[0].is_empty());
    }
}
