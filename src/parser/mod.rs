//! PDF extraction front-end.
//!
//! Interprets page content streams with lopdf and produces the text, table
//! and image primitives the layout engine consumes. Other front-ends can
//! plug in through the extractor traits.

mod backend;
mod extract;
mod images;
mod interpreter;
mod lattice;
mod ocr;
mod options;
mod pdf_parser;
mod table_detector;
mod text;

pub use backend::{
    decode_text_simple, BackendFontInfo, ContentOp, LopdfBackend, PageId, PdfBackend, PdfValue,
};
pub use extract::{collect_primitives, ImageExtractor, TableExtractor, TextExtractor};
pub use images::ImageRegionBuilder;
pub use interpreter::{
    is_bold_font, is_spaceless_script_char, ContentInterpreter, ImagePlacement, PageContent,
    PageFrame, Ruling, TextSpan,
};
pub use lattice::{LatticeDetector, LatticeTable};
pub use ocr::{ImageData, OcrEngine};
pub use options::{ErrorMode, ParseOptions};
pub use pdf_parser::PdfParser;
pub use table_detector::{DetectedTable, TableDetector, TableDetectorConfig, TableRowData};
pub use text::{build_text_blocks, group_into_blocks, group_into_lines, TextLine};
