//! Raw extraction primitives handed to the layout engine.
//!
//! These records are produced by the text, table and image extractors and
//! consumed read-only by the region merger. They deserialize from an
//! extraction dump, where any missing collection counts as empty.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::BoundingBox;

/// A run of text with its position and font metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTextBlock {
    /// Text content
    pub text: String,
    /// Position on the page
    pub bbox: BoundingBox,
    /// Dominant font size in points
    pub font_size: f32,
    /// Whether the run is set in a bold face
    #[serde(default)]
    pub bold: bool,
    /// Page number (1-indexed)
    pub page_number: u32,
}

impl RawTextBlock {
    /// Create a new text block.
    pub fn new(
        page_number: u32,
        text: impl Into<String>,
        bbox: BoundingBox,
        font_size: f32,
        bold: bool,
    ) -> Self {
        Self {
            text: text.into(),
            bbox,
            font_size,
            bold,
            page_number,
        }
    }
}

/// A detected table and its cell matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTableRegion {
    /// Position on the page
    pub bbox: BoundingBox,
    /// Cell strings, row by row
    pub cells: Vec<Vec<String>>,
    /// Page number (1-indexed)
    pub page_number: u32,
}

impl RawTableRegion {
    /// Create a new table region.
    pub fn new(page_number: u32, bbox: BoundingBox, cells: Vec<Vec<String>>) -> Self {
        Self {
            bbox,
            cells,
            page_number,
        }
    }
}

/// A detected image or vector-graphics region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawImageRegion {
    /// Position on the page
    pub bbox: BoundingBox,
    /// Text recovered by OCR, if any
    #[serde(default)]
    pub ocr_text: Option<String>,
    /// Page number (1-indexed)
    pub page_number: u32,
}

impl RawImageRegion {
    /// Create a new image region without OCR text.
    pub fn new(page_number: u32, bbox: BoundingBox) -> Self {
        Self {
            bbox,
            ocr_text: None,
            page_number,
        }
    }

    /// Attach OCR text to the region.
    pub fn with_ocr_text(mut self, text: impl Into<String>) -> Self {
        self.ocr_text = Some(text.into());
        self
    }
}

/// Everything the extractors produced for one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PagePrimitives {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Text blocks, in any order
    #[serde(default)]
    pub text_blocks: Vec<RawTextBlock>,
    /// Table regions, in any order
    #[serde(default)]
    pub tables: Vec<RawTableRegion>,
    /// Image regions, in any order
    #[serde(default)]
    pub images: Vec<RawImageRegion>,
}

impl PagePrimitives {
    /// Create an empty page.
    pub fn new(page_number: u32) -> Self {
        Self {
            page_number,
            ..Default::default()
        }
    }

    /// Add a text block.
    pub fn with_text(mut self, block: RawTextBlock) -> Self {
        self.text_blocks.push(block);
        self
    }

    /// Add a table region.
    pub fn with_table(mut self, table: RawTableRegion) -> Self {
        self.tables.push(table);
        self
    }

    /// Add an image region.
    pub fn with_image(mut self, image: RawImageRegion) -> Self {
        self.images.push(image);
        self
    }

    /// Check if the page carries no primitives at all.
    pub fn is_empty(&self) -> bool {
        self.text_blocks.is_empty() && self.tables.is_empty() && self.images.is_empty()
    }

    /// Verify every primitive is filed under this page.
    pub fn check_page_numbers(&self) -> Result<()> {
        let found = self
            .text_blocks
            .iter()
            .map(|b| b.page_number)
            .chain(self.tables.iter().map(|t| t.page_number))
            .chain(self.images.iter().map(|i| i.page_number))
            .find(|&n| n != self.page_number);

        match found {
            Some(found) => Err(Error::PageMismatch {
                expected: self.page_number,
                found,
            }),
            None => Ok(()),
        }
    }
}

/// The primitives of a whole document, page by page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentPrimitives {
    /// Pages in the order the front-end produced them
    pub pages: Vec<PagePrimitives>,
}

impl DocumentPrimitives {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page.
    pub fn add_page(&mut self, page: PagePrimitives) {
        self.pages.push(page);
    }

    /// Number of pages.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Parse an extraction dump from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::InvalidPrimitives(e.to_string()))
    }
}
