//! Document and page types.

use serde::{Deserialize, Serialize};

use super::ContentItem;

/// A converted document: pages numbered 1..N in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Pages in the document
    pub pages: Vec<Page>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a page by number (1-indexed).
    pub fn get_page(&self, page_number: u32) -> Option<&Page> {
        if page_number == 0 {
            return None;
        }
        self.pages.get((page_number - 1) as usize)
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Iterate over every content item in document order.
    pub fn items(&self) -> impl Iterator<Item = &ContentItem> {
        self.pages.iter().flat_map(|page| page.content.iter())
    }

    /// Count content items by kind: (headings, paragraphs, tables, charts).
    pub fn item_counts(&self) -> (usize, usize, usize, usize) {
        self.items().fold((0, 0, 0, 0), |(h, p, t, c), item| match item {
            ContentItem::Heading { .. } => (h + 1, p, t, c),
            ContentItem::Paragraph { .. } => (h, p + 1, t, c),
            ContentItem::Table { .. } => (h, p, t + 1, c),
            ContentItem::Chart { .. } => (h, p, t, c + 1),
        })
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.pages
            .iter()
            .map(|page| page.plain_text())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// A single page and its content in reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed, matches the source PDF)
    pub page_number: u32,

    /// Content items, top to bottom
    pub content: Vec<ContentItem>,
}

impl Page {
    /// Create an empty page.
    pub fn new(page_number: u32) -> Self {
        Self {
            page_number,
            content: Vec::new(),
        }
    }

    /// Append a content item.
    pub fn push(&mut self, item: ContentItem) {
        self.content.push(item);
    }

    /// Check if the page has no content.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Get plain text content of the page.
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentItem::plain_text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
