//! Document builder: collects assembled pages into a [`Document`].

use crate::error::{Error, Result};
use crate::model::{Document, Page};

/// Aggregates pages and enforces a contiguous `1..=N` numbering.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    pages: Vec<Page>,
}

impl DocumentBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder sized for `page_count` pages.
    pub fn with_capacity(page_count: usize) -> Self {
        Self {
            pages: Vec::with_capacity(page_count),
        }
    }

    /// Add a page. Pages may arrive in any order.
    pub fn push(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Number of pages collected so far.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Check if no pages were added.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Sort pages by number and produce the document.
    ///
    /// Page content is passed through untouched.
    pub fn build(mut self) -> Result<Document> {
        self.pages.sort_by_key(|p| p.page_number);
        check_page_sequence(self.pages.iter().map(|p| p.page_number))?;
        Ok(Document { pages: self.pages })
    }
}

/// Check that sorted page numbers run `1, 2, ..., N` without repeats.
pub fn check_page_sequence<I>(sorted_numbers: I) -> Result<()>
where
    I: IntoIterator<Item = u32>,
{
    let mut expected = 1u32;
    for number in sorted_numbers {
        if number == 0 {
            return Err(Error::InvalidPageNumber(0));
        }
        if number < expected {
            return Err(Error::DuplicatePage(number));
        }
        if number > expected {
            return Err(Error::MissingPage(expected));
        }
        expected += 1;
    }
    Ok(())
}
