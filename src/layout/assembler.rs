//! Page assembly: turn merged regions into typed, section-stamped content.
//!
//! Assembly is split in two so the expensive part can run in parallel:
//! [`PageAssembler::analyze`] is page-local and side-effect free, while
//! [`PageAssembler::assemble`] must see pages in document order because it
//! drives the shared [`SectionTracker`].

use crate::error::Result;
use crate::model::{ContentItem, Page, PagePrimitives};

use super::classifier::{normalize_text, numbering_depth, BlockClassifier, BlockRole, FontBands, PageContext};
use super::merger::{CandidateRegion, RegionMerger};
use super::options::LayoutConfig;
use super::section::SectionTracker;

/// A classified region whose heading level is not yet known.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzedRegion {
    /// Heading text and the font size that will pick its level
    Heading { text: String, font_size: f32 },
    /// Prose, list item or caption text
    Paragraph { text: String },
    /// Raw table cell matrix
    Table { cells: Vec<Vec<String>> },
    /// Image region with optional OCR text
    Chart { ocr_text: Option<String> },
}

/// A page after analysis, ready for stamping.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedPage {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Regions in reading order
    pub regions: Vec<AnalyzedRegion>,
}

impl AnalyzedPage {
    /// Font sizes of the heading candidates on this page.
    pub fn heading_sizes(&self) -> impl Iterator<Item = f32> + '_ {
        self.regions.iter().filter_map(|r| match r {
            AnalyzedRegion::Heading { font_size, .. } => Some(*font_size),
            _ => None,
        })
    }
}

/// Builds page content from primitives.
pub struct PageAssembler<'a> {
    config: &'a LayoutConfig,
    merger: RegionMerger,
}

impl<'a> PageAssembler<'a> {
    /// Create an assembler over the given config.
    pub fn new(config: &'a LayoutConfig) -> Self {
        Self {
            config,
            merger: RegionMerger::new(config.containment_threshold),
        }
    }

    /// Merge and classify one page.
    ///
    /// Validates page numbers and every bounding box up front, so a
    /// malformed primitive fails the page even when nothing overlaps it.
    pub fn analyze(&self, page: &PagePrimitives) -> Result<AnalyzedPage> {
        page.check_page_numbers()?;
        for block in &page.text_blocks {
            block.bbox.validate()?;
        }
        for table in &page.tables {
            table.bbox.validate()?;
        }
        for image in &page.images {
            image.bbox.validate()?;
        }

        let context = PageContext::from_blocks(&page.text_blocks);
        let classifier = BlockClassifier::new(self.config);
        let merged = self.merger.merge(page)?;

        log::debug!(
            "Page {}: baseline {:.1}pt, bold rate {:.2}",
            page.page_number,
            context.baseline_size,
            context.bold_rate
        );

        let mut regions = Vec::with_capacity(merged.len());
        for candidate in merged {
            match candidate {
                CandidateRegion::Text(block) => {
                    let Some(role) = classifier.classify(block, &context) else {
                        continue;
                    };
                    let text = normalize_text(&block.text);
                    if text.is_empty() {
                        continue;
                    }
                    regions.push(match role {
                        BlockRole::Heading => AnalyzedRegion::Heading {
                            text,
                            font_size: block.font_size,
                        },
                        BlockRole::ListItem | BlockRole::Caption | BlockRole::Paragraph => {
                            AnalyzedRegion::Paragraph { text }
                        }
                    });
                }
                CandidateRegion::Table(table) => regions.push(AnalyzedRegion::Table {
                    cells: table.cells.clone(),
                }),
                CandidateRegion::Image(image) => regions.push(AnalyzedRegion::Chart {
                    ocr_text: image
                        .ocr_text
                        .as_deref()
                        .map(normalize_text)
                        .filter(|t| !t.is_empty()),
                }),
            }
        }

        Ok(AnalyzedPage {
            page_number: page.page_number,
            regions,
        })
    }

    /// Build heading bands from analyzed pages, in document order.
    pub fn font_bands(&self, pages: &[AnalyzedPage]) -> FontBands {
        FontBands::from_sizes(
            pages.iter().flat_map(|p| p.heading_sizes()),
            self.config.band_tolerance,
            self.config.max_heading_level,
        )
    }

    /// Emit a page's content, stamping items from the tracker.
    ///
    /// Pages must be fed in ascending order through the same tracker.
    pub fn assemble(
        &self,
        page: AnalyzedPage,
        bands: &FontBands,
        tracker: &mut SectionTracker,
    ) -> Page {
        let mut out = Page::new(page.page_number);

        for region in page.regions {
            let item = match region {
                AnalyzedRegion::Heading { text, font_size } => {
                    let level = self.heading_level(&text, font_size, bands);
                    tracker.observe_heading(level, &text);
                    ContentItem::heading(level, text)
                }
                AnalyzedRegion::Paragraph { text } => {
                    let snapshot = tracker.snapshot();
                    ContentItem::paragraph(text, snapshot.section, snapshot.sub_section)
                }
                AnalyzedRegion::Table { cells } => {
                    ContentItem::table(cells, tracker.section().map(String::from))
                }
                AnalyzedRegion::Chart { ocr_text } => ContentItem::chart(
                    ocr_text.unwrap_or_else(|| self.config.image_placeholder.clone()),
                    tracker.section().map(String::from),
                ),
            };
            out.push(item);
        }

        out
    }

    fn heading_level(&self, text: &str, font_size: f32, bands: &FontBands) -> u8 {
        if self.config.numbered_heading_levels {
            if let Some(depth) = numbering_depth(text) {
                return depth.clamp(1, self.config.max_heading_level);
            }
        }
        bands.level_for(font_size)
    }
}
