//! Region merging: fuse the text, table and image streams of a page.
//!
//! The three extractors work independently, so a table's cell text usually
//! also shows up as loose text blocks. Text mostly contained in a table or
//! image region is treated as part of that region and dropped; the rest is
//! interleaved with the regions in reading order.

use std::cmp::Ordering;

use crate::error::Result;
use crate::geometry::{containment_ratio, BoundingBox};
use crate::model::{PagePrimitives, RawImageRegion, RawTableRegion, RawTextBlock};

/// Which extraction stream a candidate region came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RegionKind {
    /// A text block
    Text,
    /// A table region
    Table,
    /// An image region
    Image,
}

/// A page region awaiting classification, tagged with its source.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateRegion<'a> {
    /// A standalone text block
    Text(&'a RawTextBlock),
    /// A table region
    Table(&'a RawTableRegion),
    /// An image region
    Image(&'a RawImageRegion),
}

impl CandidateRegion<'_> {
    /// Position of the region.
    pub fn bbox(&self) -> &BoundingBox {
        match self {
            CandidateRegion::Text(b) => &b.bbox,
            CandidateRegion::Table(t) => &t.bbox,
            CandidateRegion::Image(i) => &i.bbox,
        }
    }

    /// Source stream of the region.
    pub fn kind(&self) -> RegionKind {
        match self {
            CandidateRegion::Text(_) => RegionKind::Text,
            CandidateRegion::Table(_) => RegionKind::Table,
            CandidateRegion::Image(_) => RegionKind::Image,
        }
    }
}

/// Merges one page's primitives into reading order.
pub struct RegionMerger {
    containment_threshold: f32,
}

impl RegionMerger {
    /// Create a merger that drops text more contained than `threshold`.
    pub fn new(containment_threshold: f32) -> Self {
        Self {
            containment_threshold,
        }
    }

    /// Merge a page into an ordered list of candidate regions.
    ///
    /// Ordering is top edge, then left edge, then source kind, then the
    /// primitive's position in its input collection, which makes it a total
    /// order: the same input always yields the same sequence. Fails only on
    /// malformed bounding boxes.
    pub fn merge<'a>(&self, page: &'a PagePrimitives) -> Result<Vec<CandidateRegion<'a>>> {
        let mut tables: Vec<&RawTableRegion> = page.tables.iter().collect();
        let mut images: Vec<&RawImageRegion> = page.images.iter().collect();
        tables.sort_by(|a, b| reading_order(&a.bbox, &b.bbox));
        images.sort_by(|a, b| reading_order(&a.bbox, &b.bbox));

        let occupied: Vec<&BoundingBox> = tables
            .iter()
            .map(|t| &t.bbox)
            .chain(images.iter().map(|i| &i.bbox))
            .collect();

        let mut kept: Vec<(usize, CandidateRegion<'a>)> = Vec::new();
        let mut suppressed = 0usize;

        for (index, block) in page.text_blocks.iter().enumerate() {
            if self.is_inside_region(&block.bbox, &occupied)? {
                suppressed += 1;
                continue;
            }
            kept.push((index, CandidateRegion::Text(block)));
        }
        for (index, table) in tables.into_iter().enumerate() {
            kept.push((index, CandidateRegion::Table(table)));
        }
        for (index, image) in images.into_iter().enumerate() {
            kept.push((index, CandidateRegion::Image(image)));
        }

        kept.sort_by(|(ia, a), (ib, b)| {
            reading_order(a.bbox(), b.bbox())
                .then_with(|| a.kind().cmp(&b.kind()))
                .then_with(|| ia.cmp(ib))
        });

        log::debug!(
            "Page {}: merged {} regions ({} text blocks suppressed)",
            page.page_number,
            kept.len(),
            suppressed
        );

        Ok(kept.into_iter().map(|(_, region)| region).collect())
    }

    fn is_inside_region(&self, bbox: &BoundingBox, regions: &[&BoundingBox]) -> Result<bool> {
        for region in regions {
            if containment_ratio(bbox, region)? > self.containment_threshold {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Top-to-bottom, then left-to-right.
fn reading_order(a: &BoundingBox, b: &BoundingBox) -> Ordering {
    a.y0.total_cmp(&b.y0).then_with(|| a.x0.total_cmp(&b.x0))
}
