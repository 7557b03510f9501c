//! Block classification: heading, list item, caption or paragraph.
//!
//! A block is judged against its page's typography (the baseline font size
//! and how much of the page is bold). Heading levels are not decided here:
//! they come from [`FontBands`], which is built over the whole document so
//! the same size maps to the same level on every page.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::model::RawTextBlock;

use super::options::LayoutConfig;

/// Semantic role of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRole {
    /// A heading; the level is assigned later from document font bands
    Heading,
    /// A bulleted or numbered list entry
    ListItem,
    /// A figure or table caption
    Caption,
    /// Regular prose
    Paragraph,
}

/// Typographic statistics of one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageContext {
    /// Most common font size on the page (0.0 when unknown)
    pub baseline_size: f32,
    /// Share of blocks set in bold
    pub bold_rate: f32,
}

impl PageContext {
    /// Compute page statistics from its text blocks.
    ///
    /// The baseline is the mode of the block font sizes rounded to 0.1pt;
    /// on a tie the smaller size wins, since body text is rarely the
    /// largest type on a page. Blank blocks are ignored.
    pub fn from_blocks(blocks: &[RawTextBlock]) -> Self {
        let mut histogram: BTreeMap<i32, usize> = BTreeMap::new();
        let mut counted = 0usize;
        let mut bold = 0usize;

        for block in blocks.iter().filter(|b| !b.text.trim().is_empty()) {
            counted += 1;
            if block.bold {
                bold += 1;
            }
            if block.font_size.is_finite() && block.font_size > 0.0 {
                *histogram.entry(size_key(block.font_size)).or_insert(0) += 1;
            }
        }

        // BTreeMap iterates ascending, so keeping the first maximum favours
        // the smaller size.
        let mut baseline_key = None;
        let mut best = 0usize;
        for (&key, &count) in &histogram {
            if count > best {
                best = count;
                baseline_key = Some(key);
            }
        }

        Self {
            baseline_size: baseline_key.map(|k| k as f32 / 10.0).unwrap_or(0.0),
            bold_rate: if counted > 0 {
                bold as f32 / counted as f32
            } else {
                0.0
            },
        }
    }
}

/// Round a font size to 0.1pt for histogramming.
fn size_key(size: f32) -> i32 {
    (size * 10.0).round() as i32
}

/// Classifies text blocks using page context and configured thresholds.
pub struct BlockClassifier<'a> {
    config: &'a LayoutConfig,
}

impl<'a> BlockClassifier<'a> {
    /// Create a classifier over the given config.
    pub fn new(config: &'a LayoutConfig) -> Self {
        Self { config }
    }

    /// Classify a block. Returns `None` for blank blocks, which are dropped.
    pub fn classify(&self, block: &RawTextBlock, context: &PageContext) -> Option<BlockRole> {
        let text = block.text.trim();
        if text.is_empty() {
            return None;
        }

        if self.is_heading(block, text, context) {
            return Some(BlockRole::Heading);
        }
        if is_list_item(text) {
            return Some(BlockRole::ListItem);
        }
        if is_caption(text) {
            return Some(BlockRole::Caption);
        }
        Some(BlockRole::Paragraph)
    }

    fn is_heading(&self, block: &RawTextBlock, text: &str, context: &PageContext) -> bool {
        let baseline = context.baseline_size;
        let size = block.font_size;
        if baseline <= 0.0 || !size.is_finite() {
            return false;
        }

        if size >= baseline * self.config.heading_size_ratio {
            return true;
        }

        block.bold
            && context.bold_rate <= self.config.max_bold_rate
            && text.chars().count() <= self.config.bold_heading_max_chars
            && size >= baseline * self.config.bold_heading_size_ratio
    }
}

/// Heading size bands discovered across a whole document.
///
/// Sizes are sorted largest first and clustered: a size within `tolerance`
/// of the current band's top size joins it, otherwise it opens the next
/// band. Band N (0-based) maps to heading level N + 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontBands {
    /// Top size of each band, descending
    bands: Vec<f32>,
    tolerance: f32,
    max_level: u8,
}

impl FontBands {
    /// Build bands from observed heading sizes.
    pub fn from_sizes<I>(sizes: I, tolerance: f32, max_level: u8) -> Self
    where
        I: IntoIterator<Item = f32>,
    {
        let mut sizes: Vec<f32> = sizes
            .into_iter()
            .filter(|s| s.is_finite() && *s > 0.0)
            .map(|s| size_key(s) as f32 / 10.0)
            .collect();
        sizes.sort_by(|a, b| b.total_cmp(a));

        let mut bands: Vec<f32> = Vec::new();
        for size in sizes {
            match bands.last() {
                Some(&top) if top - size <= tolerance => {}
                _ => bands.push(size),
            }
        }

        log::debug!("Heading font bands: {:?}", bands);

        Self {
            bands,
            tolerance,
            max_level: max_level.max(1),
        }
    }

    /// Heading level for a font size.
    ///
    /// The first band the size reaches wins, so a size close to two bands
    /// takes the lower level number. Sizes below every band get the
    /// deepest level.
    pub fn level_for(&self, size: f32) -> u8 {
        let rounded = size_key(size) as f32 / 10.0;
        let index = self
            .bands
            .iter()
            .position(|&top| rounded >= top - self.tolerance)
            .unwrap_or(self.bands.len().saturating_sub(1));
        ((index + 1).min(self.max_level as usize)) as u8
    }

    /// Number of distinct bands.
    pub fn len(&self) -> usize {
        self.bands.len()
    }

    /// Check if no heading sizes were observed.
    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

fn list_item_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?:[-–•●○◦▪■□►✓*]|\(?\d{1,3}[.)]|\(?[a-zA-Z][.)]|\(?(?:[ivxlcdm]{1,5}|[IVXLCDM]{1,5})[.)])\s+\S",
        )
        .expect("list item pattern is valid")
    })
}

fn caption_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?i:fig(?:ure)?\.?|table|chart|exhibit)\s*\d+(?:\.\d+)*\s*[.:\-–]")
            .expect("caption pattern is valid")
    })
}

fn numbering_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d+(?:\.\d+)*)\.?(?:\s+|-)\s*\S").expect("numbering pattern is valid")
    })
}

/// Check for a leading bullet or enumerator token.
pub fn is_list_item(text: &str) -> bool {
    list_item_regex().is_match(text.trim_start())
}

/// Check for a `Figure 3:` / `Table 2.` style caption lead.
pub fn is_caption(text: &str) -> bool {
    caption_regex().is_match(text.trim_start())
}

/// Depth of a `2.3.1 Title` style section number (`2.3` has depth 2).
pub fn numbering_depth(text: &str) -> Option<u8> {
    let caps = numbering_regex().captures(text.trim_start())?;
    let depth = caps.get(1)?.as_str().split('.').count();
    Some(depth.min(u8::MAX as usize) as u8)
}

/// NFC-normalize text and collapse all whitespace runs to single spaces.
pub fn normalize_text(text: &str) -> String {
    let text: String = text.nfc().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
