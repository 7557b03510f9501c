//! Layout engine: classification, region merging and hierarchy assembly.

mod assembler;
mod builder;
mod classifier;
mod engine;
mod merger;
mod options;
mod section;

pub use assembler::{AnalyzedPage, AnalyzedRegion, PageAssembler};
pub use builder::{check_page_sequence, DocumentBuilder};
pub use classifier::{
    is_caption, is_list_item, normalize_text, numbering_depth, BlockClassifier, BlockRole,
    FontBands, PageContext,
};
pub use engine::LayoutEngine;
pub use merger::{CandidateRegion, RegionKind, RegionMerger};
pub use options::{ConvertOptions, LayoutConfig};
pub use section::{SectionSnapshot, SectionTracker};
