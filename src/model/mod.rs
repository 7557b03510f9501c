//! Document model types.
//!
//! Two halves: the raw primitives the extractors hand to the layout engine,
//! and the typed, section-stamped document the engine produces.

mod content;
mod document;
mod primitives;

pub use content::ContentItem;
pub use document::{Document, Page};
pub use primitives::{
    DocumentPrimitives, PagePrimitives, RawImageRegion, RawTableRegion, RawTextBlock,
};
