//! JSON rendering for converted documents.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{Document, DocumentPrimitives};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

fn render<T: Serialize>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Convert a document to JSON.
pub fn to_json(doc: &Document, format: JsonFormat) -> Result<String> {
    render(doc, format)
}

/// Dump extracted primitives as JSON, readable by [`DocumentPrimitives::from_json`].
pub fn primitives_to_json(primitives: &DocumentPrimitives, format: JsonFormat) -> Result<String> {
    render(primitives, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoundingBox;
    use crate::model::{ContentItem, Page, PagePrimitives, RawTextBlock};

    fn sample() -> Document {
        let mut page = Page::new(1);
        page.push(ContentItem::heading(1, "Introduction"));
        page.push(ContentItem::paragraph(
            "Body text.",
            Some("Introduction".into()),
            None,
        ));
        Document { pages: vec![page] }
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&sample(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"page_number\": 1"));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&sample(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.starts_with(r#"{"pages":[{"page_number":1,"content":[{"type":"heading""#));
    }

    #[test]
    fn test_primitives_dump_reloads() {
        let mut primitives = DocumentPrimitives::new();
        primitives.add_page(PagePrimitives::new(1).with_text(RawTextBlock::new(
            1,
            "Hello",
            BoundingBox::new(72.0, 72.0, 200.0, 84.0),
            12.0,
            false,
        )));

        let json = primitives_to_json(&primitives, JsonFormat::Compact).unwrap();
        assert_eq!(DocumentPrimitives::from_json(&json).unwrap(), primitives);
    }
}
