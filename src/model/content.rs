//! Typed content items emitted by the page assembler.

use serde::{Deserialize, Serialize};

/// A single piece of page content, tagged by kind.
///
/// Serializes with a `"type"` discriminator (`heading`, `paragraph`,
/// `table`, `chart`). Optional fields are written as `null`, never omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentItem {
    /// A section or sub-section heading
    Heading {
        /// Heading level (1 = section)
        level: u8,
        /// Heading text
        text: String,
    },

    /// A block of prose (list items and captions included)
    Paragraph {
        /// Active section when the paragraph was emitted
        section: Option<String>,
        /// Active sub-section when the paragraph was emitted
        sub_section: Option<String>,
        /// Paragraph text
        text: String,
    },

    /// A table, passed through as the extractor's cell matrix
    Table {
        /// Active section when the table was emitted
        section: Option<String>,
        /// Table description
        description: Option<String>,
        /// Cell strings, row by row
        table_data: Vec<Vec<String>>,
    },

    /// An image or chart region
    Chart {
        /// Active section when the chart was emitted
        section: Option<String>,
        /// OCR text or a placeholder
        description: Option<String>,
        /// Reserved for structured chart data; always `null`
        chart_data: Option<serde_json::Value>,
    },
}

impl ContentItem {
    /// Create a heading item.
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        ContentItem::Heading {
            level,
            text: text.into(),
        }
    }

    /// Create a paragraph item.
    pub fn paragraph(
        text: impl Into<String>,
        section: Option<String>,
        sub_section: Option<String>,
    ) -> Self {
        ContentItem::Paragraph {
            section,
            sub_section,
            text: text.into(),
        }
    }

    /// Create a table item without description.
    pub fn table(table_data: Vec<Vec<String>>, section: Option<String>) -> Self {
        ContentItem::Table {
            section,
            description: None,
            table_data,
        }
    }

    /// Create a chart item.
    pub fn chart(description: impl Into<String>, section: Option<String>) -> Self {
        ContentItem::Chart {
            section,
            description: Some(description.into()),
            chart_data: None,
        }
    }

    /// Wire name of the item kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ContentItem::Heading { .. } => "heading",
            ContentItem::Paragraph { .. } => "paragraph",
            ContentItem::Table { .. } => "table",
            ContentItem::Chart { .. } => "chart",
        }
    }

    /// Section stamped on the item; always `None` for headings.
    pub fn section(&self) -> Option<&str> {
        match self {
            ContentItem::Heading { .. } => None,
            ContentItem::Paragraph { section, .. }
            | ContentItem::Table { section, .. }
            | ContentItem::Chart { section, .. } => section.as_deref(),
        }
    }

    /// Sub-section stamped on the item; only paragraphs carry one.
    pub fn sub_section(&self) -> Option<&str> {
        match self {
            ContentItem::Paragraph { sub_section, .. } => sub_section.as_deref(),
            _ => None,
        }
    }

    /// Check if this item is a heading.
    pub fn is_heading(&self) -> bool {
        matches!(self, ContentItem::Heading { .. })
    }

    /// Plain text of the item, if it carries any.
    pub fn plain_text(&self) -> Option<String> {
        match self {
            ContentItem::Heading { text, .. } | ContentItem::Paragraph { text, .. } => {
                Some(text.clone())
            }
            ContentItem::Table { table_data, .. } => Some(
                table_data
                    .iter()
                    .map(|row| row.join("\t"))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            ContentItem::Chart { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_has_no_section() {
        let heading = ContentItem::heading(1, "Intro");
        assert!(heading.is_heading());
        assert_eq!(heading.section(), None);
        assert_eq!(heading.sub_section(), None);
    }

    #[test]
    fn test_stamped_accessors() {
        let para = ContentItem::paragraph("Body", Some("A".into()), Some("B".into()));
        assert_eq!(para.section(), Some("A"));
        assert_eq!(para.sub_section(), Some("B"));

        let table = ContentItem::table(vec![vec!["x".into()]], Some("A".into()));
        assert_eq!(table.section(), Some("A"));
        assert_eq!(table.sub_section(), None);
        assert_eq!(table.kind(), "table");
    }

    #[test]
    fn test_chart_serializes_null_chart_data() {
        let chart = ContentItem::chart("image detected", None);
        let value = serde_json::to_value(&chart).unwrap();
        assert_eq!(value["type"], "chart");
        assert!(value["section"].is_null());
        assert!(value["chart_data"].is_null());
        assert_eq!(value["description"], "image detected");
    }

    #[test]
    fn test_paragraph_wire_shape() {
        let para = ContentItem::paragraph("Body text.", Some("Introduction".into()), None);
        let value = serde_json::to_value(&para).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "type": "paragraph",
                "section": "Introduction",
                "sub_section": null,
                "text": "Body text."
            })
        );
    }
}
