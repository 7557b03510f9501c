//! Wire-format tests for rendered documents.

use serde_json::json;

use structpdf::model::{DocumentPrimitives, PagePrimitives, RawImageRegion, RawTableRegion};
use structpdf::{convert_primitives, to_json, BoundingBox, Document, JsonFormat, RawTextBlock};

fn sample() -> Document {
    let mut primitives = DocumentPrimitives::new();
    primitives.add_page(
        PagePrimitives::new(1)
            .with_text(RawTextBlock::new(
                1,
                "Market  Overview",
                BoundingBox::new(72.0, 60.0, 400.0, 84.0),
                24.0,
                true,
            ))
            .with_text(RawTextBlock::new(
                1,
                "Growth was\nsteady.",
                BoundingBox::new(72.0, 100.0, 540.0, 124.0),
                12.0,
                false,
            ))
            .with_text(RawTextBlock::new(
                1,
                "• Second point",
                BoundingBox::new(72.0, 130.0, 540.0, 142.0),
                12.0,
                false,
            ))
            .with_table(RawTableRegion::new(
                1,
                BoundingBox::new(72.0, 160.0, 540.0, 220.0),
                vec![vec!["Q1".into(), "Q2".into()], vec!["4%".into(), "5%".into()]],
            ))
            .with_image(RawImageRegion::new(
                1,
                BoundingBox::new(72.0, 240.0, 300.0, 400.0),
            )),
    );
    primitives.add_page(PagePrimitives::new(2));
    convert_primitives(&primitives).unwrap()
}

#[test]
fn test_document_wire_shape() {
    let value: serde_json::Value =
        serde_json::from_str(&to_json(&sample(), JsonFormat::Pretty).unwrap()).unwrap();

    assert_eq!(
        value,
        json!({
            "pages": [
                {
                    "page_number": 1,
                    "content": [
                        {"type": "heading", "level": 1, "text": "Market Overview"},
                        {
                            "type": "paragraph",
                            "section": "Market Overview",
                            "sub_section": null,
                            "text": "Growth was steady."
                        },
                        {
                            "type": "paragraph",
                            "section": "Market Overview",
                            "sub_section": null,
                            "text": "• Second point"
                        },
                        {
                            "type": "table",
                            "section": "Market Overview",
                            "description": null,
                            "table_data": [["Q1", "Q2"], ["4%", "5%"]]
                        },
                        {
                            "type": "chart",
                            "section": "Market Overview",
                            "description": "image detected",
                            "chart_data": null
                        }
                    ]
                },
                {"page_number": 2, "content": []}
            ]
        })
    );
}

#[test]
fn test_pretty_and_compact_carry_same_data() {
    let doc = sample();
    let pretty: serde_json::Value =
        serde_json::from_str(&to_json(&doc, JsonFormat::Pretty).unwrap()).unwrap();
    let compact: serde_json::Value =
        serde_json::from_str(&to_json(&doc, JsonFormat::Compact).unwrap()).unwrap();
    assert_eq!(pretty, compact);
}

#[test]
fn test_document_round_trips_through_json() {
    let doc = sample();
    let json = to_json(&doc, JsonFormat::Compact).unwrap();
    let back: Document = serde_json::from_str(&json).unwrap();
    assert_eq!(back, doc);
}
