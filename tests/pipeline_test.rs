//! Integration tests for the layout pipeline, driven by synthetic primitives.

use structpdf::layout::SectionTracker;
use structpdf::model::{
    ContentItem, DocumentPrimitives, PagePrimitives, RawImageRegion, RawTableRegion, RawTextBlock,
};
use structpdf::{
    convert_primitives, to_json, BoundingBox, ConvertOptions, Error, JsonFormat, LayoutConfig,
    LayoutEngine,
};

fn text(page: u32, y: f32, content: &str, size: f32) -> RawTextBlock {
    RawTextBlock::new(
        page,
        content,
        BoundingBox::new(72.0, y, 540.0, y + size),
        size,
        false,
    )
}

fn table(page: u32, y0: f32, y1: f32, cells: &[&[&str]]) -> RawTableRegion {
    RawTableRegion::new(
        page,
        BoundingBox::new(72.0, y0, 540.0, y1),
        cells
            .iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect(),
    )
}

fn document(pages: Vec<PagePrimitives>) -> DocumentPrimitives {
    let mut doc = DocumentPrimitives::new();
    for page in pages {
        doc.add_page(page);
    }
    doc
}

/// A multi-page report exercising every item kind and heading level.
fn report(page_count: u32) -> DocumentPrimitives {
    let pages = (1..=page_count)
        .map(|n| {
            PagePrimitives::new(n)
                .with_text(text(n, 60.0, &format!("Chapter {}", n), 24.0))
                .with_text(text(n, 100.0, "Opening paragraph of the chapter.", 11.0))
                .with_text(text(n, 130.0, &format!("Part {}.1", n), 18.0))
                .with_text(text(n, 160.0, "Details follow in this paragraph.", 11.0))
                .with_table(table(n, 200.0, 260.0, &[&["Key", "Value"], &["a", "1"]]))
                .with_text(text(n, 210.0, "Key Value", 11.0))
                .with_image(RawImageRegion::new(
                    n,
                    BoundingBox::new(72.0, 300.0, 300.0, 450.0),
                ))
                .with_text(text(n, 480.0, "Closing remarks.", 11.0))
        })
        .collect();
    document(pages)
}

#[test]
fn test_introduction_body_scenario() {
    let doc = convert_primitives(&document(vec![PagePrimitives::new(1)
        .with_text(text(1, 72.0, "Introduction", 24.0))
        .with_text(text(1, 110.0, "Body text.", 12.0))]))
    .unwrap();

    assert_eq!(
        doc.pages[0].content,
        vec![
            ContentItem::heading(1, "Introduction"),
            ContentItem::paragraph("Body text.", Some("Introduction".into()), None),
        ]
    );
}

#[test]
fn test_table_passthrough_scenario() {
    let doc = convert_primitives(&document(vec![PagePrimitives::new(1).with_table(table(
        1,
        100.0,
        160.0,
        &[&["Year", "Revenue"], &["2022", "$10M"]],
    ))]))
    .unwrap();

    let json = to_json(&doc, JsonFormat::Compact).unwrap();
    assert_eq!(
        json,
        r#"{"pages":[{"page_number":1,"content":[{"type":"table","section":null,"description":null,"table_data":[["Year","Revenue"],["2022","$10M"]]}]}]}"#
    );
}

#[test]
fn test_empty_page_scenario() {
    let doc = convert_primitives(&document(vec![
        PagePrimitives::new(1).with_text(text(1, 72.0, "Only page one has text.", 12.0)),
        PagePrimitives::new(2),
    ]))
    .unwrap();

    assert_eq!(doc.page_count(), 2);
    assert!(doc.pages[1].content.is_empty());
}

#[test]
fn test_consecutive_level_one_headings() {
    let doc = convert_primitives(&document(vec![PagePrimitives::new(1)
        .with_text(text(1, 50.0, "First", 24.0))
        .with_text(text(1, 90.0, "Second", 24.0))
        .with_text(text(1, 130.0, "Body one.", 12.0))
        .with_text(text(1, 150.0, "Body two.", 12.0))]))
    .unwrap();

    let content = &doc.pages[0].content;
    assert_eq!(content[0], ContentItem::heading(1, "First"));
    assert_eq!(content[1], ContentItem::heading(1, "Second"));
    assert!(doc.items().all(|item| item.section() != Some("First")));
    assert_eq!(content[2].section(), Some("Second"));
}

#[test]
fn test_pages_are_contiguous() {
    let mut primitives = report(4);
    primitives.pages.reverse();

    let doc = convert_primitives(&primitives).unwrap();
    let numbers: Vec<u32> = doc.pages.iter().map(|p| p.page_number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
}

#[test]
fn test_gap_and_duplicate_rejected() {
    let gap = document(vec![PagePrimitives::new(1), PagePrimitives::new(3)]);
    assert!(matches!(convert_primitives(&gap), Err(Error::MissingPage(2))));

    let dup = document(vec![
        PagePrimitives::new(1),
        PagePrimitives::new(2),
        PagePrimitives::new(2),
    ]);
    assert!(matches!(
        convert_primitives(&dup),
        Err(Error::DuplicatePage(2))
    ));

    let zero = document(vec![PagePrimitives::new(0), PagePrimitives::new(1)]);
    assert!(matches!(
        convert_primitives(&zero),
        Err(Error::InvalidPageNumber(0))
    ));
}

#[test]
fn test_headings_carry_no_section() {
    let doc = convert_primitives(&report(3)).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&to_json(&doc, JsonFormat::Compact).unwrap()).unwrap();

    for page in json["pages"].as_array().unwrap() {
        for item in page["content"].as_array().unwrap() {
            if item["type"] == "heading" {
                assert!(item.get("section").is_none());
                assert!(item.get("sub_section").is_none());
            }
        }
    }
}

#[test]
fn test_stamps_match_tracker_replay() {
    let doc = convert_primitives(&report(3)).unwrap();

    let mut tracker = SectionTracker::new();
    for item in doc.items() {
        match item {
            ContentItem::Heading { level, text } => tracker.observe_heading(*level, text),
            ContentItem::Paragraph { .. } => {
                assert_eq!(item.section(), tracker.section());
                assert_eq!(item.sub_section(), tracker.sub_section());
            }
            ContentItem::Table { .. } | ContentItem::Chart { .. } => {
                assert_eq!(item.section(), tracker.section());
            }
        }
    }
}

#[test]
fn test_report_structure() {
    let doc = convert_primitives(&report(2)).unwrap();
    let page = &doc.pages[1];

    assert_eq!(page.content.len(), 7);
    assert_eq!(page.content[0], ContentItem::heading(1, "Chapter 2"));
    assert_eq!(page.content[2], ContentItem::heading(2, "Part 2.1"));
    assert_eq!(page.content[3].sub_section(), Some("Part 2.1"));
    assert_eq!(page.content[4].kind(), "table");
    assert_eq!(page.content[4].section(), Some("Chapter 2"));
    assert_eq!(
        page.content[5],
        ContentItem::chart("image detected", Some("Chapter 2".into()))
    );
    assert_eq!(
        page.content[6],
        ContentItem::paragraph(
            "Closing remarks.",
            Some("Chapter 2".into()),
            Some("Part 2.1".into())
        )
    );
}

#[test]
fn test_text_inside_table_never_a_paragraph() {
    let doc = convert_primitives(&report(2)).unwrap();
    assert!(doc.items().all(|item| !matches!(
        item,
        ContentItem::Paragraph { text, .. } if text == "Key Value"
    )));
}

#[test]
fn test_section_carries_across_pages() {
    let doc = convert_primitives(&document(vec![
        PagePrimitives::new(1)
            .with_text(text(1, 50.0, "Results", 24.0))
            .with_text(text(1, 90.0, "First page body.", 12.0)),
        PagePrimitives::new(2).with_text(text(2, 50.0, "Continued body.", 12.0)),
    ]))
    .unwrap();

    assert_eq!(doc.pages[1].content[0].section(), Some("Results"));
}

#[test]
fn test_idempotent_output() {
    let primitives = report(5);
    let first = to_json(&convert_primitives(&primitives).unwrap(), JsonFormat::Pretty).unwrap();
    let second = to_json(&convert_primitives(&primitives).unwrap(), JsonFormat::Pretty).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_parallel_matches_sequential() {
    let primitives = report(12);

    let sequential = LayoutEngine::new(ConvertOptions::new().sequential())
        .run(&primitives)
        .unwrap();
    let parallel = LayoutEngine::new(ConvertOptions::new().with_worker_threads(4))
        .run(&primitives)
        .unwrap();

    assert_eq!(
        to_json(&sequential, JsonFormat::Compact).unwrap(),
        to_json(&parallel, JsonFormat::Compact).unwrap()
    );
}

#[test]
fn test_input_order_does_not_matter() {
    let forward = report(3);
    let mut shuffled = forward.clone();
    for page in &mut shuffled.pages {
        page.text_blocks.reverse();
    }
    shuffled.pages.swap(0, 2);

    assert_eq!(
        convert_primitives(&forward).unwrap(),
        convert_primitives(&shuffled).unwrap()
    );
}

#[test]
fn test_invalid_geometry_fails_document() {
    let primitives = document(vec![PagePrimitives::new(1).with_text(RawTextBlock::new(
        1,
        "Broken",
        BoundingBox::new(100.0, 50.0, 10.0, 60.0),
        12.0,
        false,
    ))]);
    assert!(matches!(
        convert_primitives(&primitives),
        Err(Error::InvalidGeometry { .. })
    ));
}

#[test]
fn test_primitives_from_external_dump() {
    let json = r#"{
        "pages": [
            {
                "page_number": 1,
                "text_blocks": [
                    {"text": "Overview", "bbox": {"x0": 72, "y0": 60, "x1": 300, "y1": 84}, "font_size": 24, "page_number": 1},
                    {"text": "Summary text.", "bbox": {"x0": 72, "y0": 100, "x1": 540, "y1": 112}, "font_size": 12, "page_number": 1}
                ],
                "images": [
                    {"bbox": {"x0": 72, "y0": 150, "x1": 400, "y1": 400}, "ocr_text": "Revenue by quarter", "page_number": 1}
                ]
            }
        ]
    }"#;

    let doc = convert_primitives(&DocumentPrimitives::from_json(json).unwrap()).unwrap();
    assert_eq!(
        doc.pages[0].content,
        vec![
            ContentItem::heading(1, "Overview"),
            ContentItem::paragraph("Summary text.", Some("Overview".into()), None),
            ContentItem::chart("Revenue by quarter", Some("Overview".into())),
        ]
    );
}

#[test]
fn test_custom_placeholder_and_numbered_levels() {
    let layout = LayoutConfig::new()
        .with_image_placeholder("figure")
        .with_numbered_heading_levels(true);
    let engine = LayoutEngine::new(ConvertOptions::new().with_layout(layout));

    let doc = engine
        .run(&document(vec![PagePrimitives::new(1)
            .with_text(text(1, 50.0, "1 Scope", 20.0))
            .with_text(text(1, 80.0, "1.2 Terms", 20.0))
            .with_text(text(1, 110.0, "Defined terms.", 10.0))
            .with_text(text(1, 125.0, "Further terms.", 10.0))
            .with_text(text(1, 140.0, "Last terms.", 10.0))
            .with_image(RawImageRegion::new(
                1,
                BoundingBox::new(72.0, 160.0, 200.0, 240.0),
            ))]))
        .unwrap();

    let content = &doc.pages[0].content;
    assert_eq!(content[0], ContentItem::heading(1, "1 Scope"));
    assert_eq!(content[1], ContentItem::heading(2, "1.2 Terms"));
    assert_eq!(content[2].sub_section(), Some("1.2 Terms"));
    assert_eq!(
        content[5],
        ContentItem::chart("figure", Some("1 Scope".into()))
    );
}
