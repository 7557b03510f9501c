//! Table detection from text positions (stream mode).
//!
//! Tables are found from text alignment alone, without ruling lines: rows
//! come from shared baselines, columns from left edges that line up across
//! rows, and a table is a run of consecutive rows that fit the columns.
//! Ruled tables with irregular text are left to the lattice detector.

use std::collections::{BTreeMap, BTreeSet};

use crate::geometry::BoundingBox;
use crate::model::RawTableRegion;

use super::interpreter::{PageFrame, TextSpan};
use super::lattice::LatticeDetector;

/// Left edges within this many points share a column bucket.
const EDGE_BUCKET: f32 = 5.0;

/// A span is aligned when its left edge is this close to a column edge.
const ALIGN_TOLERANCE: f32 = 5.0;

/// A detected table region with its content.
#[derive(Debug, Clone)]
pub struct DetectedTable {
    /// Column left edges (X coordinates)
    pub columns: Vec<f32>,
    /// Rows of text spans, top to bottom
    pub rows: Vec<TableRowData>,
}

impl DetectedTable {
    /// Extent in PDF user space.
    pub fn bbox(&self) -> BoundingBox {
        let mut spans = self.rows.iter().flat_map(|r| r.spans.iter());
        let Some(first) = spans.next() else {
            return BoundingBox::new(0.0, 0.0, 0.0, 0.0);
        };
        spans.fold(first.bbox(), |acc, s| acc.union(&s.bbox()))
    }
}

/// A row of text spans in a table.
#[derive(Debug, Clone)]
pub struct TableRowData {
    /// Average baseline of this row
    pub y: f32,
    /// Spans in this row, sorted by X
    pub spans: Vec<TextSpan>,
}

/// Table detector configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDetectorConfig {
    /// Minimum number of rows to consider as table
    pub min_rows: usize,
    /// Minimum number of columns to consider as table
    pub min_columns: usize,
    /// Maximum number of columns (above this, likely word-level splitting)
    pub max_columns: usize,
    /// Y tolerance for grouping spans into rows (fraction of font size)
    pub y_tolerance_factor: f32,
    /// Minimum column alignment ratio (0.0-1.0)
    pub min_alignment_ratio: f32,
    /// Minimum gap between columns (points)
    pub min_column_gap: f32,
    /// Fall back to ruling lines when text alignment finds no table
    pub lattice: bool,
    /// Ruling lines closer than this (points) are treated as one
    pub snap_tolerance: f32,
}

impl TableDetectorConfig {
    /// Lattice detector sharing these row and column minimums.
    pub fn lattice_detector(&self) -> LatticeDetector {
        LatticeDetector::new(self.snap_tolerance, self.min_rows, self.min_columns)
    }
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_columns: 2,
            max_columns: 6,
            y_tolerance_factor: 0.4,
            min_alignment_ratio: 0.3,
            min_column_gap: 15.0,
            lattice: true,
            snap_tolerance: 3.0,
        }
    }
}

/// Detects tables in a page's text spans.
#[derive(Debug, Clone, Default)]
pub struct TableDetector {
    config: TableDetectorConfig,
}

impl TableDetector {
    /// Create a new table detector with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new table detector with custom configuration.
    pub fn with_config(config: TableDetectorConfig) -> Self {
        Self { config }
    }

    /// The detector's configuration.
    pub fn config(&self) -> &TableDetectorConfig {
        &self.config
    }

    /// Detect tables in the given spans.
    pub fn detect(&self, spans: &[TextSpan]) -> Vec<DetectedTable> {
        if spans.len() < self.config.min_rows * self.config.min_columns {
            return vec![];
        }

        let rows = self.group_into_rows(spans);
        if rows.len() < self.config.min_rows {
            return vec![];
        }

        let columns = self.detect_columns(&rows);
        log::debug!(
            "TableDetector: {} rows, column edges {:?}",
            rows.len(),
            columns
        );
        if columns.len() < self.config.min_columns {
            return vec![];
        }

        let mut tables = Vec::new();
        for (start, end) in self.find_table_regions(&rows, &columns) {
            let table_rows = rows[start..=end].to_vec();

            // Columns of this region alone, not the whole page
            let table_columns = self.detect_columns(&table_rows);
            if table_columns.len() < self.config.min_columns {
                continue;
            }
            if table_columns.len() > self.config.max_columns {
                log::debug!(
                    "TableDetector: skipping region, too many columns ({} > {})",
                    table_columns.len(),
                    self.config.max_columns
                );
                continue;
            }
            if is_list_pattern(&table_rows, &table_columns) {
                log::debug!("TableDetector: skipping region, looks like a list");
                continue;
            }

            tables.push(DetectedTable {
                columns: table_columns,
                rows: table_rows,
            });
        }

        tables
    }

    /// Convert a detected table into a page-coordinate region.
    pub fn to_region(
        &self,
        detected: &DetectedTable,
        frame: &PageFrame,
        page_number: u32,
    ) -> RawTableRegion {
        let columns = &detected.columns;
        let bbox = detected.bbox();

        let cells = detected
            .rows
            .iter()
            .map(|row| {
                let mut contents: Vec<Vec<&str>> = vec![Vec::new(); columns.len()];
                for span in &row.spans {
                    let col = find_column_for_span(span.x, columns, bbox.x1);
                    if let Some(cell) = contents.get_mut(col) {
                        cell.push(span.text.trim());
                    }
                }
                contents.into_iter().map(|parts| parts.join(" ")).collect()
            })
            .collect();

        RawTableRegion::new(page_number, frame.to_page(&bbox), cells)
    }

    /// Group spans into rows by Y position.
    fn group_into_rows(&self, spans: &[TextSpan]) -> Vec<TableRowData> {
        let mut sorted = spans.to_vec();
        sorted.sort_by(|a, b| b.y.total_cmp(&a.y).then_with(|| a.x.total_cmp(&b.x)));

        let mut rows: Vec<TableRowData> = Vec::new();
        let mut current: Vec<TextSpan> = Vec::new();
        let mut current_y: Option<f32> = None;

        for span in sorted {
            let tolerance = span.font_size * self.config.y_tolerance_factor;
            match current_y {
                Some(y) if (span.y - y).abs() <= tolerance => current.push(span),
                _ => {
                    if !current.is_empty() {
                        rows.push(make_row(std::mem::take(&mut current)));
                    }
                    current_y = Some(span.y);
                    current.push(span);
                }
            }
        }
        if !current.is_empty() {
            rows.push(make_row(current));
        }

        rows
    }

    /// Detect column edges from left edges that align across rows.
    ///
    /// Rows with several spans are the likely table rows; when too few exist
    /// every row is counted instead.
    fn detect_columns(&self, rows: &[TableRowData]) -> Vec<f32> {
        let multi: Vec<&TableRowData> = rows.iter().filter(|r| r.spans.len() >= 2).collect();
        let candidates: Vec<&TableRowData> = if multi.len() >= self.config.min_rows {
            multi
        } else {
            rows.iter().collect()
        };
        if candidates.is_empty() {
            return vec![];
        }

        // Each bucket counts once per row
        let mut edge_counts: BTreeMap<i32, usize> = BTreeMap::new();
        for row in &candidates {
            let buckets: BTreeSet<i32> = row
                .spans
                .iter()
                .map(|s| (s.x / EDGE_BUCKET).round() as i32)
                .collect();
            for bucket in buckets {
                *edge_counts.entry(bucket).or_insert(0) += 1;
            }
        }

        let min_occurrences =
            ((candidates.len() as f32 * self.config.min_alignment_ratio) as usize).max(2);

        let mut merged: Vec<f32> = Vec::new();
        for (bucket, count) in edge_counts {
            if count < min_occurrences {
                continue;
            }
            let edge = bucket as f32 * EDGE_BUCKET;
            match merged.last() {
                Some(&last) if edge - last < self.config.min_column_gap => {}
                _ => merged.push(edge),
            }
        }

        merged
    }

    /// Find runs of consecutive rows that align with the columns.
    fn find_table_regions(&self, rows: &[TableRowData], columns: &[f32]) -> Vec<(usize, usize)> {
        let mut regions = Vec::new();
        let mut start: Option<usize> = None;

        for (i, row) in rows.iter().enumerate() {
            if alignment_score(row, columns) >= self.config.min_alignment_ratio {
                start.get_or_insert(i);
                continue;
            }
            if let Some(s) = start.take() {
                if i - s >= self.config.min_rows {
                    regions.push((s, i - 1));
                }
            }
        }
        if let Some(s) = start {
            if rows.len() - s >= self.config.min_rows {
                regions.push((s, rows.len() - 1));
            }
        }

        regions
    }
}

fn make_row(spans: Vec<TextSpan>) -> TableRowData {
    let y = spans.iter().map(|s| s.y).sum::<f32>() / spans.len() as f32;
    TableRowData { y, spans }
}

/// Share of a row's spans that start on a column edge.
fn alignment_score(row: &TableRowData, columns: &[f32]) -> f32 {
    if row.spans.is_empty() || columns.is_empty() {
        return 0.0;
    }
    let aligned = row
        .spans
        .iter()
        .filter(|s| columns.iter().any(|c| (s.x - c).abs() <= ALIGN_TOLERANCE))
        .count();
    aligned as f32 / row.spans.len() as f32
}

/// Column index for a span's left edge.
fn find_column_for_span(span_x: f32, columns: &[f32], right_x: f32) -> usize {
    // Allow 10pt of slack before a column's start
    for (i, &start) in columns.iter().enumerate() {
        let end = columns.get(i + 1).copied().unwrap_or(right_x + 100.0);
        if span_x >= start - 10.0 && span_x < end - 10.0 {
            return i;
        }
    }

    columns
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (span_x - **a).abs().total_cmp(&(span_x - **b).abs()))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Check if aligned rows are really a numbered or bulleted list.
///
/// A list whose markers and item text are separate spans looks like a two
/// column table.
fn is_list_pattern(rows: &[TableRowData], columns: &[f32]) -> bool {
    if columns.len() < 2 || rows.is_empty() {
        return false;
    }

    let (mut bullets, mut numbers) = (0usize, 0usize);
    for row in rows {
        let Some(first) = row.spans.iter().min_by(|a, b| a.x.total_cmp(&b.x)) else {
            continue;
        };
        let marker = first.text.trim();
        if is_bullet_marker(marker) {
            bullets += 1;
        } else if is_number_marker(marker) {
            numbers += 1;
        }
    }

    let total = rows.len() as f32;
    // Bullets are almost never table data; numbered first columns can be,
    // so only two-column numbered runs are rejected.
    let bullet_ratio = bullets as f32 / total;
    let marker_ratio = (bullets + numbers) as f32 / total;
    bullet_ratio >= 0.5 || (columns.len() == 2 && marker_ratio >= 0.5)
}

/// Check if text is a bullet marker.
fn is_bullet_marker(text: &str) -> bool {
    matches!(
        text.trim(),
        "-" | "–" | "—" | "•" | "·" | "*" | "○" | "▪" | "◦" | "▸" | "►" | "■" | "●" | "□" | "◆" | "▶" | "➤"
    )
}

/// Check if text is a number-style marker (`1.`, `2)`, `a.`, bare `3`).
fn is_number_marker(text: &str) -> bool {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return false;
    }
    if cleaned.parse::<u32>().is_ok() {
        return true;
    }

    let Some(body) = cleaned.strip_suffix(|c: char| c == '.' || c == ')') else {
        return false;
    };
    (!body.is_empty() && body.chars().all(|c| c.is_ascii_digit()))
        || (body.chars().count() == 1 && body.chars().all(char::is_alphabetic))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_span(text: &str, x: f32, y: f32) -> TextSpan {
        TextSpan::new(text, x, y, 12.0, "Helvetica")
    }

    fn simple_table() -> Vec<TextSpan> {
        vec![
            make_span("Name", 10.0, 100.0),
            make_span("Age", 60.0, 100.0),
            make_span("Alice", 10.0, 85.0),
            make_span("30", 60.0, 85.0),
            make_span("Bob", 10.0, 70.0),
            make_span("25", 60.0, 70.0),
        ]
    }

    #[test]
    fn test_group_into_rows() {
        let detector = TableDetector::new();
        let rows = detector.group_into_rows(&simple_table());
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.spans.len() == 2));
        assert_eq!(rows[0].y, 100.0);
    }

    #[test]
    fn test_detect_simple_table() {
        let tables = TableDetector::new().detect(&simple_table());
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows.len(), 3);
        assert_eq!(tables[0].columns, vec![10.0, 60.0]);
    }

    #[test]
    fn test_to_region() {
        let detector = TableDetector::new();
        let tables = detector.detect(&simple_table());
        let frame = PageFrame::from_media_box([0.0, 0.0, 612.0, 792.0]);
        let region = detector.to_region(&tables[0], &frame, 4);

        assert_eq!(region.page_number, 4);
        assert_eq!(
            region.cells,
            vec![
                vec!["Name".to_string(), "Age".to_string()],
                vec!["Alice".to_string(), "30".to_string()],
                vec!["Bob".to_string(), "25".to_string()],
            ]
        );
        // Top row top edge: 100 + 0.8 * 12 = 109.6
        assert!((region.bbox.y0 - (792.0 - 109.6)).abs() < 0.01);
        assert!(region.bbox.is_valid());
    }

    #[test]
    fn test_no_table_single_column() {
        let spans = vec![
            make_span("Line 1", 10.0, 100.0),
            make_span("Line 2", 10.0, 85.0),
            make_span("Line 3", 10.0, 70.0),
        ];
        assert!(TableDetector::new().detect(&spans).is_empty());
    }

    #[test]
    fn test_numbered_list_not_detected_as_table() {
        let spans = vec![
            make_span("1.", 50.0, 400.0),
            make_span("Device settings", 80.0, 400.0),
            make_span("2.", 50.0, 370.0),
            make_span("Objects", 80.0, 370.0),
            make_span("3.", 50.0, 340.0),
            make_span("Routing policy", 80.0, 340.0),
        ];
        assert!(TableDetector::new().detect(&spans).is_empty());
    }

    #[test]
    fn test_bullet_list_not_detected_as_table() {
        let spans = vec![
            make_span("-", 50.0, 400.0),
            make_span("Management", 80.0, 400.0),
            make_span("-", 50.0, 370.0),
            make_span("Interface options", 80.0, 370.0),
            make_span("-", 50.0, 340.0),
            make_span("Firmware", 80.0, 340.0),
        ];
        assert!(TableDetector::new().detect(&spans).is_empty());
    }

    #[test]
    fn test_list_markers() {
        for marker in ["1.", "12.", "1)", "1 .", "3", "a.", "B)"] {
            assert!(is_number_marker(marker), "{marker}");
        }
        for marker in ["-", "•", "*", "–"] {
            assert!(is_bullet_marker(marker), "{marker}");
        }
        for text in ["Name", "Hello World", "Alice", "", "ab."] {
            assert!(!is_number_marker(text) && !is_bullet_marker(text), "{text}");
        }
    }
}
