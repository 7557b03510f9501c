//! Table detection from ruling lines (lattice mode).
//!
//! Bordered tables are found from their grid: painted horizontal and
//! vertical segments are snapped and merged, segments that cross are
//! grouped into one grid, and the distinct line positions of a grid give
//! its row and column boundaries. Cell text comes from the spans whose
//! centers fall inside each cell.

use crate::geometry::BoundingBox;
use crate::model::RawTableRegion;

use super::interpreter::{PageFrame, Ruling, TextSpan};

/// A horizontal line at `pos` spanning `start..=end` (or vertical, with
/// the axes swapped).
#[derive(Debug, Clone, Copy, PartialEq)]
struct Edge {
    pos: f32,
    start: f32,
    end: f32,
}

/// A table recovered from a ruled grid, in PDF user space.
#[derive(Debug, Clone, PartialEq)]
pub struct LatticeTable {
    /// Grid extent
    pub bbox: BoundingBox,
    /// Cell text, top row first
    pub cells: Vec<Vec<String>>,
}

impl LatticeTable {
    /// Convert into a page-coordinate region.
    pub fn to_region(&self, frame: &PageFrame, page_number: u32) -> RawTableRegion {
        RawTableRegion::new(page_number, frame.to_page(&self.bbox), self.cells.clone())
    }
}

/// Detects ruled tables.
#[derive(Debug, Clone)]
pub struct LatticeDetector {
    snap_tolerance: f32,
    min_rows: usize,
    min_columns: usize,
}

impl Default for LatticeDetector {
    fn default() -> Self {
        Self::new(3.0, 2, 2)
    }
}

impl LatticeDetector {
    /// Create a detector. Lines closer than `snap_tolerance` points merge.
    pub fn new(snap_tolerance: f32, min_rows: usize, min_columns: usize) -> Self {
        Self {
            snap_tolerance,
            min_rows,
            min_columns,
        }
    }

    /// Find ruled tables, top of the page first.
    pub fn detect(&self, rulings: &[Ruling], spans: &[TextSpan]) -> Vec<LatticeTable> {
        let horizontal = self.merge_edges(
            rulings
                .iter()
                .filter(|r| r.is_horizontal())
                .map(|r| Edge {
                    pos: (r.y0 + r.y1) / 2.0,
                    start: r.x0,
                    end: r.x1,
                })
                .collect(),
        );
        let vertical = self.merge_edges(
            rulings
                .iter()
                .filter(|r| r.is_vertical())
                .map(|r| Edge {
                    pos: (r.x0 + r.x1) / 2.0,
                    start: r.y0,
                    end: r.y1,
                })
                .collect(),
        );
        if horizontal.len() <= self.min_rows || vertical.len() <= self.min_columns {
            return Vec::new();
        }

        let mut tables: Vec<LatticeTable> = self
            .grids(&horizontal, &vertical)
            .into_iter()
            .filter_map(|(rows, columns)| self.build_table(&rows, &columns, spans))
            .collect();
        tables.sort_by(|a, b| b.bbox.y1.total_cmp(&a.bbox.y1));

        log::debug!(
            "LatticeDetector: {} horizontal, {} vertical lines, {} tables",
            horizontal.len(),
            vertical.len(),
            tables.len()
        );
        tables
    }

    /// Snap collinear edges together and join the ones that touch.
    fn merge_edges(&self, mut edges: Vec<Edge>) -> Vec<Edge> {
        edges.sort_by(|a, b| a.pos.total_cmp(&b.pos).then(a.start.total_cmp(&b.start)));

        // Cluster by position first, then join overlapping runs per cluster
        let mut clusters: Vec<Vec<Edge>> = Vec::new();
        for edge in edges {
            let joins = clusters
                .last()
                .is_some_and(|c| edge.pos - c[0].pos <= self.snap_tolerance);
            match clusters.last_mut() {
                Some(cluster) if joins => cluster.push(edge),
                _ => clusters.push(vec![edge]),
            }
        }

        let mut merged = Vec::new();
        for mut cluster in clusters {
            let pos = cluster.iter().map(|e| e.pos).sum::<f32>() / cluster.len() as f32;
            cluster.sort_by(|a, b| a.start.total_cmp(&b.start));

            let mut run: Option<Edge> = None;
            for edge in cluster {
                run = match run {
                    Some(r) if edge.start <= r.end + self.snap_tolerance => Some(Edge {
                        end: r.end.max(edge.end),
                        ..r
                    }),
                    Some(r) => {
                        merged.push(r);
                        Some(Edge { pos, ..edge })
                    }
                    None => Some(Edge { pos, ..edge }),
                };
            }
            merged.extend(run);
        }
        merged
    }

    /// Group crossing edges into grids; returns each grid's row boundaries
    /// (top first) and column boundaries (left first).
    fn grids(&self, horizontal: &[Edge], vertical: &[Edge]) -> Vec<(Vec<f32>, Vec<f32>)> {
        let n = horizontal.len();
        let mut parent: Vec<usize> = (0..n + vertical.len()).collect();

        for (i, h) in horizontal.iter().enumerate() {
            for (j, v) in vertical.iter().enumerate() {
                if self.crosses(h, v) {
                    union(&mut parent, i, n + j);
                }
            }
        }

        let mut groups: std::collections::BTreeMap<usize, (Vec<f32>, Vec<f32>)> =
            std::collections::BTreeMap::new();
        for (i, h) in horizontal.iter().enumerate() {
            groups.entry(find(&mut parent, i)).or_default().0.push(h.pos);
        }
        for (j, v) in vertical.iter().enumerate() {
            groups.entry(find(&mut parent, n + j)).or_default().1.push(v.pos);
        }

        groups
            .into_values()
            .map(|(mut rows, mut columns)| {
                rows.sort_by(|a, b| b.total_cmp(a));
                rows.dedup_by(|a, b| (*a - *b).abs() <= self.snap_tolerance);
                columns.sort_by(|a, b| a.total_cmp(b));
                columns.dedup_by(|a, b| (*a - *b).abs() <= self.snap_tolerance);
                (rows, columns)
            })
            .collect()
    }

    fn crosses(&self, h: &Edge, v: &Edge) -> bool {
        let tol = self.snap_tolerance;
        (h.start - tol..=h.end + tol).contains(&v.pos)
            && (v.start - tol..=v.end + tol).contains(&h.pos)
    }

    fn build_table(
        &self,
        rows: &[f32],
        columns: &[f32],
        spans: &[TextSpan],
    ) -> Option<LatticeTable> {
        if rows.len() <= self.min_rows || columns.len() <= self.min_columns {
            return None;
        }

        let mut cells = vec![vec![Vec::<&TextSpan>::new(); columns.len() - 1]; rows.len() - 1];
        for span in spans {
            let cx = span.x + span.width / 2.0;
            let cy = (span.bottom() + span.top()) / 2.0;
            let row = rows.windows(2).position(|w| cy <= w[0] && cy > w[1]);
            let col = columns.windows(2).position(|w| cx >= w[0] && cx < w[1]);
            if let (Some(r), Some(c)) = (row, col) {
                cells[r][c].push(span);
            }
        }

        let cells: Vec<Vec<String>> = cells
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect();

        // An empty frame or a boxed paragraph is not a table
        let filled = cells.iter().flatten().filter(|c| !c.is_empty()).count();
        if filled < 2 {
            return None;
        }

        Some(LatticeTable {
            bbox: BoundingBox::new(
                columns[0],
                rows[rows.len() - 1],
                columns[columns.len() - 1],
                rows[0],
            ),
            cells,
        })
    }
}

/// Join a cell's spans in reading order.
fn cell_text(mut spans: Vec<&TextSpan>) -> String {
    spans.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));
    spans
        .iter()
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn find(parent: &mut [usize], i: usize) -> usize {
    let mut root = i;
    while parent[root] != root {
        root = parent[root];
    }
    let mut node = i;
    while parent[node] != root {
        let next = parent[node];
        parent[node] = root;
        node = next;
    }
    root
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let (ra, rb) = (find(parent, a), find(parent, b));
    if ra != rb {
        parent[rb] = ra;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hline(x0: f32, y: f32, x1: f32) -> Ruling {
        Ruling {
            x0,
            y0: y,
            x1,
            y1: y,
        }
    }

    fn vline(x: f32, y0: f32, y1: f32) -> Ruling {
        Ruling { x0: x, y0, x1: x, y1 }
    }

    fn span(text: &str, x: f32, y: f32) -> TextSpan {
        TextSpan::new(text, x, y, 10.0, "Helvetica")
    }

    /// Two rows, two columns:
    /// ```text
    /// (72,660)──(200,660)──(372,660)
    ///   │ Region  │  Sales      │
    /// (72,630)──(200,630)──(372,630)
    ///   │   North │     1200    │
    /// (72,600)──(200,600)──(372,600)
    /// ```
    fn grid() -> Vec<Ruling> {
        vec![
            hline(72.0, 660.0, 372.0),
            hline(72.0, 630.0, 372.0),
            hline(72.0, 600.0, 372.0),
            vline(72.0, 600.0, 660.0),
            vline(200.0, 600.0, 660.0),
            vline(372.0, 600.0, 660.0),
        ]
    }

    #[test]
    fn test_ruled_grid() {
        let spans = vec![
            span("Region", 80.0, 640.0),
            span("Sales", 230.0, 640.0),
            span("North", 100.0, 610.0),
            span("1200", 250.0, 610.0),
        ];
        let tables = LatticeDetector::default().detect(&grid(), &spans);

        assert_eq!(tables.len(), 1);
        assert_eq!(
            tables[0].cells,
            vec![
                vec!["Region".to_string(), "Sales".to_string()],
                vec!["North".to_string(), "1200".to_string()],
            ]
        );
        assert_eq!(tables[0].bbox, BoundingBox::new(72.0, 600.0, 372.0, 660.0));
    }

    #[test]
    fn test_broken_strokes_merge() {
        // Each horizontal line drawn as two pieces, one slightly off
        let mut rulings: Vec<Ruling> = grid()
            .into_iter()
            .filter(Ruling::is_vertical)
            .collect();
        for y in [660.0, 630.0, 600.0] {
            rulings.push(hline(72.0, y, 200.0));
            rulings.push(hline(200.0, y + 0.5, 372.0));
        }
        let spans = vec![span("a", 100.0, 640.0), span("b", 250.0, 610.0)];
        let tables = LatticeDetector::default().detect(&rulings, &spans);

        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].cells.len(), 2);
        assert_eq!(tables[0].cells[0], vec!["a".to_string(), String::new()]);
    }

    #[test]
    fn test_separate_grids() {
        let mut rulings = grid();
        // A second grid lower on the page
        rulings.extend(grid().into_iter().map(|r| Ruling {
            y0: r.y0 - 300.0,
            y1: r.y1 - 300.0,
            ..r
        }));
        let spans = vec![
            span("top", 100.0, 640.0),
            span("left", 250.0, 610.0),
            span("low", 100.0, 340.0),
            span("right", 250.0, 310.0),
        ];
        let tables = LatticeDetector::default().detect(&rulings, &spans);

        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].cells[0][0], "top");
        assert_eq!(tables[1].cells[0][0], "low");
    }

    #[test]
    fn test_boxed_paragraph_is_not_table() {
        let rulings = vec![
            hline(72.0, 700.0, 540.0),
            hline(72.0, 600.0, 540.0),
            vline(72.0, 600.0, 700.0),
            vline(540.0, 600.0, 700.0),
        ];
        let spans = vec![span("A framed note", 80.0, 650.0)];
        assert!(LatticeDetector::default().detect(&rulings, &spans).is_empty());
    }

    #[test]
    fn test_empty_grid_is_not_table() {
        assert!(LatticeDetector::default().detect(&grid(), &[]).is_empty());
    }
}
