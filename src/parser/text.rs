//! Text block reconstruction: spans → lines → blocks.
//!
//! Spans on one baseline form a line; consecutive lines with regular
//! spacing and matching typography form a block. Block boundaries follow
//! paragraph breaks, size changes (headings), weight changes and indents.

use crate::geometry::{horizontal_gap, BoundingBox};
use crate::model::RawTextBlock;

use super::interpreter::{is_spaceless_script_char, PageFrame, TextSpan, AVG_GLYPH_WIDTH};

/// A text line composed of spans on the same baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// The spans in this line, sorted by X position
    pub spans: Vec<TextSpan>,
    /// Y position (baseline)
    pub y: f32,
    /// Leftmost X position
    pub x: f32,
    /// Dominant font size in this line
    pub font_size: f32,
}

impl TextLine {
    /// Create a line from spans.
    pub fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        spans.sort_by(|a, b| a.x.total_cmp(&b.x));

        let total_chars: usize = spans.iter().map(|s| s.text.chars().count()).sum();
        let weighted: f32 = spans
            .iter()
            .map(|s| s.font_size * s.text.chars().count() as f32)
            .sum();
        let font_size = if total_chars > 0 {
            weighted / total_chars as f32
        } else {
            spans.first().map(|s| s.font_size).unwrap_or(0.0)
        };

        Self {
            y: spans.first().map(|s| s.y).unwrap_or(0.0),
            x: spans.first().map(|s| s.x).unwrap_or(0.0),
            font_size,
            spans,
        }
    }

    /// Combined text, with spaces inserted at visible gaps.
    ///
    /// No space goes between two characters of a spaceless script.
    pub fn text(&self) -> String {
        let mut result = String::new();

        for (i, span) in self.spans.iter().enumerate() {
            if i > 0 {
                let prev = &self.spans[i - 1];
                let gap = horizontal_gap(&prev.bbox(), &span.bbox()).unwrap_or(0.0);
                let char_width = span.font_size * AVG_GLYPH_WIDTH;

                let spaceless = prev.text.chars().last().is_some_and(is_spaceless_script_char)
                    && span.text.chars().next().is_some_and(is_spaceless_script_char);
                let has_space = prev.text.ends_with([' ', '\u{00A0}'])
                    || span.text.starts_with([' ', '\u{00A0}']);

                if gap > char_width * 0.2 && !spaceless && !has_space {
                    result.push(' ');
                }
            }
            result.push_str(&span.text);
        }

        result
    }

    /// Check if the line is predominantly bold.
    pub fn is_bold(&self) -> bool {
        let (bold, total) = self.spans.iter().fold((0, 0), |(b, t), s| {
            let n = s.text.chars().count();
            (if s.bold { b + n } else { b }, t + n)
        });
        total > 0 && bold * 2 > total
    }

    /// Extent in PDF user space.
    pub fn bbox(&self) -> BoundingBox {
        self.spans
            .iter()
            .map(TextSpan::bbox)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_else(|| BoundingBox::new(self.x, self.y, self.x, self.y))
    }
}

/// Group spans into lines by baseline, top of the page first.
pub fn group_into_lines(spans: &[TextSpan]) -> Vec<TextLine> {
    let mut spans = spans.to_vec();
    // PDF y grows upward, so descending y is top to bottom.
    spans.sort_by(|a, b| b.y.total_cmp(&a.y).then_with(|| a.x.total_cmp(&b.x)));

    let mut lines: Vec<TextLine> = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let tolerance = span.font_size * 0.3;
        match current_y {
            Some(y) if (span.y - y).abs() <= tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    lines.push(TextLine::from_spans(std::mem::take(&mut current)));
                }
                current_y = Some(span.y);
                current.push(span);
            }
        }
    }
    if !current.is_empty() {
        lines.push(TextLine::from_spans(current));
    }

    lines
}

/// Group lines into blocks.
pub fn group_into_blocks(lines: Vec<TextLine>) -> Vec<Vec<TextLine>> {
    let avg_spacing = average_line_spacing(&lines);
    let mut blocks: Vec<Vec<TextLine>> = Vec::new();
    let mut current: Vec<TextLine> = Vec::new();

    for line in lines {
        if let Some(prev) = current.last() {
            if should_break_block(prev, &line, avg_spacing) {
                blocks.push(std::mem::take(&mut current));
            }
        }
        current.push(line);
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

fn average_line_spacing(lines: &[TextLine]) -> f32 {
    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| (w[0].y - w[1].y).abs())
        .filter(|s| *s > 0.1)
        .collect();

    if spacings.is_empty() {
        return 12.0;
    }
    spacings.iter().sum::<f32>() / spacings.len() as f32
}

fn should_break_block(prev: &TextLine, curr: &TextLine, avg_spacing: f32) -> bool {
    let spacing = (prev.y - curr.y).abs();
    spacing > avg_spacing * 1.5
        || (prev.font_size - curr.font_size).abs() > 1.0
        || prev.is_bold() != curr.is_bold()
        || (prev.x - curr.x).abs() > 20.0
}

/// Build a page's text blocks in page coordinates.
pub fn build_text_blocks(
    spans: &[TextSpan],
    frame: &PageFrame,
    page_number: u32,
) -> Vec<RawTextBlock> {
    let lines = group_into_lines(spans);
    let blocks = group_into_blocks(lines);

    blocks
        .into_iter()
        .filter_map(|lines| {
            let text = lines
                .iter()
                .map(TextLine::text)
                .collect::<Vec<_>>()
                .join(" ");
            if text.trim().is_empty() {
                return None;
            }

            let bbox = lines
                .iter()
                .map(TextLine::bbox)
                .reduce(|a, b| a.union(&b))?;
            if !bbox.is_valid() {
                log::debug!(
                    "Page {}: dropping text block with degenerate box {:?}",
                    page_number,
                    bbox
                );
                return None;
            }

            let (weighted, chars, bold) =
                lines
                    .iter()
                    .flat_map(|l| l.spans.iter())
                    .fold((0.0f32, 0usize, 0usize), |(w, c, b), s| {
                        let n = s.text.chars().count();
                        (
                            w + s.font_size * n as f32,
                            c + n,
                            if s.bold { b + n } else { b },
                        )
                    });
            let font_size = if chars > 0 {
                weighted / chars as f32
            } else {
                lines[0].font_size
            };

            Some(RawTextBlock::new(
                page_number,
                text,
                frame.to_page(&bbox),
                font_size,
                chars > 0 && bold * 2 > chars,
            ))
        })
        .collect()
}
