//! Content stream interpretation.
//!
//! Walks a page's decoded operations, tracking the graphics and text state
//! well enough to place text runs and image XObjects on the page. Positions
//! stay in PDF user space (origin bottom-left, y up); the extractors flip
//! them into page coordinates.

use std::collections::{HashMap, HashSet};

use crate::geometry::BoundingBox;

use super::backend::{BackendFontInfo, ContentOp, PdfValue};

/// Average glyph advance as a fraction of the font size, used when the
/// font's real widths are not consulted.
pub const AVG_GLYPH_WIDTH: f32 = 0.5;

/// TJ adjustments above this (in thousandths of an em) read as word breaks.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Segments leaning less than this off an axis count as horizontal or vertical.
const RULING_SLANT: f32 = 1.0;

/// Shorter segments are glyph-sized strokes or the ends of thin rectangles.
const MIN_RULING_LENGTH: f32 = 3.0;

/// A positioned run of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline)
    pub y: f32,
    /// Estimated advance width
    pub width: f32,
    /// Effective font size in points
    pub font_size: f32,
    /// Font name (e.g., "Helvetica-Bold")
    pub font_name: String,
    /// Whether the font appears to be bold
    pub bold: bool,
}

impl TextSpan {
    /// Create a span, estimating its width from the character count.
    pub fn new(
        text: impl Into<String>,
        x: f32,
        y: f32,
        font_size: f32,
        font_name: impl Into<String>,
    ) -> Self {
        let text = text.into();
        let font_name = font_name.into();
        let width = text.chars().count() as f32 * font_size * AVG_GLYPH_WIDTH;
        Self {
            bold: is_bold_font(&font_name),
            text,
            x,
            y,
            width,
            font_size,
            font_name,
        }
    }

    /// Approximate bottom edge (baseline minus descender).
    pub fn bottom(&self) -> f32 {
        self.y - self.font_size * 0.2
    }

    /// Approximate top edge (baseline plus ascender).
    pub fn top(&self) -> f32 {
        self.y + self.font_size * 0.8
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Extent in PDF user space.
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(self.x, self.bottom(), self.right(), self.top())
    }
}

/// An image XObject drawn on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePlacement {
    /// XObject resource name
    pub name: Vec<u8>,
    /// Extent in PDF user space
    pub bbox: BoundingBox,
}

/// A painted horizontal or vertical line segment.
///
/// Coordinates are in PDF user space with `x0 <= x1` and `y0 <= y1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ruling {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Ruling {
    /// Axis-aligned ruling between two points, or `None` for slanted or
    /// very short segments.
    pub fn between(a: (f32, f32), b: (f32, f32)) -> Option<Self> {
        let ruling = Self {
            x0: a.0.min(b.0),
            y0: a.1.min(b.1),
            x1: a.0.max(b.0),
            y1: a.1.max(b.1),
        };
        (ruling.is_horizontal() || ruling.is_vertical()).then_some(ruling)
    }

    pub fn is_horizontal(&self) -> bool {
        self.y1 - self.y0 <= RULING_SLANT && self.x1 - self.x0 >= MIN_RULING_LENGTH
    }

    pub fn is_vertical(&self) -> bool {
        self.x1 - self.x0 <= RULING_SLANT && self.y1 - self.y0 >= MIN_RULING_LENGTH
    }
}

/// Everything the interpreter found on a page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContent {
    /// Text runs in stream order
    pub spans: Vec<TextSpan>,
    /// Image placements in stream order
    pub images: Vec<ImagePlacement>,
    /// Stroked or filled axis-aligned segments
    pub rulings: Vec<Ruling>,
}

/// Path under construction, in user space.
#[derive(Debug, Default)]
struct PathBuilder {
    segments: Vec<((f32, f32), (f32, f32))>,
    current: Option<(f32, f32)>,
    start: Option<(f32, f32)>,
}

impl PathBuilder {
    fn move_to(&mut self, p: (f32, f32)) {
        self.current = Some(p);
        self.start = Some(p);
    }

    fn line_to(&mut self, p: (f32, f32)) {
        if let Some(from) = self.current {
            self.segments.push((from, p));
        }
        self.current = Some(p);
    }

    fn close(&mut self) {
        if let Some(start) = self.start {
            self.line_to(start);
        }
    }

    fn rect(&mut self, corners: [(f32, f32); 4]) {
        self.move_to(corners[0]);
        for &corner in &corners[1..] {
            self.line_to(corner);
        }
        self.close();
    }

    /// Finish the path, returning its rulings when it was painted.
    fn finish(&mut self, painted: bool) -> Vec<Ruling> {
        let segments = std::mem::take(&mut self.segments);
        self.current = None;
        self.start = None;
        if !painted {
            return Vec::new();
        }
        segments
            .into_iter()
            .filter_map(|(a, b)| Ruling::between(a, b))
            .collect()
    }
}

/// Maps PDF user space onto top-down page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFrame {
    left: f32,
    top: f32,
}

impl PageFrame {
    /// Frame for a page's MediaBox `[x0, y0, x1, y1]`.
    pub fn from_media_box(media_box: [f32; 4]) -> Self {
        Self {
            left: media_box[0],
            top: media_box[3],
        }
    }

    /// Convert a user-space box (y up) into page coordinates (y down).
    pub fn to_page(&self, bbox: &BoundingBox) -> BoundingBox {
        BoundingBox::new(
            bbox.x0 - self.left,
            self.top - bbox.y1,
            bbox.x1 - self.left,
            self.top - bbox.y0,
        )
    }
}

/// Affine transform `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn from_op(op: &ContentOp) -> Self {
        Self {
            a: op.number(0, 1.0),
            b: op.number(1, 0.0),
            c: op.number(2, 0.0),
            d: op.number(3, 1.0),
            e: op.number(4, 0.0),
            f: op.number(5, 0.0),
        }
    }

    fn translation(tx: f32, ty: f32) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    /// `self` applied first, then `other`.
    fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }

    fn horizontal_scale(&self) -> f32 {
        self.a.hypot(self.b)
    }

    fn vertical_scale(&self) -> f32 {
        self.c.hypot(self.d)
    }
}

#[derive(Debug, Clone)]
struct TextState {
    matrix: Matrix,
    line_matrix: Matrix,
    font_key: Vec<u8>,
    font_name: String,
    font_size: f32,
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            font_key: Vec::new(),
            font_name: String::new(),
            font_size: 12.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translation(tx, ty).then(&self.line_matrix);
        self.matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        // Producers that never set TL still use T*; fall back to 1.2em.
        let leading = if self.leading != 0.0 {
            self.leading
        } else {
            self.font_size * 1.2
        };
        self.move_line(0.0, -leading);
    }
}

/// Interprets content stream operations for one page.
///
/// `decode` turns a string operand into text given the font resource name,
/// which lets the caller apply the page's font encodings.
pub struct ContentInterpreter<F> {
    fonts: HashMap<Vec<u8>, String>,
    images: HashSet<Vec<u8>>,
    decode: F,
}

impl<F> ContentInterpreter<F>
where
    F: Fn(&[u8], &[u8]) -> String,
{
    /// Create an interpreter with no fonts or images registered.
    pub fn new(decode: F) -> Self {
        Self {
            fonts: HashMap::new(),
            images: HashSet::new(),
            decode,
        }
    }

    /// Register the page's fonts so spans carry base font names.
    pub fn with_fonts(mut self, fonts: impl IntoIterator<Item = BackendFontInfo>) -> Self {
        self.fonts
            .extend(fonts.into_iter().map(|f| (f.name, f.base_font)));
        self
    }

    /// Register the XObject names that are images.
    pub fn with_images(mut self, names: impl IntoIterator<Item = Vec<u8>>) -> Self {
        self.images.extend(names);
        self
    }

    /// Run the operations and collect text spans and image placements.
    pub fn run(&self, ops: &[ContentOp]) -> PageContent {
        let mut content = PageContent::default();
        let mut ctm = Matrix::IDENTITY;
        let mut stack: Vec<Matrix> = Vec::new();
        let mut text = TextState::default();
        let mut in_text = false;
        let mut path = PathBuilder::default();

        for op in ops {
            match op.operator.as_str() {
                "q" => stack.push(ctm),
                "Q" => {
                    if let Some(saved) = stack.pop() {
                        ctm = saved;
                    }
                }
                "cm" => {
                    if op.operands.len() >= 6 {
                        ctm = Matrix::from_op(op).then(&ctm);
                    }
                }
                "BT" => {
                    in_text = true;
                    text.matrix = Matrix::IDENTITY;
                    text.line_matrix = Matrix::IDENTITY;
                }
                "ET" => in_text = false,
                "Tf" => {
                    if let Some(PdfValue::Name(key)) = op.operands.first() {
                        text.font_name = self
                            .fonts
                            .get(key)
                            .cloned()
                            .unwrap_or_else(|| String::from_utf8_lossy(key).to_string());
                        text.font_key = key.clone();
                    }
                    text.font_size = op.number(1, 12.0);
                }
                "TL" => text.leading = op.number(0, 0.0),
                "Td" => text.move_line(op.number(0, 0.0), op.number(1, 0.0)),
                "TD" => {
                    let ty = op.number(1, 0.0);
                    text.leading = -ty;
                    text.move_line(op.number(0, 0.0), ty);
                }
                "Tm" => {
                    if op.operands.len() >= 6 {
                        text.line_matrix = Matrix::from_op(op);
                        text.matrix = text.line_matrix;
                    }
                }
                "T*" => text.next_line(),
                "Tj" | "TJ" | "'" | "\"" if in_text => {
                    let operand = match op.operator.as_str() {
                        "'" => {
                            text.next_line();
                            op.operands.first()
                        }
                        "\"" => {
                            text.next_line();
                            op.operands.get(2)
                        }
                        _ => op.operands.first(),
                    };
                    if let Some(operand) = operand {
                        self.show(operand, &mut text, &ctm, &mut content.spans);
                    }
                }
                "m" => path.move_to(ctm.apply(op.number(0, 0.0), op.number(1, 0.0))),
                "l" => path.line_to(ctm.apply(op.number(0, 0.0), op.number(1, 0.0))),
                "c" => path.current = Some(ctm.apply(op.number(4, 0.0), op.number(5, 0.0))),
                "v" | "y" => path.current = Some(ctm.apply(op.number(2, 0.0), op.number(3, 0.0))),
                "h" => path.close(),
                "re" => {
                    let (x, y) = (op.number(0, 0.0), op.number(1, 0.0));
                    let (w, h) = (op.number(2, 0.0), op.number(3, 0.0));
                    path.rect([
                        ctm.apply(x, y),
                        ctm.apply(x + w, y),
                        ctm.apply(x + w, y + h),
                        ctm.apply(x, y + h),
                    ]);
                }
                "S" | "s" | "f" | "F" | "f*" | "B" | "B*" | "b" | "b*" => {
                    content.rulings.extend(path.finish(true));
                }
                "n" => {
                    path.finish(false);
                }
                "Do" => {
                    if let Some(PdfValue::Name(name)) = op.operands.first() {
                        if self.images.contains(name) {
                            content.images.push(ImagePlacement {
                                name: name.clone(),
                                bbox: unit_square(&ctm),
                            });
                        }
                    }
                }
                _ => {}
            }
        }

        content
    }

    /// Show a string or TJ array and advance the text matrix.
    fn show(
        &self,
        operand: &PdfValue,
        text: &mut TextState,
        ctm: &Matrix,
        spans: &mut Vec<TextSpan>,
    ) {
        let size = text.font_size;
        let (decoded, advance) = match operand {
            PdfValue::Str(bytes) => {
                let s = (self.decode)(&text.font_key, bytes);
                let advance = s.chars().count() as f32 * size * AVG_GLYPH_WIDTH;
                (s, advance)
            }
            PdfValue::Array(items) => {
                let mut combined = String::new();
                let mut advance = 0.0;
                for item in items {
                    match item {
                        PdfValue::Str(bytes) => {
                            let s = (self.decode)(&text.font_key, bytes);
                            advance += s.chars().count() as f32 * size * AVG_GLYPH_WIDTH;
                            combined.push_str(&s);
                        }
                        other => {
                            let Some(n) = other.as_number() else { continue };
                            advance -= n / 1000.0 * size;
                            if -n > TJ_SPACE_THRESHOLD
                                && !combined.ends_with([' ', '\u{00A0}'])
                                && combined
                                    .chars()
                                    .last()
                                    .is_some_and(|c| !is_spaceless_script_char(c))
                            {
                                combined.push(' ');
                            }
                        }
                    }
                }
                (combined, advance)
            }
            _ => return,
        };

        let render = text.matrix.then(ctm);
        if !decoded.trim().is_empty() {
            let (x, y) = render.apply(0.0, 0.0);
            let effective_size = size * render.vertical_scale();
            let mut span = TextSpan::new(decoded, x, y, effective_size, text.font_name.clone());
            // Kerning can cancel the whole advance; keep the estimated width then.
            if advance > 0.0 {
                span.width = advance * render.horizontal_scale();
            }
            spans.push(span);
        }

        text.matrix = Matrix::translation(advance, 0.0).then(&text.matrix);
    }
}

/// Bounding box of the unit square under `m`, which is where an image
/// XObject lands.
fn unit_square(m: &Matrix) -> BoundingBox {
    let corners = [m.apply(0.0, 0.0), m.apply(1.0, 0.0), m.apply(0.0, 1.0), m.apply(1.0, 1.0)];
    let (mut x0, mut y0) = corners[0];
    let (mut x1, mut y1) = corners[0];
    for &(x, y) in &corners[1..] {
        x0 = x0.min(x);
        y0 = y0.min(y);
        x1 = x1.max(x);
        y1 = y1.max(y);
    }
    BoundingBox::new(x0, y0, x1, y1)
}

/// Guess boldness from a font name.
pub fn is_bold_font(font_name: &str) -> bool {
    let lower = font_name.to_lowercase();
    lower.contains("bold") || lower.contains("black") || lower.contains("heavy")
}

/// Check if a character is from a script written without word spaces.
///
/// Chinese and Japanese don't use spaces between words; Korean does.
pub fn is_spaceless_script_char(c: char) -> bool {
    matches!(c as u32,
        0x4E00..=0x9FFF      // CJK Unified Ideographs
        | 0x3400..=0x4DBF    // Extension A
        | 0x20000..=0x2EBEF  // Extensions B-F
        | 0x3040..=0x309F    // Hiragana
        | 0x30A0..=0x30FF    // Katakana
        | 0x3000..=0x303F    // CJK Symbols and Punctuation
    )
}
