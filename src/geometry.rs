//! Geometric primitives for layout analysis.
//!
//! All boxes live in page space with the origin at the top-left corner and
//! y growing downward, so `y0` is the top edge and `y1` the bottom edge.
//! Every measurement validates its inputs: a box with inverted or
//! non-finite edges is an extractor contract violation and surfaces as
//! [`Error::InvalidGeometry`].

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An axis-aligned rectangle on a page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BoundingBox {
    /// Create a box from its corner coordinates without validating it.
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Check that the box has finite edges with `x0 < x1` and `y0 < y1`.
    pub fn is_valid(&self) -> bool {
        [self.x0, self.y0, self.x1, self.y1]
            .iter()
            .all(|v| v.is_finite())
            && self.x0 < self.x1
            && self.y0 < self.y1
    }

    /// Return the box unchanged if well-formed, `InvalidGeometry` otherwise.
    pub fn validate(&self) -> Result<&Self> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(Error::InvalidGeometry {
                x0: self.x0,
                y0: self.y0,
                x1: self.x1,
                y1: self.y1,
            })
        }
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Area of the box.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Smallest box covering both boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox::new(
            self.x0.min(other.x0),
            self.y0.min(other.y0),
            self.x1.max(other.x1),
            self.y1.max(other.y1),
        )
    }

    /// Area shared by both boxes (zero when disjoint or merely touching).
    fn intersection_area(&self, other: &BoundingBox) -> f32 {
        let x_overlap = (self.x1.min(other.x1) - self.x0.max(other.x0)).max(0.0);
        let y_overlap = (self.y1.min(other.y1) - self.y0.max(other.y0)).max(0.0);
        x_overlap * y_overlap
    }
}

/// True iff the two boxes share a region of positive area.
pub fn overlaps(a: &BoundingBox, b: &BoundingBox) -> Result<bool> {
    a.validate()?;
    b.validate()?;
    Ok(a.intersection_area(b) > 0.0)
}

/// Fraction of `inner`'s area that lies inside `outer`, in `[0, 1]`.
pub fn containment_ratio(inner: &BoundingBox, outer: &BoundingBox) -> Result<f32> {
    inner.validate()?;
    outer.validate()?;
    let ratio = inner.intersection_area(outer) / inner.area();
    Ok(ratio.clamp(0.0, 1.0))
}

/// Signed distance from the bottom edge of `a` to the top edge of `b`.
///
/// Assumes `a` precedes `b` in reading order; a negative value means the
/// boxes overlap vertically.
pub fn vertical_gap(a: &BoundingBox, b: &BoundingBox) -> Result<f32> {
    a.validate()?;
    b.validate()?;
    Ok(b.y0 - a.y1)
}

/// Signed distance from the right edge of `a` to the left edge of `b`.
pub fn horizontal_gap(a: &BoundingBox, b: &BoundingBox) -> Result<f32> {
    a.validate()?;
    b.validate()?;
    Ok(b.x0 - a.x1)
}
