//! Page geometry primitives
//!
//! Rectangles are stored as `(x0, y0, x1, y1)` in a single coordinate space
//! per use. After normalization everything is PDF point space with the
//! origin at the bottom-left corner of the page.

use serde::{Deserialize, Serialize};

/// US Letter width in points
pub const LETTER_WIDTH_PTS: f64 = 612.0;
/// US Letter height in points
pub const LETTER_HEIGHT_PTS: f64 = 792.0;

/// Axis-aligned rectangle, `x0 <= x1` and `y0 <= y1`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    /// Builds a rectangle from two corners in any order.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// True when the rectangle covers no area
    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Smallest rectangle containing both `self` and `other`
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Union of every rectangle in the iterator, `None` when it is empty
    pub fn union_all<'a, I>(rects: I) -> Option<Rect>
    where
        I: IntoIterator<Item = &'a Rect>,
    {
        rects.into_iter().fold(None, |acc, r| match acc {
            None => Some(*r),
            Some(u) => Some(u.union(r)),
        })
    }
}

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width_pts: f64,
    pub height_pts: f64,
}

impl PageGeometry {
    pub fn new(width_pts: f64, height_pts: f64) -> Self {
        Self {
            width_pts,
            height_pts,
        }
    }

    pub fn letter() -> Self {
        Self::new(LETTER_WIDTH_PTS, LETTER_HEIGHT_PTS)
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::letter()
    }
}
