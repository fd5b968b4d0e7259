//! Coordinate Normalizer for the OCR path
//!
//! OCR boxes live in image pixel space with the origin at the top-left.
//! PDF points put the origin at the bottom-left, so the vertical axis is
//! flipped while scaling.

use crate::types::{PageGeometry, Rect};

/// Per-page pixel to point scale factors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    pub sx: f64,
    pub sy: f64,
}

impl ScaleFactors {
    /// Zero-sized images are clamped to one pixel.
    pub fn new(image_width_px: u32, image_height_px: u32, page: PageGeometry) -> Self {
        Self {
            sx: page.width_pts / f64::from(image_width_px.max(1)),
            sy: page.height_pts / f64::from(image_height_px.max(1)),
        }
    }
}

/// Maps pixel-space rectangles of one rendered page into point space
#[derive(Debug, Clone, Copy)]
pub struct CoordinateNormalizer {
    scale: ScaleFactors,
    page: PageGeometry,
}

impl CoordinateNormalizer {
    pub fn new(image_width_px: u32, image_height_px: u32, page: PageGeometry) -> Self {
        Self {
            scale: ScaleFactors::new(image_width_px, image_height_px, page),
            page,
        }
    }

    /// Converts a pixel rectangle (`y0` = top edge, `y1` = bottom edge).
    ///
    /// Call this on the union box of a matched run, not on single tokens.
    pub fn to_points(&self, pixel: &Rect) -> Rect {
        let ScaleFactors { sx, sy } = self.scale;
        let h = self.page.height_pts;
        // bottom pixel edge lands on the lower point-space y
        Rect::new(pixel.x0 * sx, h - pixel.y1 * sy, pixel.x1 * sx, h - pixel.y0 * sy)
    }
}
