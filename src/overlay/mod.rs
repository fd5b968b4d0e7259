//! Opaque overlay generation and compositing

pub mod merger;
pub mod synthesizer;

pub use merger::merge;
pub use synthesizer::synthesize;

use crate::error::Result;
use crate::types::{PageGeometry, Rect};

/// Synthesizes the overlay for `rects_per_page` and merges it onto `original`.
pub fn apply_overlay(
    original: &[u8],
    rects_per_page: &[Vec<Rect>],
    page_sizes: &[PageGeometry],
) -> Result<Vec<u8>> {
    let overlay = synthesize(rects_per_page, page_sizes)?;
    merge(original, &overlay)
}
