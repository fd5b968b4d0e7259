//! Sequence Box Locator
//!
//! Finds contiguous token runs whose normalized, space-joined text equals a
//! normalized target phrase and reports the bounding box of each run.

pub mod normalizer;

pub use normalizer::{CoordinateNormalizer, ScaleFactors};

use tracing::trace;

use crate::types::{Rect, Token};

/// Lower-cases and collapses every whitespace run to a single space.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Locates every occurrence of `target` in one page's token sequence.
///
/// Boxes are returned in whatever coordinate space the tokens use.
pub fn locate(tokens: &[Token], target: &str) -> Vec<Rect> {
    let target_norm = normalize(target);
    if tokens.is_empty() || target_norm.is_empty() {
        return Vec::new();
    }

    let normalized: Vec<String> = tokens.iter().map(|t| normalize(&t.text)).collect();
    locate_normalized(tokens, &normalized, &target_norm)
}

/// Locates several targets on one page, normalizing the tokens only once.
/// Repeated targets are searched once.
pub fn locate_all<S: AsRef<str>>(tokens: &[Token], targets: &[S]) -> Vec<Rect> {
    if tokens.is_empty() || targets.is_empty() {
        return Vec::new();
    }

    let normalized: Vec<String> = tokens.iter().map(|t| normalize(&t.text)).collect();
    let mut seen: Vec<String> = Vec::new();
    let mut rects = Vec::new();

    for target in targets {
        let target_norm = normalize(target.as_ref());
        if target_norm.is_empty() || seen.contains(&target_norm) {
            continue;
        }
        rects.extend(locate_normalized(tokens, &normalized, &target_norm));
        seen.push(target_norm);
    }
    rects
}

fn locate_normalized(tokens: &[Token], normalized: &[String], target_norm: &str) -> Vec<Rect> {
    let mut boxes = Vec::new();
    let n = normalized.len();

    for i in 0..n {
        let mut buf = String::new();
        for j in i..n {
            if buf.is_empty() {
                buf.push_str(&normalized[j]);
            } else if !normalized[j].is_empty() {
                buf.push(' ');
                buf.push_str(&normalized[j]);
            }

            if buf == target_norm {
                if let Some(rect) = Rect::union_all(tokens[i..=j].iter().map(|t| &t.bbox)) {
                    boxes.push(rect);
                }
                break;
            }
            // The accumulated text never shrinks.
            if buf.len() > target_norm.len() {
                break;
            }
        }
    }

    if boxes.is_empty() {
        trace!("No token run matches {:?}", target_norm);
    }
    boxes
}
