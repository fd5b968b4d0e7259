//! Token types produced by the native-text and OCR extractors

use serde::{Deserialize, Serialize};

use super::geometry::Rect;

/// A single recognized word with page-relative geometry.
///
/// The coordinate space of `bbox` depends on where the token came from:
/// native tokens are already in point space, OCR tokens are in pixel space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub bbox: Rect,
    pub page_index: usize,
}

impl Token {
    pub fn new(text: impl Into<String>, bbox: Rect, page_index: usize) -> Self {
        Self {
            text: text.into(),
            bbox,
            page_index,
        }
    }
}

/// Word as reported by a PDF layout extractor.
///
/// `top` and `bottom` are measured from the top edge of the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeWord {
    pub text: String,
    pub x0: f64,
    pub x1: f64,
    pub top: f64,
    pub bottom: f64,
    #[serde(alias = "_page_height")]
    pub page_height: f64,
}

impl NativeWord {
    /// Converts to a point-space token, flipping the vertical axis.
    pub fn to_token(&self, page_index: usize) -> Token {
        let bbox = Rect::new(
            self.x0,
            self.page_height - self.bottom,
            self.x1,
            self.page_height - self.top,
        );
        Token::new(self.text.clone(), bbox, page_index)
    }
}

/// Word recognized on a rendered page image, pixel units, origin top-left
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrWord {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl OcrWord {
    /// Pixel-space token; `y0` is the top edge and `y1` the bottom edge.
    pub fn to_token(&self, page_index: usize) -> Token {
        let bbox = Rect::new(self.x, self.y, self.x + self.w, self.y + self.h);
        Token::new(self.text.clone(), bbox, page_index)
    }
}

/// OCR result for one rendered page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrPage {
    #[serde(default)]
    pub text: String,
    pub width_px: u32,
    pub height_px: u32,
    #[serde(default)]
    pub words: Vec<OcrWord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_word_flips_vertical_axis() {
        let word = NativeWord {
            text: "John".into(),
            x0: 100.0,
            x1: 130.0,
            top: 40.0,
            bottom: 52.0,
            page_height: 792.0,
        };
        let token = word.to_token(0);
        assert_eq!(token.bbox, Rect::new(100.0, 740.0, 130.0, 752.0));
    }

    #[test]
    fn test_native_word_accepts_layout_dump_field_name() {
        let json = r#"{"text":"Doe","x0":1,"x1":2,"top":3,"bottom":4,"_page_height":792}"#;
        let word: NativeWord = serde_json::from_str(json).unwrap();
        assert_eq!(word.page_height, 792.0);
    }

    #[test]
    fn test_ocr_page_defaults() {
        let page: OcrPage = serde_json::from_str(r#"{"width_px":200,"height_px":100}"#).unwrap();
        assert!(page.words.is_empty());
        assert!(page.text.is_empty());
    }
}
