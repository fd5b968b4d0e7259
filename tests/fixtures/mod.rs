#![allow(dead_code)]

use std::path::PathBuf;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use pii_redact::types::{NativeWord, OcrPage, OcrWord};

pub const PAGE_HEIGHT: f64 = 792.0;

pub struct TestFixtures;

impl TestFixtures {
    /// Letter pages with one Helvetica line each; an empty string gives a page
    /// without a text layer.
    pub fn text_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });

        let mut kids = Vec::new();
        for text in pages {
            let operations = if text.is_empty() {
                vec![]
            } else {
                vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 690.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ]
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, Content { operations }.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            });
            kids.push(Object::Reference(page_id));
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => kids.len() as i64,
                "Kids" => kids,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    /// Pages with no text layer, as a scanner would produce
    pub fn scanned_pdf(pages: usize) -> Vec<u8> {
        Self::text_pdf(&vec![""; pages])
    }

    pub fn malformed_pdf() -> Vec<u8> {
        b"This is not a valid PDF file".to_vec()
    }

    /// Words on one line, `top`/`bottom` measured from the top of the page
    pub fn native_line(words: &[(&str, f64, f64)], top: f64, bottom: f64) -> Vec<NativeWord> {
        words
            .iter()
            .map(|(text, x0, x1)| NativeWord {
                text: text.to_string(),
                x0: *x0,
                x1: *x1,
                top,
                bottom,
                page_height: PAGE_HEIGHT,
            })
            .collect()
    }

    /// One OCR page; words are `(text, x, y, w, h)` in pixels
    pub fn ocr_page(width_px: u32, height_px: u32, words: &[(&str, f64, f64, f64, f64)]) -> OcrPage {
        OcrPage {
            text: words.iter().map(|w| w.0).collect::<Vec<_>>().join(" "),
            width_px,
            height_px,
            words: words
                .iter()
                .map(|(text, x, y, w, h)| OcrWord {
                    text: text.to_string(),
                    x: *x,
                    y: *y,
                    w: *w,
                    h: *h,
                })
                .collect(),
        }
    }

    /// Fresh path under the system temp directory
    pub fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("pii_redact_{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    /// Writes `bytes` to a fresh temp file called `name`.
    pub fn write_temp(name: &str, bytes: &[u8]) -> PathBuf {
        let path = Self::temp_path(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, bytes).unwrap();
        path
    }

    pub fn cleanup(path: &std::path::Path) {
        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}
