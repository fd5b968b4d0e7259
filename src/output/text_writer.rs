//! Rebuilds plain page text as a simple Letter-sized PDF
//!
//! Each input page starts a new output page; long pages overflow onto
//! continuation pages. Text is set in Helvetica with WinAnsi encoding.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use tracing::{debug, instrument};

use crate::config::TextLayoutConfig;
use crate::error::{OverlayError, Result};

const FONT_RESOURCE: &str = "F1";

/// A line of text placed at baseline `y`
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub y: f64,
    pub text: String,
}

/// Lays out `pages` into output pages of placed lines.
///
/// Blank lines only advance the cursor. A line is moved to a fresh page when
/// the cursor has dropped below the bottom margin. The result always holds at
/// least one page.
pub fn layout_pages<S: AsRef<str>>(pages: &[S], layout: &TextLayoutConfig) -> Vec<Vec<PlacedLine>> {
    let top = layout.page_height - layout.margin;
    let mut out = Vec::new();

    for page in pages {
        let mut current = Vec::new();
        let mut y = top;
        for raw in page.as_ref().lines() {
            let line = raw.trim();
            if line.is_empty() {
                y -= layout.line_height;
                continue;
            }
            if y < layout.margin {
                out.push(std::mem::take(&mut current));
                y = top;
            }
            current.push(PlacedLine {
                y,
                text: line.chars().take(layout.max_line_chars).collect(),
            });
            y -= layout.line_height;
        }
        out.push(current);
    }

    if out.is_empty() {
        out.push(Vec::new());
    }
    out
}

/// Writes `pages` as a PDF and returns its bytes.
#[instrument(skip_all, fields(pages = pages.len()))]
pub fn write_text_pdf<S: AsRef<str>>(pages: &[S], layout: &TextLayoutConfig) -> Result<Vec<u8>> {
    let laid_out = layout_pages(pages, layout);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { FONT_RESOURCE => font_id },
    });

    let mut kids = Vec::with_capacity(laid_out.len());
    for lines in &laid_out {
        let mut operations = Vec::with_capacity(lines.len() * 5);
        for line in lines {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new(
                "Tf",
                vec![FONT_RESOURCE.into(), Object::Real(layout.font_size as f32)],
            ));
            operations.push(Operation::new(
                "Td",
                vec![Object::Real(layout.margin as f32), Object::Real(line.y as f32)],
            ));
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(&line.text), StringFormat::Literal)],
            ));
            operations.push(Operation::new("ET", vec![]));
        }
        let content = Content { operations }
            .encode()
            .map_err(|e| OverlayError::Encoding(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => laid_out.len() as i64,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                Object::Real(layout.page_width as f32),
                Object::Real(layout.page_height as f32),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    debug!("Rebuilt {} input page(s) into {} PDF page(s)", pages.len(), laid_out.len());
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

/// Encodes `text` for a WinAnsi Type1 font.
///
/// The blackout glyph becomes `X`; anything else outside the encoding
/// becomes `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '█' => b'X',
            '\t' => b' ',
            ' '..='~' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_step_down_from_top_margin() {
        let layout = TextLayoutConfig::default();
        let pages = layout_pages(&["first\n\nthird"], &layout);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0][0], PlacedLine { y: 742.0, text: "first".into() });
        assert_eq!(pages[0][1].y, 742.0 - 28.0);
    }

    #[test]
    fn test_each_input_page_starts_fresh() {
        let layout = TextLayoutConfig::default();
        let pages = layout_pages(&["a", "b", ""], &layout);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[1][0].y, 742.0);
        assert!(pages[2].is_empty());
    }

    #[test]
    fn test_overflow_continues_on_new_page() {
        let layout = TextLayoutConfig::default();
        let text = (0..100).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let pages = layout_pages(&[text], &layout);
        assert!(pages.len() > 1);
        assert!(pages.iter().flatten().all(|l| l.y >= layout.margin - layout.line_height));
        assert_eq!(pages.iter().map(Vec::len).sum::<usize>(), 100);
        assert_eq!(pages[1][0].y, 742.0);
    }

    #[test]
    fn test_long_lines_are_truncated() {
        let layout = TextLayoutConfig {
            max_line_chars: 5,
            ..TextLayoutConfig::default()
        };
        let pages = layout_pages(&["abcdefghij"], &layout);
        assert_eq!(pages[0][0].text, "abcde");
    }

    #[test]
    fn test_win_ansi_substitutions() {
        assert_eq!(encode_win_ansi("ab█"), b"abX".to_vec());
        assert_eq!(encode_win_ansi("café"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(encode_win_ansi("日"), b"?".to_vec());
        assert_eq!(encode_win_ansi("<PERSON_1>"), b"<PERSON_1>".to_vec());
    }

    #[test]
    fn test_written_pdf_is_readable() {
        let bytes = write_text_pdf(&["Hello <PERSON_1>", "Second page"], &TextLayoutConfig::default()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
        let text = doc.extract_text(&[1]).unwrap();
        assert!(text.contains("Hello <PERSON_1>"));
    }

    #[test]
    fn test_no_pages_still_writes_one() {
        let empty: [&str; 0] = [];
        let bytes = write_text_pdf(&empty, &TextLayoutConfig::default()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }
}
