//! Overlay Synthesizer
//!
//! Builds a standalone PDF whose pages contain nothing but opaque black
//! rectangles, one page per original page size.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tracing::{debug, instrument};

use crate::error::{OverlayError, Result};
use crate::types::{PageGeometry, Rect};

/// Renders one filled rectangle per box, page by page.
///
/// Pairing is positional: rectangle sets beyond the page size list are
/// ignored, and pages without rectangles are emitted blank so page indices
/// stay aligned for the merge step.
#[instrument(skip_all, fields(pages = page_sizes.len()))]
pub fn synthesize(rects_per_page: &[Vec<Rect>], page_sizes: &[PageGeometry]) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::with_capacity(page_sizes.len());

    for (index, size) in page_sizes.iter().enumerate() {
        let rects = rects_per_page.get(index).map(Vec::as_slice).unwrap_or(&[]);
        let content = page_content(rects)?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(size.width_pts as f32),
                Object::Real(size.height_pts as f32),
            ],
            "Resources" => dictionary! {},
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
        debug!("Overlay page {}: {} rectangle(s)", index, rects.len());
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Count" => kids.len() as i64,
        "Kids" => kids,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

/// `0 0 0 rg` followed by `x y w h re f` for every box with area.
fn page_content(rects: &[Rect]) -> Result<Vec<u8>> {
    let mut operations = Vec::with_capacity(rects.len() * 2 + 1);
    operations.push(Operation::new(
        "rg",
        vec![Object::Integer(0), Object::Integer(0), Object::Integer(0)],
    ));

    for rect in rects.iter().filter(|r| !r.is_degenerate()) {
        operations.push(Operation::new(
            "re",
            vec![
                Object::Real(rect.x0 as f32),
                Object::Real(rect.y0 as f32),
                Object::Real(rect.width() as f32),
                Object::Real(rect.height() as f32),
            ],
        ));
        operations.push(Operation::new("f", vec![]));
    }

    Content { operations }
        .encode()
        .map_err(|e| OverlayError::Encoding(e.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_rects(doc: &Document, page_id: lopdf::ObjectId) -> Vec<Vec<f32>> {
        let data = doc.get_page_content(page_id).unwrap();
        let content = Content::decode(&data).unwrap();
        content
            .operations
            .iter()
            .filter(|op| op.operator == "re")
            .map(|op| op.operands.iter().map(|o| o.as_float().unwrap()).collect())
            .collect()
    }

    #[test]
    fn test_single_rect_on_letter_page() {
        let bytes = synthesize(
            &[vec![Rect::new(50.0, 50.0, 150.0, 80.0)]],
            &[PageGeometry::new(612.0, 792.0)],
        )
        .unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);

        let page_id = pages[&1];
        assert_eq!(filled_rects(&doc, page_id), vec![vec![50.0, 50.0, 100.0, 30.0]]);

        let data = doc.get_page_content(page_id).unwrap();
        let content = Content::decode(&data).unwrap();
        let ops: Vec<&str> = content.operations.iter().map(|o| o.operator.as_str()).collect();
        assert_eq!(ops, vec!["rg", "re", "f"]);

        let fill: Vec<f32> = content.operations[0]
            .operands
            .iter()
            .map(|o| o.as_float().unwrap())
            .collect();
        assert_eq!(fill, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_empty_rect_set_produces_blank_page() {
        let bytes = synthesize(&[vec![]], &[PageGeometry::new(612.0, 792.0)]).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
        assert!(filled_rects(&doc, pages[&1]).is_empty());
    }

    #[test]
    fn test_empty_input_is_valid_document() {
        let bytes = synthesize(&[], &[]).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert!(doc.get_pages().is_empty());
    }

    #[test]
    fn test_page_sizes_drive_page_count() {
        let sizes = [PageGeometry::new(300.0, 400.0), PageGeometry::letter()];
        let bytes = synthesize(&[vec![Rect::new(1.0, 1.0, 2.0, 2.0)]], &sizes).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 2);

        let page = doc.get_dictionary(pages[&1]).unwrap();
        let media_box: Vec<f32> = page
            .get(b"MediaBox")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o.as_float().unwrap())
            .collect();
        assert_eq!(media_box, vec![0.0, 0.0, 300.0, 400.0]);
        assert!(filled_rects(&doc, pages[&2]).is_empty());
    }

    #[test]
    fn test_degenerate_rect_draws_nothing() {
        let bytes = synthesize(
            &[vec![Rect::new(10.0, 10.0, 10.0, 50.0)]],
            &[PageGeometry::letter()],
        )
        .unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert!(filled_rects(&doc, doc.get_pages()[&1]).is_empty());
    }
}
