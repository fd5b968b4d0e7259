//! Read-only access to the source PDF
//!
//! Wraps the raw bytes and the parsed `lopdf` document so page geometry and
//! the native text layer can be queried without reparsing.

use lopdf::{Dictionary, Document, Object};
use tracing::{debug, instrument, warn};

use crate::error::{DocumentError, Result};
use crate::tokens::empty_page_ratio;
use crate::types::PageGeometry;

/// Maximum `/Parent` hops followed when resolving inherited page attributes
const MAX_INHERITANCE_DEPTH: usize = 64;

/// A loaded source PDF
#[derive(Debug)]
pub struct PdfSource {
    bytes: Vec<u8>,
    doc: Document,
}

impl PdfSource {
    /// Parses `bytes` as a PDF.
    #[instrument(skip_all, fields(len = bytes.len()))]
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let doc = Document::load_mem(&bytes)?;
        debug!("Loaded PDF {} with {} page(s)", doc.version, doc.get_pages().len());
        Ok(Self { bytes, doc })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Fails with [`DocumentError::MissingPages`] for a document without pages.
    pub fn ensure_pages(&self) -> Result<()> {
        if self.page_count() == 0 {
            return Err(DocumentError::MissingPages("document has no pages".into()).into());
        }
        Ok(())
    }

    /// Page sizes in points, in page order.
    ///
    /// `MediaBox` is looked up through the page tree; pages without one are
    /// treated as US Letter.
    pub fn page_sizes(&self) -> Result<Vec<PageGeometry>> {
        let mut sizes = Vec::new();
        for (page_number, page_id) in self.doc.get_pages() {
            let page = self.doc.get_dictionary(page_id)?;
            let size = match inherited(&self.doc, page, b"MediaBox") {
                Some(media_box) => media_box_size(page_number, media_box)?,
                None => {
                    debug!("Page {} has no MediaBox, assuming Letter", page_number);
                    PageGeometry::letter()
                }
            };
            sizes.push(size);
        }
        Ok(sizes)
    }

    /// Native text of every page. Pages whose text cannot be extracted are
    /// returned as empty strings.
    #[instrument(skip(self))]
    pub fn extract_pages(&self) -> Vec<String> {
        self.doc
            .get_pages()
            .keys()
            .map(|&page_number| match self.doc.extract_text(&[page_number]) {
                Ok(text) => text,
                Err(e) => {
                    warn!("No text extracted from page {}: {}", page_number, e);
                    String::new()
                }
            })
            .collect()
    }

    /// Share of pages without extractable text
    pub fn empty_page_ratio(&self) -> f64 {
        empty_page_ratio(&self.extract_pages())
    }
}

fn media_box_size(page_number: u32, media_box: &Object) -> Result<PageGeometry> {
    let invalid = |reason: &str| DocumentError::InvalidGeometry {
        page: page_number as usize,
        reason: reason.to_string(),
    };

    let values = media_box
        .as_array()
        .map_err(|_| invalid("MediaBox is not an array"))?
        .iter()
        .map(|v| v.as_float().map(f64::from))
        .collect::<std::result::Result<Vec<f64>, _>>()
        .map_err(|_| invalid("MediaBox holds a non-numeric entry"))?;

    let &[x0, y0, x1, y1] = values.as_slice() else {
        return Err(invalid("MediaBox must have four entries").into());
    };
    Ok(PageGeometry::new((x1 - x0).abs(), (y1 - y0).abs()))
}

/// Looks up `key` on the page, walking `/Parent` links, and resolves references.
pub(crate) fn inherited<'a>(doc: &'a Document, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut node = page;
    for _ in 0..MAX_INHERITANCE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(resolve(doc, value));
        }
        let parent_id = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_dictionary(parent_id).ok()?;
    }
    None
}

pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}
