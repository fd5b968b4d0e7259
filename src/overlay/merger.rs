//! Overlay Merger
//!
//! Composites overlay page `i` onto original page `i`. The overlay page is
//! imported as a Form XObject and painted after the original content, which
//! is wrapped in `q`/`Q` so its graphics state cannot leak into the overlay.
//! Pages past the overlay's page count pass through untouched.

use std::collections::HashMap;

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, info, instrument};

use crate::document::{inherited, resolve};
use crate::error::{OverlayError, Result};

/// Name prefix of the XObject resource the overlay is registered under
const OVERLAY_XOBJECT_PREFIX: &str = "PiiOverlay";

/// Merges `overlay` onto `original` and serializes the result.
///
/// The output always has exactly the original's pages, in the original order.
#[instrument(skip_all, fields(original_len = original.len(), overlay_len = overlay.len()))]
pub fn merge(original: &[u8], overlay: &[u8]) -> Result<Vec<u8>> {
    let mut doc = Document::load_mem(original)?;
    let overlay_doc = Document::load_mem(overlay)?;

    let original_pages = doc.get_pages();
    let overlay_pages = overlay_doc.get_pages();
    let mut imported: HashMap<ObjectId, ObjectId> = HashMap::new();
    let mut merged = 0usize;

    for (page_number, page_id) in &original_pages {
        let Some(overlay_page_id) = overlay_pages.get(page_number) else {
            continue;
        };

        let form_id = import_page_as_form(&mut doc, &overlay_doc, *overlay_page_id, &mut imported)?;
        stamp_page(&mut doc, *page_number, *page_id, form_id)?;
        merged += 1;
        debug!("Composited overlay onto page {}", page_number);
    }

    info!(
        "Merged overlay onto {} of {} page(s)",
        merged,
        original_pages.len()
    );

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

/// Copies an overlay page into `doc` as a Form XObject and returns its id.
fn import_page_as_form(
    doc: &mut Document,
    overlay: &Document,
    overlay_page_id: ObjectId,
    imported: &mut HashMap<ObjectId, ObjectId>,
) -> Result<ObjectId> {
    let content = overlay.get_page_content(overlay_page_id)?;
    let page = overlay.get_dictionary(overlay_page_id)?;

    let bbox = inherited(overlay, page, b"MediaBox")
        .cloned()
        .unwrap_or_else(|| {
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ])
        });
    let resources = match inherited(overlay, page, b"Resources") {
        Some(obj) => import_object(doc, overlay, obj, imported)?,
        None => Object::Dictionary(Dictionary::new()),
    };
    let bbox = import_object(doc, overlay, &bbox, imported)?;

    let form = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => bbox,
            "Resources" => resources,
        },
        content,
    );
    Ok(doc.add_object(form))
}

/// Registers the form on the page and appends a `Do` after the original content.
fn stamp_page(doc: &mut Document, page_number: u32, page_id: ObjectId, form_id: ObjectId) -> Result<()> {
    let page = doc.get_dictionary(page_id)?;

    let mut resources = match inherited(doc, page, b"Resources") {
        Some(Object::Dictionary(dict)) => dict.clone(),
        Some(_) => return Err(OverlayError::UnsupportedResources(page_number).into()),
        None => Dictionary::new(),
    };
    let mut xobjects = match resources.get(b"XObject") {
        Ok(obj) => match resolve(doc, obj) {
            Object::Dictionary(dict) => dict.clone(),
            _ => return Err(OverlayError::UnsupportedResources(page_number).into()),
        },
        Err(_) => Dictionary::new(),
    };

    let mut suffix = 0usize;
    let name = loop {
        let candidate = format!("{OVERLAY_XOBJECT_PREFIX}{suffix}");
        if !xobjects.has(candidate.as_bytes()) {
            break candidate;
        }
        suffix += 1;
    };
    xobjects.set(name.as_bytes().to_vec(), Object::Reference(form_id));
    resources.set("XObject", Object::Dictionary(xobjects));

    let mut contents: Vec<Object> = match page.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id)? {
            Object::Array(items) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(items)) => items.clone(),
        Ok(_) => return Err(OverlayError::UnsupportedContents(page_number).into()),
        Err(_) => Vec::new(),
    };

    let open_id = doc.add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));
    let close = format!("\nQ\nq /{name} Do Q\n");
    let close_id = doc.add_object(Stream::new(dictionary! {}, close.into_bytes()));
    contents.insert(0, Object::Reference(open_id));
    contents.push(Object::Reference(close_id));

    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
    page.set("Resources", Object::Dictionary(resources));
    page.set("Contents", Object::Array(contents));
    Ok(())
}

/// Deep-copies `obj` from `source` into `target`, remapping references.
fn import_object(
    target: &mut Document,
    source: &Document,
    obj: &Object,
    imported: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object> {
    Ok(match obj {
        Object::Reference(id) => {
            if let Some(new_id) = imported.get(id) {
                return Ok(Object::Reference(*new_id));
            }
            let new_id = target.new_object_id();
            imported.insert(*id, new_id);
            let copied = match source.get_object(*id) {
                Ok(inner) => import_object(target, source, inner, imported)?,
                Err(_) => Object::Null,
            };
            target.objects.insert(new_id, copied);
            Object::Reference(new_id)
        }
        Object::Array(items) => Object::Array(
            items
                .iter()
                .map(|item| import_object(target, source, item, imported))
                .collect::<Result<Vec<_>>>()?,
        ),
        Object::Dictionary(dict) => Object::Dictionary(import_dictionary(target, source, dict, imported)?),
        Object::Stream(stream) => {
            let dict = import_dictionary(target, source, &stream.dict, imported)?;
            let mut copied = stream.clone();
            copied.dict = dict;
            Object::Stream(copied)
        }
        other => other.clone(),
    })
}

fn import_dictionary(
    target: &mut Document,
    source: &Document,
    dict: &Dictionary,
    imported: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Dictionary> {
    let mut out = Dictionary::new();
    for (key, value) in dict.iter() {
        out.set(key.clone(), import_object(target, source, value, imported)?);
    }
    Ok(out)
}
