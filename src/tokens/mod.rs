//! Token Source Adapters
//!
//! Native-text and OCR extraction produce tokens in different coordinate
//! spaces. Both are exposed through [`TokenSource`] so the locator only ever
//! sees one contract; each source knows how to map a matched box back into
//! point space.

use tracing::{debug, info};

use crate::locator::{self, CoordinateNormalizer};
use crate::types::{NativeWord, OcrPage, PageGeometry, Rect, Token};

/// A tokenized page sequence
pub trait TokenSource {
    /// Number of pages the source has tokens for
    fn page_count(&self) -> usize;

    /// Tokens for one page in reading order, empty when the page is unknown
    fn tokens(&self, page_index: usize) -> Vec<Token>;

    /// Maps a box expressed in this source's space into PDF point space.
    ///
    /// Returns `None` when the page geometry needed for the mapping is missing.
    fn to_point_space(&self, page_index: usize, rect: Rect) -> Option<Rect>;
}

/// Which adapter to run for a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    NativeText,
    Ocr,
}

impl SourceKind {
    /// Picks OCR when the share of pages without extractable text exceeds
    /// `threshold`.
    pub fn select<S: AsRef<str>>(page_texts: &[S], threshold: f64) -> Self {
        let ratio = empty_page_ratio(page_texts);
        let kind = if ratio > threshold {
            SourceKind::Ocr
        } else {
            SourceKind::NativeText
        };
        debug!("Empty page ratio {:.2} (threshold {:.2}) -> {:?}", ratio, threshold, kind);
        kind
    }
}

/// Share of pages whose text is blank
pub fn empty_page_ratio<S: AsRef<str>>(page_texts: &[S]) -> f64 {
    let empty = page_texts.iter().filter(|t| t.as_ref().trim().is_empty()).count();
    empty as f64 / page_texts.len().max(1) as f64
}

/// Words from the PDF's own text layer
#[derive(Debug, Clone, Default)]
pub struct NativeTextSource {
    pages: Vec<Vec<NativeWord>>,
}

impl NativeTextSource {
    pub fn new(pages: Vec<Vec<NativeWord>>) -> Self {
        Self { pages }
    }
}

impl TokenSource for NativeTextSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn tokens(&self, page_index: usize) -> Vec<Token> {
        self.pages
            .get(page_index)
            .map(|words| words.iter().map(|w| w.to_token(page_index)).collect())
            .unwrap_or_default()
    }

    fn to_point_space(&self, _page_index: usize, rect: Rect) -> Option<Rect> {
        // flipped per word already
        Some(rect)
    }
}

/// Words recognized on rendered page images
#[derive(Debug, Clone, Default)]
pub struct OcrSource {
    pages: Vec<OcrPage>,
    page_sizes: Vec<PageGeometry>,
}

impl OcrSource {
    pub fn new(pages: Vec<OcrPage>, page_sizes: Vec<PageGeometry>) -> Self {
        Self { pages, page_sizes }
    }

    /// Recognized text of every page, as used for detection on scanned files
    pub fn page_texts(&self) -> Vec<String> {
        self.pages.iter().map(|p| p.text.clone()).collect()
    }
}

impl TokenSource for OcrSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn tokens(&self, page_index: usize) -> Vec<Token> {
        self.pages
            .get(page_index)
            .map(|page| page.words.iter().map(|w| w.to_token(page_index)).collect())
            .unwrap_or_default()
    }

    fn to_point_space(&self, page_index: usize, rect: Rect) -> Option<Rect> {
        let page = self.pages.get(page_index)?;
        let geometry = *self.page_sizes.get(page_index)?;
        let normalizer = CoordinateNormalizer::new(page.width_px, page.height_px, geometry);
        Some(normalizer.to_points(&rect))
    }
}

/// Locates every page's targets and returns point-space boxes per page.
///
/// The result covers `max(source pages, target pages)` entries; pages with
/// no tokens, no targets or no geometry get an empty list.
pub fn locate_targets<T, S>(source: &T, targets_per_page: &[Vec<S>]) -> Vec<Vec<Rect>>
where
    T: TokenSource + ?Sized,
    S: AsRef<str>,
{
    let pages = source.page_count().max(targets_per_page.len());
    let mut out = Vec::with_capacity(pages);

    for page_index in 0..pages {
        let targets = targets_per_page.get(page_index).map(Vec::as_slice).unwrap_or(&[]);
        let tokens = source.tokens(page_index);
        let rects: Vec<Rect> = locator::locate_all(&tokens, targets)
            .into_iter()
            .filter_map(|r| source.to_point_space(page_index, r))
            .collect();
        if !rects.is_empty() {
            debug!("Page {}: located {} box(es)", page_index, rects.len());
        }
        out.push(rects);
    }

    info!(
        "Located {} box(es) across {} page(s)",
        out.iter().map(Vec::len).sum::<usize>(),
        pages
    );
    out
}

/// Same target list repeated for every page of the source
pub fn same_targets_per_page<T: TokenSource + ?Sized>(source: &T, targets: &[String]) -> Vec<Vec<String>> {
    vec![targets.to_vec(); source.page_count()]
}
