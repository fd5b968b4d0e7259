//! Anonymization Mapper
//!
//! Builds one replacement per distinct detected string and rewrites page
//! text with it. Candidates are processed longest first, so a string that
//! embeds a shorter detection (a full name around a first name) claims its
//! replacement before the shorter one does.

pub mod pseudonym;

pub use pseudonym::{PseudonymGenerator, PseudonymKind};

use std::collections::{BTreeMap, BTreeSet, HashMap};

use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, info, instrument, warn};

use crate::config::{AnonymizationConfig, AnonymizationMode};
use crate::types::Detections;

/// Glyph used by redact mode
pub const REDACTION_GLYPH: char = '█';

const MIN_REDACTION_LEN: usize = 6;
const MAX_REDACTION_LEN: usize = 24;
const PSEUDONYM_ATTEMPTS: usize = 8;

/// Per-category count of distinct replaced strings
pub type CategoryCounts = BTreeMap<String, usize>;

/// Original to replacement mapping, iterated in assignment order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplacementMap {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl ReplacementMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, original: &str) -> Option<&str> {
        self.index.get(original).map(|&i| self.entries[i].1.as_str())
    }

    pub fn contains(&self, original: &str) -> bool {
        self.index.contains_key(original)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(o, r)| (o.as_str(), r.as_str()))
    }

    /// First assignment wins; later inserts of the same key are ignored.
    fn assign(&mut self, original: String, replacement: String) -> bool {
        if self.index.contains_key(&original) {
            return false;
        }
        self.index.insert(original.clone(), self.entries.len());
        self.entries.push((original, replacement));
        true
    }

    fn has_replacement(&self, replacement: &str) -> bool {
        self.entries.iter().any(|(_, r)| r == replacement)
    }
}

impl Serialize for ReplacementMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (original, replacement) in &self.entries {
            map.serialize_entry(original, replacement)?;
        }
        map.end()
    }
}

/// Output of one anonymization run
#[derive(Debug, Clone)]
pub struct AnonymizationResult {
    pub pages: Vec<String>,
    pub mapping: ReplacementMap,
    pub counts: CategoryCounts,
}

/// Replaces detected PII in page text
#[derive(Debug)]
pub struct Anonymizer {
    mode: AnonymizationMode,
    entity_labels: BTreeSet<String>,
    generator: PseudonymGenerator,
}

impl Anonymizer {
    pub fn new(config: &AnonymizationConfig) -> Self {
        Self {
            mode: config.mode,
            entity_labels: config.entity_labels.clone(),
            generator: PseudonymGenerator::new(config.pseudonym_seed),
        }
    }

    /// Default settings with the given mode
    pub fn with_mode(mode: AnonymizationMode) -> Self {
        Self::new(&AnonymizationConfig {
            mode,
            ..AnonymizationConfig::default()
        })
    }

    pub fn mode(&self) -> AnonymizationMode {
        self.mode
    }

    /// Builds the mapping from `detections` and applies it to every page.
    #[instrument(skip_all, fields(mode = %self.mode, pages = pages.len()))]
    pub fn anonymize_pages<S: AsRef<str>>(&mut self, pages: &[S], detections: &Detections) -> AnonymizationResult {
        let (mapping, counts) = self.build_replacements(detections);
        let pages = apply_to_pages(&mapping, pages);
        info!(
            "Anonymized {} page(s) with {} replacement(s)",
            pages.len(),
            mapping.len()
        );
        AnonymizationResult {
            pages,
            mapping,
            counts,
        }
    }

    /// `(string, category)` pairs that feed the mapper, longest string first.
    ///
    /// Pattern categories always contribute; entity labels only when they are
    /// in the configured label set.
    pub fn collect_candidates(&self, detections: &Detections) -> Vec<(String, String)> {
        let regex_pairs = detections
            .regex
            .iter()
            .flat_map(|(cat, values)| values.iter().map(move |v| (v, cat)));
        let entity_pairs = detections
            .entities
            .iter()
            .filter(|(label, _)| self.entity_labels.contains(label.as_str()))
            .flat_map(|(label, values)| values.iter().map(move |v| (v, label)));

        let mut pairs: Vec<(String, String)> = Vec::new();
        for (value, category) in regex_pairs.chain(entity_pairs) {
            if value.trim().is_empty() {
                continue;
            }
            let pair = (value.clone(), category.clone());
            if !pairs.contains(&pair) {
                pairs.push(pair);
            }
        }

        // stable: equal lengths keep first-seen order
        pairs.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));
        pairs
    }

    /// Assigns one replacement per distinct original string.
    pub fn build_replacements(&mut self, detections: &Detections) -> (ReplacementMap, CategoryCounts) {
        let candidates = self.collect_candidates(detections);
        let originals: Vec<&str> = candidates.iter().map(|(o, _)| o.as_str()).collect();
        let mut mapping = ReplacementMap::new();
        let mut counts = CategoryCounts::new();

        for (original, category) in &candidates {
            if mapping.contains(original) {
                continue;
            }
            let counter = counts.entry(category.clone()).or_insert(0);
            *counter += 1;
            let index = *counter;

            let replacement = match self.mode {
                AnonymizationMode::Mask => mask_tag(category, index),
                AnonymizationMode::Redact => redaction_run(original),
                AnonymizationMode::Pseudonymize => self.pseudonym(category, index, &mapping, &originals),
            };
            debug!("Assigned replacement for {} #{}", category, index);
            mapping.assign(original.clone(), replacement);
        }

        (mapping, counts)
    }

    /// Draws a synthetic value that is not already in use and does not embed
    /// any detected string. Every draw is checked; when all of them clash
    /// (constant kinds such as NORP always do) the last draw is numbered from
    /// `index` upward until it is unused.
    fn pseudonym(
        &mut self,
        category: &str,
        index: usize,
        mapping: &ReplacementMap,
        originals: &[&str],
    ) -> String {
        let kind = PseudonymKind::for_category(category);
        let mut value = String::new();
        for _ in 0..PSEUDONYM_ATTEMPTS {
            value = self.generator.generate(kind);
            let clashes = mapping.has_replacement(&value) || originals.iter().any(|o| value.contains(o));
            if !clashes {
                return value;
            }
        }

        warn!("No clean {} pseudonym after {} draws, numbering it", category, PSEUDONYM_ATTEMPTS);
        let numbered = (index..)
            .map(|n| format!("{} {}", value, n))
            .find(|candidate| !mapping.has_replacement(candidate));
        numbered.unwrap_or(value)
    }
}

/// `<CATEGORY_n>`
pub fn mask_tag(category: &str, index: usize) -> String {
    format!("<{}_{}>", category, index)
}

/// Glyph run clamped to 6..=24 characters whatever the original length
pub fn redaction_run(original: &str) -> String {
    let len = original.chars().count().clamp(MIN_REDACTION_LEN, MAX_REDACTION_LEN);
    std::iter::repeat(REDACTION_GLYPH).take(len).collect()
}

/// Applies `mapping` to every page in a single pass per page.
///
/// All originals are matched literally through one alternation, longest
/// first, so text produced by one replacement is never rescanned by another.
pub fn apply_to_pages<S: AsRef<str>>(mapping: &ReplacementMap, pages: &[S]) -> Vec<String> {
    if mapping.is_empty() {
        return pages.iter().map(|p| p.as_ref().to_string()).collect();
    }

    let mut keys: Vec<&str> = mapping.iter().map(|(o, _)| o).collect();
    keys.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
    let pattern = keys.iter().map(|k| regex::escape(k)).collect::<Vec<_>>().join("|");

    match Regex::new(&pattern) {
        Ok(re) => pages
            .iter()
            .map(|page| {
                re.replace_all(page.as_ref(), |caps: &regex::Captures| {
                    mapping.get(&caps[0]).unwrap_or(&caps[0]).to_string()
                })
                .into_owned()
            })
            .collect(),
        Err(e) => {
            warn!("Falling back to sequential substitution: {}", e);
            pages
                .iter()
                .map(|page| {
                    mapping
                        .iter()
                        .fold(page.as_ref().to_string(), |text, (o, r)| text.replace(o, r))
                })
                .collect()
        }
    }
}
