//! Built-in pattern detector
//!
//! Runs a fixed set of regular expressions over page text and reports the
//! unique matches per category. Named-entity and LLM detections come from
//! external detectors and are merged in through [`Detections::merge`].

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, instrument};

use crate::types::{CategoryMatches, Detections};

lazy_static! {
    static ref RE_EMAIL: Regex = Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-z]{2,}").unwrap();

    static ref RE_PHONE: Regex = Regex::new(r"\+?\d[\d\s().-]{7,}\d").unwrap();

    static ref RE_SSN: Regex = Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap();

    /// 13 to 16 digits, optionally separated by spaces or dashes
    static ref RE_CREDIT_CARD: Regex = Regex::new(r"\b(?:\d[ -]*?){13,16}\b").unwrap();
}

/// Pattern-based PII detector
#[derive(Debug, Clone)]
pub struct PatternDetector {
    patterns: Vec<(&'static str, &'static Regex)>,
}

impl Default for PatternDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternDetector {
    pub fn new() -> Self {
        Self {
            patterns: vec![
                ("email", &*RE_EMAIL),
                ("phone", &*RE_PHONE),
                ("ssn", &*RE_SSN),
                ("credit_card", &*RE_CREDIT_CARD),
            ],
        }
    }

    pub fn categories(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.patterns.iter().map(|(name, _)| *name)
    }

    /// Unique matches per category, in first-seen order. Categories without
    /// a match are omitted.
    #[instrument(skip_all, fields(len = text.len()))]
    pub fn scan(&self, text: &str) -> CategoryMatches {
        let mut found = CategoryMatches::new();
        for (category, re) in &self.patterns {
            let mut hits: Vec<String> = Vec::new();
            for m in re.find_iter(text) {
                if !hits.iter().any(|h| h == m.as_str()) {
                    hits.push(m.as_str().to_string());
                }
            }
            if !hits.is_empty() {
                debug!("{}: {} unique match(es)", category, hits.len());
                found.insert(category.to_string(), hits);
            }
        }
        found
    }

    /// Pattern detections wrapped in the combined detection shape.
    pub fn detect(&self, text: &str) -> Detections {
        Detections {
            regex: self.scan(text),
            ..Detections::new()
        }
    }
}
