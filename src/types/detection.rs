//! Detection output consumed by the redaction and anonymization stages
//!
//! The shape mirrors what the detection backends hand over:
//! `{"regex": {category: [..]}, "spacy": {label: [..]}, "llm": "..."}`.
//! Every key is optional and malformed entries are read as "no detections".

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Sentinel reported when the language-model pass did not run
pub const LLM_DISABLED: &str = "llm disabled";

/// Category (or entity label) to matched literal strings
pub type CategoryMatches = BTreeMap<String, Vec<String>>;

/// Free-text summary from the language-model pass, advisory only
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LlmOutput {
    #[default]
    Disabled,
    Summary(String),
}

impl Serialize for LlmOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LlmOutput::Disabled => serializer.serialize_str(LLM_DISABLED),
            LlmOutput::Summary(text) => serializer.serialize_str(text),
        }
    }
}

impl<'de> Deserialize<'de> for LlmOutput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) if s != LLM_DISABLED && !s.trim().is_empty() => LlmOutput::Summary(s),
            _ => LlmOutput::Disabled,
        })
    }
}

/// Combined detector output for one document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Detections {
    #[serde(default, deserialize_with = "lenient_matches")]
    pub regex: CategoryMatches,

    #[serde(default, rename = "spacy", alias = "entities", deserialize_with = "lenient_matches")]
    pub entities: CategoryMatches,

    #[serde(default)]
    pub llm: LlmOutput,
}

impl Detections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.regex.values().all(Vec::is_empty) && self.entities.values().all(Vec::is_empty)
    }

    /// Unions `other` into `self`, keeping first-seen order within each category.
    pub fn merge(&mut self, other: Detections) {
        merge_matches(&mut self.regex, other.regex);
        merge_matches(&mut self.entities, other.entities);
        if let LlmOutput::Summary(_) = other.llm {
            self.llm = other.llm;
        }
    }

    /// Every pattern and entity string, in category order, duplicates removed.
    ///
    /// This is the target list for layout redaction, which blacks out every
    /// detected string regardless of entity label.
    pub fn targets(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for value in self.regex.values().chain(self.entities.values()).flatten() {
            if !out.contains(value) {
                out.push(value.clone());
            }
        }
        out
    }
}

fn merge_matches(into: &mut CategoryMatches, from: CategoryMatches) {
    for (category, values) in from {
        let slot = into.entry(category).or_default();
        for value in values {
            if !slot.contains(&value) {
                slot.push(value);
            }
        }
    }
}

/// Reads a `{category: [strings]}` map, dropping anything that does not fit.
fn lenient_matches<'de, D>(deserializer: D) -> Result<CategoryMatches, D::Error>
where
    D: Deserializer<'de>,
{
    let mut out = CategoryMatches::new();
    let Value::Object(map) = Value::deserialize(deserializer)? else {
        return Ok(out);
    };

    for (category, value) in map {
        let values: Vec<String> = match value {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            Value::String(s) => vec![s],
            _ => continue,
        };
        out.insert(category, values);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_are_empty() {
        let det: Detections = serde_json::from_str("{}").unwrap();
        assert!(det.is_empty());
        assert_eq!(det.llm, LlmOutput::Disabled);
    }

    #[test]
    fn test_malformed_entries_are_dropped() {
        let json = r#"{
            "regex": {"email": ["a@b.com", 5, null], "phone": 12},
            "spacy": null,
            "llm": "llm disabled"
        }"#;
        let det: Detections = serde_json::from_str(json).unwrap();
        assert_eq!(det.regex.get("email").unwrap(), &vec!["a@b.com".to_string()]);
        assert!(!det.regex.contains_key("phone"));
        assert!(det.entities.is_empty());
        assert_eq!(det.llm, LlmOutput::Disabled);
    }

    #[test]
    fn test_targets_dedup_across_sources() {
        let mut det = Detections::new();
        det.regex.insert("email".into(), vec!["a@b.com".into()]);
        det.entities.insert("PERSON".into(), vec!["John Doe".into(), "a@b.com".into()]);
        assert_eq!(det.targets(), vec!["a@b.com".to_string(), "John Doe".to_string()]);
    }

    #[test]
    fn test_merge_keeps_order_and_llm_summary() {
        let mut a = Detections::new();
        a.entities.insert("PERSON".into(), vec!["Ann".into()]);
        let mut b = Detections::new();
        b.entities.insert("PERSON".into(), vec!["Bob".into(), "Ann".into()]);
        b.llm = LlmOutput::Summary("Name(s): Ann, Bob".into());
        a.merge(b);
        assert_eq!(a.entities["PERSON"], vec!["Ann".to_string(), "Bob".to_string()]);
        assert!(matches!(a.llm, LlmOutput::Summary(_)));
    }

    #[test]
    fn test_llm_round_trips_sentinel() {
        let json = serde_json::to_string(&Detections::new()).unwrap();
        assert!(json.contains(LLM_DISABLED));
    }
}
