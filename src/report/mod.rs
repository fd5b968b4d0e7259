//! Privacy report produced alongside anonymized output

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::anonymizer::CategoryCounts;
use crate::error::Result;
use crate::types::Detections;

pub mod formatter;

pub use formatter::{ReportFormat, ReportFormatter};

/// Report summary statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Pattern categories plus entity labels that had detections
    pub total_categories: usize,
    /// Distinct replaced strings per category
    pub counts: CategoryCounts,
}

/// What was found in a document and how much of it was replaced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivacyReport {
    pub file: String,
    pub generated_at: String,
    pub summary: ReportSummary,
    pub details: Detections,
}

impl PrivacyReport {
    pub fn new(file: impl Into<String>, details: Detections, counts: CategoryCounts) -> Self {
        Self {
            file: file.into(),
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            summary: ReportSummary {
                total_categories: details.regex.len() + details.entities.len(),
                counts,
            },
            details,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_lines(&self) -> Vec<String> {
        ReportFormatter::lines(self)
    }

    pub fn to_pdf(&self) -> Result<Vec<u8>> {
        ReportFormatter::format(self, ReportFormat::Pdf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn sample() -> PrivacyReport {
        let mut details = Detections::new();
        details.regex.insert("email".into(), vec!["a@b.com".into()]);
        details.entities.insert("PERSON".into(), vec!["Ann".into(), "Bo".into()]);
        details.entities.insert("GPE".into(), vec!["Oslo".into()]);
        let counts: CategoryCounts = [("email".to_string(), 1), ("PERSON".to_string(), 2)].into_iter().collect();
        PrivacyReport::new("input.pdf", details, counts)
    }

    #[test]
    fn test_summary_counts_categories_and_labels() {
        let report = sample();
        assert_eq!(report.summary.total_categories, 3);
        assert_eq!(report.summary.counts["PERSON"], 2);
        assert!(DateTime::parse_from_rfc3339(&report.generated_at).is_ok());
        assert!(report.generated_at.ends_with('Z'));
    }

    #[test]
    fn test_json_shape() {
        let json: serde_json::Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();
        assert_eq!(json["file"], "input.pdf");
        assert_eq!(json["summary"]["total_categories"], 3);
        assert_eq!(json["summary"]["counts"]["email"], 1);
        assert_eq!(json["details"]["spacy"]["PERSON"][1], "Bo");
        assert_eq!(json["details"]["llm"], "llm disabled");
    }

    #[test]
    fn test_round_trips_through_json() {
        let report = sample();
        let back: PrivacyReport = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(back, report);
    }
}
