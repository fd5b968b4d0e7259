//! Report formatter implementation

use crate::config::TextLayoutConfig;
use crate::error::Result;
use crate::output::write_text_pdf;

use super::PrivacyReport;

const TITLE: &str = "AI Privacy Assistant — Privacy Report";
const MAX_VALUES_CHARS: usize = 1000;

/// Report output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    PlainText,
    Pdf,
}

/// Formats a privacy report into the supported output formats
pub struct ReportFormatter;

impl ReportFormatter {
    pub fn format(report: &PrivacyReport, format: ReportFormat) -> Result<Vec<u8>> {
        match format {
            ReportFormat::Json => Ok(report.to_json()?.into_bytes()),
            ReportFormat::PlainText => Ok(Self::lines(report).join("\n").into_bytes()),
            ReportFormat::Pdf => write_text_pdf(&[Self::lines(report).join("\n")], &Self::layout()),
        }
    }

    /// Human-readable report, one entry per line.
    ///
    /// Sections for pattern and entity detections are omitted when empty.
    pub fn lines(report: &PrivacyReport) -> Vec<String> {
        let mut lines = vec![
            TITLE.to_string(),
            format!("File: {}", report.file),
            format!("Generated at: {}", report.generated_at),
            String::new(),
            "Summary".to_string(),
        ];
        for (category, count) in &report.summary.counts {
            lines.push(format!("- {}: {}", category, count));
        }
        lines.push(String::new());

        let sections = [
            ("Regex detections:", &report.details.regex),
            ("NER detections:", &report.details.entities),
        ];
        for (heading, matches) in sections {
            if matches.is_empty() {
                continue;
            }
            lines.push(heading.to_string());
            for (category, values) in matches {
                let joined: String = values.join(", ").chars().take(MAX_VALUES_CHARS).collect();
                lines.push(format!("  • {}: {}", category, joined));
            }
            lines.push(String::new());
        }
        lines
    }

    fn layout() -> TextLayoutConfig {
        TextLayoutConfig {
            margin: 60.0,
            line_height: 16.0,
            ..TextLayoutConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Detections;

    #[test]
    fn test_lines_layout() {
        let mut details = Detections::new();
        details.regex.insert("ssn".into(), vec!["123-45-6789".into()]);
        let counts = [("ssn".to_string(), 1)].into_iter().collect();
        let report = PrivacyReport::new("x.pdf", details, counts);

        let lines = ReportFormatter::lines(&report);
        assert_eq!(lines[0], TITLE);
        assert_eq!(lines[1], "File: x.pdf");
        assert!(lines.contains(&"Summary".to_string()));
        assert!(lines.contains(&"- ssn: 1".to_string()));
        assert!(lines.contains(&"Regex detections:".to_string()));
        assert!(lines.contains(&"  • ssn: 123-45-6789".to_string()));
        assert!(!lines.contains(&"NER detections:".to_string()));
    }

    #[test]
    fn test_pdf_format() {
        let report = PrivacyReport::new("x.pdf", Detections::new(), Default::default());
        let bytes = ReportFormatter::format(&report, ReportFormat::Pdf).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        let text = ReportFormatter::format(&report, ReportFormat::PlainText).unwrap();
        assert!(String::from_utf8(text).unwrap().starts_with("AI Privacy Assistant — Privacy Report"));
    }

    #[test]
    fn test_json_format_round_trips() {
        let report = PrivacyReport::new("x.pdf", Detections::new(), Default::default());
        let bytes = ReportFormatter::format(&report, ReportFormat::Json).unwrap();
        let parsed: PrivacyReport = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn test_long_value_lists_are_cut() {
        let mut details = Detections::new();
        details.entities.insert("PERSON".into(), vec!["x".repeat(2000)]);
        let report = PrivacyReport::new("x.pdf", details, Default::default());
        let line = ReportFormatter::lines(&report)
            .into_iter()
            .find(|l| l.contains("PERSON"))
            .unwrap();
        assert_eq!(line.chars().count(), "  • PERSON: ".chars().count() + MAX_VALUES_CHARS);
    }
}
