//! Configuration types and validation for the redaction pipeline

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Entity labels whose spans are anonymized by default
pub const DEFAULT_ENTITY_LABELS: [&str; 5] = ["PERSON", "ORG", "GPE", "LOC", "NORP"];

/// How detected strings are replaced in the anonymized text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnonymizationMode {
    /// `<CATEGORY_n>` tags
    #[default]
    Mask,
    /// Fixed-glyph blackout runs
    Redact,
    /// Synthetic but plausible values
    #[serde(alias = "pseudo")]
    Pseudonymize,
}

impl fmt::Display for AnonymizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AnonymizationMode::Mask => "mask",
            AnonymizationMode::Redact => "redact",
            AnonymizationMode::Pseudonymize => "pseudo",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for AnonymizationMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mask" => Ok(AnonymizationMode::Mask),
            "redact" => Ok(AnonymizationMode::Redact),
            "pseudo" | "pseudonymize" => Ok(AnonymizationMode::Pseudonymize),
            other => Err(Error::InvalidConfiguration(format!("Unknown anonymization mode: {}", other))),
        }
    }
}

/// Settings for the text anonymization path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnonymizationConfig {
    pub mode: AnonymizationMode,
    /// Seed for synthetic values; `None` draws from OS entropy
    pub pseudonym_seed: Option<u64>,
    /// Entity labels that feed the mapper
    pub entity_labels: BTreeSet<String>,
}

/// Settings for the layout-preserving redaction path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedactionConfig {
    /// Above this share of text-less pages the document is treated as scanned
    pub image_doc_empty_ratio: f64,
}

/// Page layout used when rebuilding anonymized text as a PDF
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextLayoutConfig {
    pub page_width: f64,
    pub page_height: f64,
    pub margin: f64,
    pub line_height: f64,
    pub font_size: f64,
    pub max_line_chars: usize,
}

/// Where generated artifacts are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub output_dir: PathBuf,
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedactorConfig {
    pub anonymization: AnonymizationConfig,
    pub redaction: RedactionConfig,
    pub text_layout: TextLayoutConfig,
    pub output: OutputConfig,
}

// Defaults
impl Default for AnonymizationConfig {
    fn default() -> Self {
        Self {
            mode: AnonymizationMode::Mask,
            pseudonym_seed: None,
            entity_labels: DEFAULT_ENTITY_LABELS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            image_doc_empty_ratio: 0.6,
        }
    }
}

impl Default for TextLayoutConfig {
    fn default() -> Self {
        Self {
            page_width: 612.0,
            page_height: 792.0,
            margin: 50.0,
            line_height: 14.0,
            font_size: 11.0,
            max_line_chars: 1200,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("outputs"),
        }
    }
}

impl RedactorConfig {
    /// Reads a JSON or YAML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        // Try JSON first, then YAML
        serde_json::from_str(&content)
            .or_else(|_| serde_yaml::from_str(&content))
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))
    }

    /// Applies `IMAGE_DOC_EMPTY_RATIO`, `ANONYMIZATION_MODE`,
    /// `PSEUDONYM_SEED` and `OUTPUT_DIR` when they are set.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("IMAGE_DOC_EMPTY_RATIO") {
            self.redaction.image_doc_empty_ratio = v
                .trim()
                .parse()
                .map_err(|_| Error::ConfigError(format!("IMAGE_DOC_EMPTY_RATIO is not a number: {}", v)))?;
        }
        if let Some(v) = lookup("ANONYMIZATION_MODE") {
            self.anonymization.mode = v.parse()?;
        }
        if let Some(v) = lookup("PSEUDONYM_SEED") {
            self.anonymization.pseudonym_seed = Some(
                v.trim()
                    .parse()
                    .map_err(|_| Error::ConfigError(format!("PSEUDONYM_SEED is not an integer: {}", v)))?,
            );
        }
        if let Some(v) = lookup("OUTPUT_DIR") {
            self.output.output_dir = PathBuf::from(v);
        }
        debug!("Effective configuration: {:?}", self);
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let ratio = self.redaction.image_doc_empty_ratio;
        if !(0.0..=1.0).contains(&ratio) {
            return Err(Error::InvalidConfiguration(format!(
                "image_doc_empty_ratio must be within [0, 1], got {}",
                ratio
            )));
        }

        let layout = &self.text_layout;
        if layout.page_width <= 0.0 || layout.page_height <= 0.0 {
            return Err(Error::InvalidConfiguration("Page dimensions must be positive".into()));
        }
        if layout.margin < 0.0 || layout.margin * 2.0 >= layout.page_width.min(layout.page_height) {
            return Err(Error::InvalidConfiguration("Margin does not fit the page".into()));
        }
        if layout.line_height <= 0.0 || layout.font_size <= 0.0 {
            return Err(Error::InvalidConfiguration("Line height and font size must be positive".into()));
        }
        if layout.max_line_chars == 0 {
            return Err(Error::InvalidConfiguration("max_line_chars must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = RedactorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.redaction.image_doc_empty_ratio, 0.6);
        assert!(config.anonymization.entity_labels.contains("NORP"));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "anonymization:\n  mode: pseudo\n  pseudonym_seed: 7\n";
        let config: RedactorConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.anonymization.mode, AnonymizationMode::Pseudonymize);
        assert_eq!(config.anonymization.pseudonym_seed, Some(7));
        assert_eq!(config.text_layout.margin, 50.0);
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("IMAGE_DOC_EMPTY_RATIO", "0.25"),
            ("ANONYMIZATION_MODE", "redact"),
            ("PSEUDONYM_SEED", "42"),
        ]
        .into_iter()
        .collect();
        let mut config = RedactorConfig::default();
        config
            .apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.redaction.image_doc_empty_ratio, 0.25);
        assert_eq!(config.anonymization.mode, AnonymizationMode::Redact);
        assert_eq!(config.anonymization.pseudonym_seed, Some(42));
    }

    #[test]
    fn test_bad_override_is_rejected() {
        let mut config = RedactorConfig::default();
        let result = config.apply_overrides(|k| (k == "ANONYMIZATION_MODE").then(|| "shred".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_rejects_out_of_range_ratio() {
        let mut config = RedactorConfig::default();
        config.redaction.image_doc_empty_ratio = 1.5;
        assert!(config.validate().is_err());
        config.redaction.image_doc_empty_ratio = 0.5;
        config.text_layout.margin = 400.0;
        assert!(config.validate().is_err());
    }
}
