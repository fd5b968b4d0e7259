//! PII redaction pipeline, one async entry point per operation
//!
//! Every operation reads its input asynchronously, runs the synchronous core
//! (detection, anonymization, locating, overlay) in memory and writes the
//! result back out. Pattern detections are always computed here; entity and
//! language-model detections come from outside and are merged in.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    anonymizer::{Anonymizer, CategoryCounts, ReplacementMap},
    config::{AnonymizationConfig, AnonymizationMode, RedactorConfig},
    detection::PatternDetector,
    document::PdfSource,
    error::{DocumentError, Result},
    output::{write_bundle, write_text_pdf, BundleArchive},
    overlay::apply_overlay,
    report::PrivacyReport,
    tokens::{locate_targets, same_targets_per_page, NativeTextSource, OcrSource, SourceKind, TokenSource},
    types::{Detections, NativeWord, OcrPage, PageGeometry},
    utils::{file_name, read_file, require_pdf, write_file},
};

/// Separator placed between page texts when a document is scanned as a whole
pub const PAGE_SEPARATOR: &str = "\n\n";

/// Result of [`Pipeline::analyze`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub filename: String,
    pub extracted_text: String,
    pub pii_detection: Detections,
}

/// Result of [`Pipeline::anonymize`]
#[derive(Debug, Clone)]
pub struct AnonymizationOutcome {
    pub output: PathBuf,
    pub mode: AnonymizationMode,
    pub detections: Detections,
    pub mapping: ReplacementMap,
    pub counts: CategoryCounts,
}

/// Result of [`Pipeline::redact`]
#[derive(Debug, Clone)]
pub struct RedactionOutcome {
    pub output: PathBuf,
    pub source: SourceKind,
    pub detections: Detections,
    /// Number of boxes drawn on each page
    pub boxes_per_page: Vec<usize>,
}

/// Result of [`Pipeline::bundle`]
#[derive(Debug, Clone)]
pub struct BundleOutcome {
    pub archive: BundleArchive,
    pub report: PrivacyReport,
}

/// Word boxes supplied for layout redaction, one list per page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RedactionTokens {
    /// Words from the PDF text layer
    pub native: Option<Vec<Vec<NativeWord>>>,
    /// Words recognized on rendered page images
    pub ocr: Option<Vec<OcrPage>>,
}

impl RedactionTokens {
    pub fn is_empty(&self) -> bool {
        self.native.is_none() && self.ocr.is_none()
    }

    /// Loads a JSON token dump.
    pub async fn load(path: &Path) -> Result<Self> {
        let data = read_file(path).await?;
        Ok(serde_json::from_slice(&data)?)
    }
}

/// Loads externally produced detections (entity labels, LLM summary).
pub async fn load_detections(path: &Path) -> Result<Detections> {
    let data = read_file(path).await?;
    Ok(serde_json::from_slice(&data)?)
}

/// PII pipeline that orchestrates detection, anonymization and redaction
#[derive(Debug)]
pub struct Pipeline {
    config: RedactorConfig,
    detector: PatternDetector,
}

impl Pipeline {
    pub fn new(config: RedactorConfig) -> Self {
        Self {
            config,
            detector: PatternDetector::new(),
        }
    }

    pub fn config(&self) -> &RedactorConfig {
        &self.config
    }

    /// `<output_dir>/<prefix>_<uuid>.pdf`
    pub fn default_output_path(&self, prefix: &str) -> PathBuf {
        self.config
            .output
            .output_dir
            .join(format!("{}_{}.pdf", prefix, Uuid::new_v4().simple()))
    }

    /// `<output_dir>/bundle_<uuid>.zip`
    pub fn default_bundle_path(&self) -> PathBuf {
        self.config
            .output
            .output_dir
            .join(format!("bundle_{}.zip", Uuid::new_v4().simple()))
    }

    /// Extracts the text and reports what the detectors found.
    #[instrument(skip(self, external))]
    pub async fn analyze(&self, input: &Path, external: Option<&Detections>) -> Result<AnalysisResult> {
        info!("🔍 Analyzing {}", input.display());
        let source = self.load(input).await?;
        let pages = source.extract_pages();
        let extracted_text = pages.join(PAGE_SEPARATOR);
        let pii_detection = self.detect(&extracted_text, external);

        info!("✅ Analysis complete: {} categories", pii_detection.regex.len() + pii_detection.entities.len());
        Ok(AnalysisResult {
            filename: file_name(input),
            extracted_text,
            pii_detection,
        })
    }

    /// Replaces detected PII in the text and rebuilds it as a plain PDF.
    #[instrument(skip(self, external))]
    pub async fn anonymize(
        &self,
        input: &Path,
        output: &Path,
        mode: Option<AnonymizationMode>,
        external: Option<&Detections>,
    ) -> Result<AnonymizationOutcome> {
        info!("🛠️ Anonymizing {}", input.display());
        let source = self.load(input).await?;
        let (outcome, bytes) = self.anonymize_source(&source, mode, external)?;

        write_file(output, &bytes).await?;
        info!("✅ Anonymized PDF written to {}", output.display());
        Ok(AnonymizationOutcome {
            output: output.to_path_buf(),
            ..outcome
        })
    }

    /// Draws black boxes over every detected string on the original layout.
    #[instrument(skip(self, tokens, external))]
    pub async fn redact(
        &self,
        input: &Path,
        output: &Path,
        tokens: &RedactionTokens,
        external: Option<&Detections>,
    ) -> Result<RedactionOutcome> {
        info!("🛠️ Redacting {}", input.display());
        let source = self.load(input).await?;
        source.ensure_pages()?;
        let page_sizes = source.page_sizes()?;
        let page_texts = source.extract_pages();

        let kind = SourceKind::select(&page_texts, self.config.redaction.image_doc_empty_ratio);
        let (token_source, used, text) = select_token_source(kind, tokens, &page_texts, &page_sizes)?;
        info!("📄 Token source: {:?}", used);

        let detections = self.detect(&text, external);
        let targets = detections.targets();
        debug!("{} redaction target(s)", targets.len());

        let targets_per_page = same_targets_per_page(&*token_source, &targets);
        let rects = locate_targets(&*token_source, &targets_per_page);
        let merged = apply_overlay(source.bytes(), &rects, &page_sizes)?;

        write_file(output, &merged).await?;
        info!("✅ Redacted PDF written to {}", output.display());
        Ok(RedactionOutcome {
            output: output.to_path_buf(),
            source: used,
            detections,
            boxes_per_page: rects.iter().map(Vec::len).collect(),
        })
    }

    /// Anonymizes the document and packs it with its privacy report into the
    /// ZIP archive at `output`.
    #[instrument(skip(self, external))]
    pub async fn bundle(
        &self,
        input: &Path,
        output: &Path,
        mode: Option<AnonymizationMode>,
        external: Option<&Detections>,
    ) -> Result<BundleOutcome> {
        info!("📦 Bundling {}", input.display());
        let source = self.load(input).await?;
        let (outcome, bytes) = self.anonymize_source(&source, mode, external)?;

        let filename = file_name(input);
        let report = PrivacyReport::new(filename.clone(), outcome.detections, outcome.counts);
        let archive = write_bundle(output, &format!("sanitized_{}", filename), &bytes, &report).await?;

        info!("✅ Bundle complete");
        Ok(BundleOutcome { archive, report })
    }

    async fn load(&self, input: &Path) -> Result<PdfSource> {
        require_pdf(input)?;
        let bytes = read_file(input).await?;
        PdfSource::from_bytes(bytes)
    }

    fn detect(&self, text: &str, external: Option<&Detections>) -> Detections {
        let mut detections = self.detector.detect(text);
        if let Some(external) = external {
            detections.merge(external.clone());
        }
        detections
    }

    /// Runs detection and anonymization and renders the rebuilt PDF.
    /// The returned outcome has an empty output path.
    fn anonymize_source(
        &self,
        source: &PdfSource,
        mode: Option<AnonymizationMode>,
        external: Option<&Detections>,
    ) -> Result<(AnonymizationOutcome, Vec<u8>)> {
        let pages = source.extract_pages();
        let detections = self.detect(&pages.join(PAGE_SEPARATOR), external);

        let config = AnonymizationConfig {
            mode: mode.unwrap_or(self.config.anonymization.mode),
            ..self.config.anonymization.clone()
        };
        let mut anonymizer = Anonymizer::new(&config);
        let result = anonymizer.anonymize_pages(&pages, &detections);
        let bytes = write_text_pdf(&result.pages, &self.config.text_layout)?;

        Ok((
            AnonymizationOutcome {
                output: PathBuf::new(),
                mode: config.mode,
                detections,
                mapping: result.mapping,
                counts: result.counts,
            },
            bytes,
        ))
    }
}

/// Picks the token adapter for `kind`, falling back to the other one when
/// only that one was supplied. Returns the adapter, the kind actually used
/// and the text detection should run on.
fn select_token_source(
    kind: SourceKind,
    tokens: &RedactionTokens,
    page_texts: &[String],
    page_sizes: &[PageGeometry],
) -> Result<(Box<dyn TokenSource>, SourceKind, String)> {
    let native = |words: &Vec<Vec<NativeWord>>| -> (Box<dyn TokenSource>, SourceKind, String) {
        (
            Box::new(NativeTextSource::new(words.clone())),
            SourceKind::NativeText,
            page_texts.join(PAGE_SEPARATOR),
        )
    };
    let ocr = |pages: &Vec<OcrPage>| -> (Box<dyn TokenSource>, SourceKind, String) {
        let source = OcrSource::new(pages.clone(), page_sizes.to_vec());
        let text = source.page_texts().join(PAGE_SEPARATOR);
        (Box::new(source), SourceKind::Ocr, text)
    };

    match (kind, &tokens.native, &tokens.ocr) {
        (SourceKind::Ocr, _, Some(pages)) => Ok(ocr(pages)),
        (SourceKind::Ocr, Some(words), None) => {
            warn!("⚠️ Document looks scanned but no OCR tokens were supplied, using native words");
            Ok(native(words))
        }
        (SourceKind::NativeText, Some(words), _) => Ok(native(words)),
        (SourceKind::NativeText, None, Some(pages)) => {
            warn!("⚠️ No native words supplied, using OCR tokens");
            Ok(ocr(pages))
        }
        (_, None, None) => Err(DocumentError::MissingTokens(format!("{:?} tokens required", kind)).into()),
    }
}
