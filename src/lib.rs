//! Main library file for PII redaction and anonymization
//! Provides layout-preserving redaction of PDFs (opaque overlays composited
//! onto the original pages) and text anonymization with a deterministic,
//! per-document replacement mapping.

// Configuration and core pipeline
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

// Source document access
pub mod document;

// Detection and token adapters
pub mod detection;
pub mod tokens;

// Box location and overlay
pub mod locator;
pub mod overlay;

// Text anonymization
pub mod anonymizer;

// Generated artifacts
pub mod output;
pub mod report;

// Shared utilities
pub mod utils;

// Re-exports for crate consumers
pub use anonymizer::{Anonymizer, AnonymizationResult, CategoryCounts, ReplacementMap};
pub use config::{AnonymizationMode, RedactorConfig};
pub use detection::PatternDetector;
pub use document::PdfSource;
pub use error::{Error, Result};
pub use overlay::{apply_overlay, merge, synthesize};
pub use pipeline::{AnalysisResult, AnonymizationOutcome, Pipeline, RedactionOutcome, RedactionTokens};
pub use report::PrivacyReport;
pub use tokens::{locate_targets, NativeTextSource, OcrSource, SourceKind, TokenSource};
pub use types::{Detections, PageGeometry, Rect, Token};
pub use utils::{init_logging, LogLevel};
