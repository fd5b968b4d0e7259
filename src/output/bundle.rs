//! Sanitized document plus its privacy report, packed into one ZIP archive

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;
use crate::report::{PrivacyReport, ReportFormat, ReportFormatter};
use crate::utils::write_file;

pub const REPORT_JSON_NAME: &str = "privacy_report.json";
pub const REPORT_PDF_NAME: &str = "privacy_report.pdf";

/// Archive written by [`write_bundle`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleArchive {
    pub path: PathBuf,
    /// Entry names in archive order
    pub entries: Vec<String>,
}

/// Deflate-compresses `entries` into an in-memory ZIP archive.
pub fn build_archive(entries: &[(&str, &[u8])]) -> Result<Vec<u8>> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for (name, data) in entries {
        writer.start_file(*name, options)?;
        writer.write_all(data)?;
        debug!("Added {} ({} bytes)", name, data.len());
    }

    Ok(writer.finish()?.into_inner())
}

/// Writes `document` as `document_name` together with the JSON and PDF
/// report into the archive at `path`, creating parent directories.
#[instrument(skip(document, report))]
pub async fn write_bundle(
    path: &Path,
    document_name: &str,
    document: &[u8],
    report: &PrivacyReport,
) -> Result<BundleArchive> {
    let report_json = ReportFormatter::format(report, ReportFormat::Json)?;
    let report_pdf = ReportFormatter::format(report, ReportFormat::Pdf)?;

    let entries = [
        (document_name, document),
        (REPORT_JSON_NAME, report_json.as_slice()),
        (REPORT_PDF_NAME, report_pdf.as_slice()),
    ];
    let archive = build_archive(&entries)?;
    write_file(path, &archive).await?;

    info!("📦 Bundle written to {}", path.display());
    Ok(BundleArchive {
        path: path.to_path_buf(),
        entries: entries.iter().map(|(name, _)| name.to_string()).collect(),
    })
}
