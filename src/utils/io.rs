//! IO helpers for the async pipeline layer

use std::path::Path;

use tokio::fs;
use tracing::{debug, instrument};

use crate::error::{Error, Result};

/// Reads the entire contents of a file into a byte vector.
#[instrument]
pub async fn read_file(path: &Path) -> Result<Vec<u8>> {
    let data = fs::read(path).await?;
    debug!("Read {} byte(s)", data.len());
    Ok(data)
}

/// Writes a byte slice to a file, creating parent directories as needed.
#[instrument(skip(data), fields(len = data.len()))]
pub async fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    ensure_parent_dir(path).await?;
    fs::write(path, data).await?;
    Ok(())
}

/// Ensures parent directory exists for a file path.
pub async fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    Ok(())
}

/// Returns true if path has one of the allowed extensions.
pub fn has_allowed_extension(path: &Path, allowed: &[&str]) -> bool {
    match path.extension() {
        Some(ext) => allowed.iter().any(|e| ext.eq_ignore_ascii_case(*e)),
        None => false,
    }
}

/// Rejects anything that is not a `.pdf` path.
pub fn require_pdf(path: &Path) -> Result<()> {
    if has_allowed_extension(path, &["pdf"]) {
        Ok(())
    } else {
        Err(Error::ValidationError(format!(
            "only pdf files supported: {}",
            path.display()
        )))
    }
}

/// Final path component as a string, empty when there is none.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
