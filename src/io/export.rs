//! Write download tables to disk.
//!
//! The bytes are produced by `report::format`; this module only places them.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::AppError;
use crate::report::format::Download;

/// Write `download` into `dir` under its own file name, creating `dir` if needed.
pub fn write_download(dir: &Path, download: &Download) -> Result<PathBuf, AppError> {
    fs::create_dir_all(dir)
        .map_err(|e| AppError::io(format!("Failed to create export directory '{}': {e}", dir.display())))?;

    let path = dir.join(&download.file_name);
    fs::write(&path, &download.bytes)
        .map_err(|e| AppError::io(format!("Failed to write export CSV '{}': {e}", path.display())))?;

    info!(path = %path.display(), bytes = download.bytes.len(), "wrote download");
    Ok(path)
}
