//! Reading inputs and writing generated pages.

use std::fs;
use std::path::Path;

use crate::error::SiteError;

/// Reads a UTF-8 text file.
///
/// # Errors
///
/// Returns [`SiteError::MissingFile`] if the path does not exist, or
/// [`SiteError::Io`] if it cannot be read as UTF-8 text.
pub fn read_source_file(path: impl AsRef<Path>) -> Result<String, SiteError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SiteError::MissingFile(path.to_path_buf()));
    }

    fs::read_to_string(path).map_err(|e| SiteError::io(path, e))
}

/// Writes content to a file, creating parent directories as needed.
///
/// Existing files are overwritten.
///
/// # Errors
///
/// Returns [`SiteError::EmptyContent`] if `content` is empty, or
/// [`SiteError::Io`] if directory creation or the write fails.
pub fn save_to_file(content: &str, path: impl AsRef<Path>) -> Result<(), SiteError> {
    let path = path.as_ref();
    if content.is_empty() {
        return Err(SiteError::EmptyContent(path.to_path_buf()));
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| SiteError::io(parent, e))?;
    }

    fs::write(path, content).map_err(|e| SiteError::io(path, e))
}
