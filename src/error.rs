//! Error types for site generation.

use std::path::PathBuf;
use thiserror::Error;

/// Failures the build pipeline recognizes by kind.
///
/// Pipeline functions return `anyhow::Result` and wrap these with context,
/// so callers match on kind with `downcast_ref::<SiteError>()` over the
/// error chain.
#[derive(Debug, Error)]
pub enum SiteError {
    /// Rendered output was empty, nothing to write.
    #[error("Can't save data to file {}: empty data", .0.display())]
    EmptyContent(PathBuf),

    /// Input file does not exist.
    #[error("File doesn't exist: {}", .0.display())]
    MissingFile(PathBuf),

    /// Site configuration is not valid JSON or does not match the schema.
    #[error("Invalid site configuration in {}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Template failed to parse or render.
    #[error("Template error")]
    Template(#[from] tera::Error),

    /// Any other filesystem failure.
    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SiteError {
    /// Wraps an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true for the missing input file kind.
    pub fn is_missing_file(&self) -> bool {
        matches!(self, Self::MissingFile(_))
    }

    /// Returns true for the empty output kind.
    pub fn is_empty_content(&self) -> bool {
        matches!(self, Self::EmptyContent(_))
    }
}

/// Finds the first [`SiteError`] in an error chain.
pub fn find_site_error(err: &anyhow::Error) -> Option<&SiteError> {
    err.chain().find_map(|cause| cause.downcast_ref::<SiteError>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_empty_content_message_names_path() {
        // Arrange
        let err = SiteError::EmptyContent(PathBuf::from("index.html"));

        // Act
        let message = err.to_string();

        // Assert
        assert!(message.contains("empty data"), "got: {}", message);
        assert!(message.contains("index.html"), "got: {}", message);
    }

    #[test]
    fn test_find_site_error_through_context() {
        // Arrange
        let result: anyhow::Result<()> =
            Err(SiteError::MissingFile(PathBuf::from("articles/a.md")))
                .context("Failed to render article");

        // Act
        let err = result.unwrap_err();
        let found = find_site_error(&err);

        // Assert
        assert!(found.is_some(), "Should find SiteError under context");
        assert!(found.unwrap().is_missing_file());
    }

    #[test]
    fn test_find_site_error_absent() {
        // Arrange
        let err = anyhow::anyhow!("unrelated failure");

        // Act & Assert
        assert!(find_site_error(&err).is_none());
    }
}
