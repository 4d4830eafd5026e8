//! Link resolution between articles.

use anyhow::{Result, bail};
use std::path::{Component, Path, PathBuf};

/// Rewrites relative links to Markdown articles into links to their pages.
///
/// Article pages mirror the layout of the articles directory, so a relative
/// link keeps its shape and only the `.md` extension becomes `.html`
/// (`../intro.md#usage` becomes `../intro.html#usage`).
pub struct LinkResolver {
    current_source: PathBuf,
}

impl LinkResolver {
    /// Creates resolver for the article being rendered.
    ///
    /// # Arguments
    ///
    /// * `current_source`: Source path of the article, relative to the articles directory
    pub fn new(current_source: impl AsRef<Path>) -> Self {
        Self {
            current_source: current_source.as_ref().to_path_buf(),
        }
    }

    /// Resolves an `href` value.
    ///
    /// Handles different link types:
    /// - URLs with a scheme (`https://`, `mailto:`) remain unchanged
    /// - Anchor links (`#section`) and root relative links (`/x`) remain unchanged
    /// - Relative links to `.md` files get the `.html` extension, keeping any
    ///   query string or fragment
    /// - Anything else remains unchanged
    ///
    /// # Errors
    ///
    /// Returns error if a Markdown link escapes the articles directory.
    pub fn resolve(&self, link: &str) -> Result<String> {
        if link.is_empty() || link.starts_with('#') || link.starts_with('/') || has_scheme(link) {
            return Ok(link.to_string());
        }

        let split_at = link.find(['?', '#']).unwrap_or(link.len());
        let (path_part, suffix) = link.split_at(split_at);

        let Some(stem) = path_part.strip_suffix(".md") else {
            return Ok(link.to_string());
        };

        let current_dir = self.current_source.parent().unwrap_or_else(|| Path::new(""));
        self.check_within_root(&current_dir.join(path_part))?;

        Ok(format!("{}.html{}", stem, suffix))
    }

    /// Ensures a joined path stays inside the articles directory.
    ///
    /// # Errors
    ///
    /// Returns error if `..` components climb above the root.
    fn check_within_root(&self, path: &Path) -> Result<()> {
        let mut depth: usize = 0;

        for component in path.components() {
            match component {
                Component::Normal(_) => depth += 1,
                Component::ParentDir => {
                    if depth == 0 {
                        bail!("Link escapes articles root: {}", path.display());
                    }
                    depth -= 1;
                }
                _ => {}
            }
        }

        Ok(())
    }
}

/// Returns true when the link starts with a URL scheme such as `https:`.
fn has_scheme(link: &str) -> bool {
    match link.find(':') {
        Some(colon) => {
            let scheme = &link[..colon];
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}
