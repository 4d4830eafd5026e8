//! Path utilities for HTML generation

use anyhow::{Result, bail};
use std::path::{Component, Path, PathBuf};

/// Calculates the relative prefix from a page back to the site root.
///
/// Counts the directory levels of `page` (relative to the site root) and
/// repeats `../` once per level, so `index.html` yields an empty prefix and
/// `static_files/articles/intro.html` yields `../../`.
///
/// # Arguments
///
/// * `page`: Generated page path relative to the site root
///
/// # Returns
///
/// Prefix to prepend to root relative links
pub fn root_prefix(page: impl AsRef<Path>) -> String {
    let depth = page
        .as_ref()
        .parent()
        .map(|parent| {
            parent
                .components()
                .filter(|c| matches!(c, Component::Normal(_)))
                .count()
        })
        .unwrap_or(0);
    "../".repeat(depth)
}

/// Returns the output page path for an article source.
///
/// The `.md` extension is swapped for `.html`; sources without an
/// extension gain one. Only the extension changes, so `notes.md/x.md`
/// maps to `notes.md/x.html`.
pub fn article_output_path(articles_out: impl AsRef<Path>, source: &str) -> PathBuf {
    articles_out.as_ref().join(source).with_extension("html")
}

/// Returns the site root relative URL of an article page.
///
/// Uses forward slashes regardless of platform so the value is usable as
/// an `href` in templates.
pub fn article_url(articles_out: impl AsRef<Path>, source: &str) -> String {
    let page = article_output_path(articles_out, source);
    page.components()
        .filter_map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Validates an article source path.
///
/// # Errors
///
/// Returns error if the path is empty, absolute, or contains `..`, any of
/// which would place the generated page outside the output directory.
pub fn validate_source(source: &str) -> Result<()> {
    if source.is_empty() {
        bail!("Article source is empty");
    }
    let path = Path::new(source);
    if path.is_absolute() || source.starts_with('/') {
        bail!("Article source is absolute, must be relative: {}", source);
    }
    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        bail!("Article source contains directory traversal: {}", source);
    }
    Ok(())
}
