//! Shared test utilities for integration tests.
//!
//! Provides a fixture project with a config, Markdown articles and
//! templates laid out the way a real site keeps them.

#![allow(dead_code)]

use anyhow::Result;
use std::path::Path;
use tempfile::TempDir;

pub const CONFIG: &str = r#"{
    "topics": [
        {"slug": "basics", "title": "Basics"},
        {"slug": "tools", "title": "Tools"}
    ],
    "articles": [
        {"title": "Hello", "source": "basics/hello.md", "topic": "basics", "author": "ana"},
        {"title": "Editors", "source": "tools/editors.md", "topic": "tools"},
        {"title": "Shells", "source": "tools/shells.md", "topic": "tools"}
    ]
}"#;

pub const INDEX_TEMPLATE: &str = concat!(
    "<html><body><h1>Articles</h1>\n",
    "{% for topic in topics %}<h2>{{ topic.title }}</h2>\n",
    "<ul>\n",
    "{% for article in topic.articles %}<li><a href=\"{{ article.url }}\">{{ article.title }}</a></li>\n",
    "{% endfor %}</ul>\n",
    "{% endfor %}</body></html>",
);

pub const ARTICLE_TEMPLATE: &str = concat!(
    "<html><head><title>{{ article_params.title }}</title></head>",
    "<body><a href=\"{{ root }}index.html\">Back</a>\n",
    "{{ article_content }}</body></html>",
);

/// Creates a temporary project with three articles under two topics.
///
/// # Errors
///
/// Returns error if directory creation or file writes fail
pub fn create_test_project() -> Result<TempDir> {
    let dir = TempDir::new()?;
    let root = dir.path();

    write_file(root, "config.json", CONFIG)?;
    write_file(root, "templates/index.html", INDEX_TEMPLATE)?;
    write_file(root, "templates/article.html", ARTICLE_TEMPLATE)?;
    write_file(
        root,
        "articles/basics/hello.md",
        "# Hello\n\nSee [editors](../tools/editors.md).\n",
    )?;
    write_file(root, "articles/tools/editors.md", "# Editors\n\nUse *any*.\n")?;
    write_file(root, "articles/tools/shells.md", "# Shells\n")?;

    Ok(dir)
}

/// Writes file to project, creating parent directories as needed.
///
/// # Errors
///
/// Returns error if directory creation or file write fails
pub fn write_file(root: &Path, path: &str, content: &str) -> Result<()> {
    let file_path = root.join(path);
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
}
