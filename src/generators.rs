//! Site build pipeline: configuration in, HTML pages out.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::files::save_to_file;
use crate::markdown::MarkdownRenderer;
use crate::paths::{article_output_path, root_prefix, validate_source};
use crate::site::SiteConfig;
use crate::templates::{ArticleView, TemplateRenderer};

/// Locations of a site's inputs and outputs.
///
/// Relative paths are resolved against `root` by the accessor methods.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub root: PathBuf,
    pub config_file: PathBuf,
    pub articles_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub index_file: PathBuf,
    pub articles_out: PathBuf,
}

impl Project {
    /// Project rooted at `root` with the default layout.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config_file: PathBuf::from("config.json"),
            articles_dir: PathBuf::from("articles"),
            templates_dir: PathBuf::from("templates"),
            index_file: PathBuf::from("index.html"),
            articles_out: PathBuf::from("static_files/articles"),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(&self.config_file)
    }

    pub fn articles_path(&self) -> PathBuf {
        self.root.join(&self.articles_dir)
    }

    pub fn templates_path(&self) -> PathBuf {
        self.root.join(&self.templates_dir)
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(&self.index_file)
    }

    /// Article output directory relative to the site root.
    pub fn articles_out(&self) -> &Path {
        &self.articles_out
    }
}

/// Pages written by one build.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub index: PathBuf,
    pub articles: Vec<PathBuf>,
}

impl BuildReport {
    /// Total number of pages written.
    pub fn page_count(&self) -> usize {
        self.articles.len() + 1
    }
}

/// Renders and writes the table of contents page.
///
/// # Errors
///
/// Returns error if rendering fails or the page is empty or cannot be written.
pub fn generate_index_page(
    project: &Project,
    config: &SiteConfig,
    templates: &TemplateRenderer,
) -> Result<PathBuf> {
    let html = templates
        .render_index(config, project.articles_out())
        .context("Failed to render table of contents")?;

    let index_path = project.index_path();
    save_to_file(&html, &index_path)
        .with_context(|| format!("Failed to write index page to {}", index_path.display()))?;

    info!("Generated: {}", index_path.display());
    Ok(index_path)
}

/// Renders and writes one page per article, in config order.
///
/// Stops at the first article that fails; pages already written stay.
///
/// # Errors
///
/// Returns error if an article source is invalid or missing, or its page
/// fails to render or write.
pub fn generate_article_pages(
    project: &Project,
    config: &SiteConfig,
    templates: &TemplateRenderer,
    markdown: &mut MarkdownRenderer<'_>,
) -> Result<Vec<PathBuf>> {
    let articles_dir = project.articles_path();
    let mut written = Vec::with_capacity(config.articles.len());

    for article in &config.articles {
        validate_source(&article.source)
            .with_context(|| format!("Invalid article in topic {}", article.topic))?;

        markdown.set_current_source(&article.source);
        let content = markdown
            .render_file(articles_dir.join(&article.source))
            .with_context(|| format!("Failed to convert article {}", article.source))?;

        let page = article_output_path(project.articles_out(), &article.source);
        let view = ArticleView::new(article, project.articles_out());
        let html = templates
            .render_article(&view, &content, &root_prefix(&page))
            .with_context(|| format!("Failed to render article page {}", article.source))?;

        let output = project.root.join(&page);
        save_to_file(&html, &output)
            .with_context(|| format!("Failed to write article page {}", output.display()))?;

        info!("Generated: {}", output.display());
        written.push(output);
    }

    info!(
        "Generated {} article pages in {}",
        written.len(),
        project.root.join(project.articles_out()).display()
    );
    Ok(written)
}

/// Runs the full pipeline: config, table of contents, then articles.
///
/// # Errors
///
/// Returns the first failure of any stage.
pub fn build_site(project: &Project) -> Result<BuildReport> {
    let config_path = project.config_path();
    let config = SiteConfig::load(&config_path)
        .with_context(|| format!("Failed to load site config {}", config_path.display()))?;

    let templates = TemplateRenderer::new(project.templates_path())
        .context("Failed to load templates")?;

    let index = generate_index_page(project, &config, &templates)?;

    let mut markdown = MarkdownRenderer::default();
    let articles = generate_article_pages(project, &config, &templates, &mut markdown)?;

    Ok(BuildReport { index, articles })
}
