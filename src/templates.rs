//! Page templates rendered with Tera.
//!
//! Templates live in one directory and use Jinja2 syntax. `index.html`
//! renders the table of contents and `article.html` renders one article;
//! any other `*.html` file in the directory is loaded as well so the two
//! can `{% extends %}` or `{% include %}` shared layouts.

use serde::Serialize;
use std::fs;
use std::path::Path;
use tera::{Context, Tera};

use crate::error::SiteError;
use crate::files::read_source_file;
use crate::paths::article_url;
use crate::site::{Article, SiteConfig};

/// Template rendering the table of contents.
pub const INDEX_TEMPLATE: &str = "index.html";

/// Template rendering a single article.
pub const ARTICLE_TEMPLATE: &str = "article.html";

/// Article record as templates see it.
///
/// Carries every config field of the article plus `url`, the site root
/// relative address of its generated page.
#[derive(Debug, Serialize)]
pub struct ArticleView<'a> {
    #[serde(flatten)]
    pub article: &'a Article,
    pub url: String,
}

impl<'a> ArticleView<'a> {
    pub fn new(article: &'a Article, articles_out: &Path) -> Self {
        Self {
            article,
            url: article_url(articles_out, &article.source),
        }
    }
}

#[derive(Debug, Serialize)]
struct SectionView<'a> {
    slug: &'a str,
    title: &'a str,
    articles: Vec<ArticleView<'a>>,
}

/// Loaded template set.
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Loads every `*.html` template in `dir`.
    ///
    /// Autoescaping is off: values are inserted verbatim, which is what
    /// lets `article_content` carry rendered HTML.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::MissingFile`] if the directory or one of the two
    /// required templates is absent, and [`SiteError::Template`] if any
    /// template fails to parse.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, SiteError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(SiteError::MissingFile(dir.to_path_buf()));
        }

        for required in [INDEX_TEMPLATE, ARTICLE_TEMPLATE] {
            let path = dir.join(required);
            if !path.is_file() {
                return Err(SiteError::MissingFile(path));
            }
        }

        let mut names: Vec<String> = fs::read_dir(dir)
            .map_err(|e| SiteError::io(dir, e))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.ends_with(".html"))
            .collect();
        names.sort();

        let mut sources = Vec::with_capacity(names.len());
        for name in names {
            let content = read_source_file(dir.join(&name))?;
            sources.push((name, content));
        }

        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_templates(sources)?;

        Ok(Self { tera })
    }

    /// Renders the table of contents.
    ///
    /// Context:
    /// - `articles_info`: topic slug to list of articles, in first appearance order
    /// - `topics_info`: topic slug to title
    /// - `topics`: ordered sections with `slug`, `title` and `articles`
    /// - `root`: prefix from this page to the site root (empty)
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Template`] if rendering fails.
    pub fn render_index(
        &self,
        config: &SiteConfig,
        articles_out: &Path,
    ) -> Result<String, SiteError> {
        let articles_info: serde_json::Map<String, serde_json::Value> = config
            .articles_by_topic()
            .into_iter()
            .map(|(slug, articles)| {
                let views: Vec<ArticleView<'_>> = articles
                    .into_iter()
                    .map(|a| ArticleView::new(a, articles_out))
                    .collect();
                serde_json::to_value(views).map(|v| (slug.to_string(), v))
            })
            .collect::<serde_json::Result<_>>()
            .map_err(tera::Error::json)?;

        // Keeps declaration order.
        let titles = config.topic_titles();
        let topics_info: serde_json::Map<String, serde_json::Value> = config
            .topics
            .iter()
            .filter_map(|t| titles.get_key_value(t.slug.as_str()))
            .map(|(slug, title)| (slug.to_string(), serde_json::Value::from(*title)))
            .collect();

        let topics: Vec<SectionView<'_>> = config
            .topic_sections()
            .into_iter()
            .map(|section| SectionView {
                slug: section.slug,
                title: section.title,
                articles: section
                    .articles
                    .into_iter()
                    .map(|a| ArticleView::new(a, articles_out))
                    .collect(),
            })
            .collect();

        let mut context = Context::new();
        context.insert("articles_info", &articles_info);
        context.insert("topics_info", &topics_info);
        context.insert("topics", &topics);
        context.insert("root", "");

        Ok(self.tera.render(INDEX_TEMPLATE, &context)?)
    }

    /// Renders one article page.
    ///
    /// Context:
    /// - `article_params`: the article record plus `url`
    /// - `article_content`: the article body as HTML
    /// - `root`: prefix from the article page to the site root
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Template`] if rendering fails.
    pub fn render_article(
        &self,
        article: &ArticleView<'_>,
        content: &str,
        root: &str,
    ) -> Result<String, SiteError> {
        let mut context = Context::new();
        context.insert("article_params", article);
        context.insert("article_content", content);
        context.insert("root", root);

        Ok(self.tera.render(ARTICLE_TEMPLATE, &context)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn template_dir(index: &str, article: &str) -> TempDir {
        let dir = TempDir::new().expect("Should create temp dir");
        fs::write(dir.path().join(INDEX_TEMPLATE), index).unwrap();
        fs::write(dir.path().join(ARTICLE_TEMPLATE), article).unwrap();
        dir
    }

    fn sample_config() -> SiteConfig {
        SiteConfig::from_json(
            r#"{
                "topics": [{"slug": "b", "title": "Beta"}, {"slug": "a", "title": "Alpha"}],
                "articles": [
                    {"source": "one.md", "topic": "a", "title": "One"},
                    {"source": "two.md", "topic": "b", "title": "Two", "author": "kim"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_missing_directory() {
        // Act
        let result = TemplateRenderer::new("no/such/templates");

        // Assert
        assert!(matches!(result, Err(SiteError::MissingFile(_))));
    }

    #[test]
    fn test_missing_article_template() {
        // Arrange
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(INDEX_TEMPLATE), "x").unwrap();

        // Act
        let result = TemplateRenderer::new(dir.path());

        // Assert
        match result {
            Err(SiteError::MissingFile(path)) => assert!(path.ends_with(ARTICLE_TEMPLATE)),
            other => panic!("Expected MissingFile, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_parse_error_reported() {
        // Arrange
        let dir = template_dir("{% for %}", "ok");

        // Act
        let result = TemplateRenderer::new(dir.path());

        // Assert
        assert!(matches!(result, Err(SiteError::Template(_))));
    }

    #[test]
    fn test_render_index_topics_in_declared_order() {
        // Arrange
        let dir = template_dir(
            "{% for t in topics %}[{{ t.title }}:{% for a in t.articles %}{{ a.title }}@{{ a.url }}{% endfor %}]{% endfor %}",
            "unused",
        );
        let renderer = TemplateRenderer::new(dir.path()).unwrap();

        // Act
        let html = renderer
            .render_index(&sample_config(), Path::new("static_files/articles"))
            .expect("Should render");

        // Assert
        assert_eq!(
            html,
            "[Beta:Two@static_files/articles/two.html][Alpha:One@static_files/articles/one.html]"
        );
    }

    #[test]
    fn test_render_index_jinja_style_lookups() {
        // Arrange
        let dir = template_dir(
            "{% for slug, articles in articles_info %}{{ topics_info[slug] }}={{ articles | length }};{% endfor %}",
            "unused",
        );
        let renderer = TemplateRenderer::new(dir.path()).unwrap();

        // Act
        let html = renderer
            .render_index(&sample_config(), Path::new("out"))
            .expect("Should render");

        // Assert
        assert_eq!(html, "Alpha=1;Beta=1;");
    }

    #[test]
    fn test_render_index_topics_info_keeps_declaration_order() {
        // Arrange
        let dir = template_dir(
            "{% for slug, title in topics_info %}{{ slug }}={{ title }};{% endfor %}",
            "unused",
        );
        let renderer = TemplateRenderer::new(dir.path()).unwrap();

        // Act
        let html = renderer
            .render_index(&sample_config(), Path::new("out"))
            .expect("Should render");

        // Assert
        assert_eq!(html, "b=Beta;a=Alpha;");
    }

    #[test]
    fn test_render_article_is_not_escaped() {
        // Arrange
        let dir = template_dir(
            "unused",
            "<h1>{{ article_params.title }}</h1>{{ article_content }}<a href=\"{{ root }}index.html\">{{ article_params.author }}</a>",
        );
        let renderer = TemplateRenderer::new(dir.path()).unwrap();
        let config = sample_config();
        let view = ArticleView::new(&config.articles[1], Path::new("out"));

        // Act
        let html = renderer
            .render_article(&view, "<p>Body</p>", "../")
            .expect("Should render");

        // Assert
        assert_eq!(
            html,
            "<h1>Two</h1><p>Body</p><a href=\"../index.html\">kim</a>"
        );
    }

    #[test]
    fn test_templates_can_extend_layout() {
        // Arrange
        let dir = template_dir(
            "{% extends \"base.html\" %}{% block body %}toc{% endblock body %}",
            "{% extends \"base.html\" %}{% block body %}{{ article_content }}{% endblock body %}",
        );
        fs::write(
            dir.path().join("base.html"),
            "<main>{% block body %}{% endblock body %}</main>",
        )
        .unwrap();
        let renderer = TemplateRenderer::new(dir.path()).unwrap();
        let config = sample_config();
        let view = ArticleView::new(&config.articles[0], Path::new("out"));

        // Act
        let index = renderer.render_index(&config, Path::new("out")).unwrap();
        let article = renderer.render_article(&view, "<p>x</p>", "").unwrap();

        // Assert
        assert_eq!(index, "<main>toc</main>");
        assert_eq!(article, "<main><p>x</p></main>");
    }

    #[test]
    fn test_render_error_on_unknown_variable() {
        // Arrange
        let dir = template_dir("{{ nope.field }}", "unused");
        let renderer = TemplateRenderer::new(dir.path()).unwrap();

        // Act
        let result = renderer.render_index(&sample_config(), Path::new("out"));

        // Assert
        assert!(matches!(result, Err(SiteError::Template(_))));
    }
}
