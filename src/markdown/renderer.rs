//! Markdown rendering for article bodies.

use anyhow::{Context, Result};
use comrak::Options;
use std::path::Path;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use super::LinkResolver;
use crate::files::read_source_file;

/// Renders article Markdown to HTML.
///
/// Enables tables, strikethrough, autolinks, task lists and footnotes.
/// Fenced code blocks with a recognized language are highlighted with
/// syntect using CSS class names. Optionally rewrites links between
/// articles when configured with a [`LinkResolver`].
pub struct MarkdownRenderer<'a> {
    options: Options<'a>,
    syntax_set: SyntaxSet,
    link_resolver: Option<LinkResolver>,
}

impl<'a> MarkdownRenderer<'a> {
    /// Creates renderer with the article extension set.
    ///
    /// Raw HTML in articles is passed through; article sources are
    /// authored alongside the site and trusted.
    pub fn new() -> Self {
        let mut options = Options::default();

        options.extension.strikethrough = true;
        options.extension.table = true;
        options.extension.autolink = true;
        options.extension.tasklist = true;
        options.extension.footnotes = true;

        options.render.unsafe_ = true;

        Self {
            options,
            syntax_set: SyntaxSet::load_defaults_newlines(),
            link_resolver: None,
        }
    }

    /// Creates renderer that rewrites links to sibling articles.
    ///
    /// # Arguments
    ///
    /// * `current_source`: Source path of the article, relative to the articles directory
    pub fn with_link_resolver(current_source: impl AsRef<Path>) -> Self {
        let mut renderer = Self::new();
        renderer.link_resolver = Some(LinkResolver::new(current_source));
        renderer
    }

    /// Points link resolution at another article.
    ///
    /// Lets one renderer, and its loaded syntax definitions, be reused
    /// across every article of a build.
    pub fn set_current_source(&mut self, current_source: impl AsRef<Path>) {
        self.link_resolver = Some(LinkResolver::new(current_source));
    }

    /// Renders Markdown content to an HTML fragment.
    ///
    /// # Errors
    ///
    /// Returns error if syntax highlighting fails
    pub fn render(&self, content: &str) -> Result<String> {
        let mut html = comrak::markdown_to_html(content, &self.options);

        if let Some(resolver) = &self.link_resolver {
            html = self.rewrite_links(&html, resolver);
        }

        self.highlight_code_blocks(&html)
    }

    /// Reads and renders a Markdown file.
    ///
    /// # Errors
    ///
    /// Returns error if the file is missing, unreadable, or rendering fails
    pub fn render_file(&self, path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        let content = read_source_file(path)?;
        self.render(&content)
            .with_context(|| format!("Failed to render markdown file {}", path.display()))
    }

    /// Rewrites `href` values of anchor tags through the resolver.
    ///
    /// Links the resolver rejects are kept as written.
    fn rewrite_links(&self, html: &str, resolver: &LinkResolver) -> String {
        const ATTR: &str = "href=\"";

        let mut result = String::with_capacity(html.len());
        let mut pos = 0;

        while let Some(offset) = html[pos..].find("<a ") {
            let tag_start = pos + offset;
            let tag_end = html[tag_start..]
                .find('>')
                .map_or(html.len(), |p| tag_start + p);

            let attr_start = match html[tag_start..tag_end].find(ATTR) {
                Some(p) => tag_start + p + ATTR.len(),
                None => {
                    result.push_str(&html[pos..tag_end]);
                    pos = tag_end;
                    continue;
                }
            };

            let attr_end = match html[attr_start..].find('"') {
                Some(p) => attr_start + p,
                None => break,
            };

            let url = &html[attr_start..attr_end];
            let resolved = resolver.resolve(url).unwrap_or_else(|_| url.to_string());

            result.push_str(&html[pos..attr_start]);
            result.push_str(&resolved);
            pos = attr_end;
        }

        result.push_str(&html[pos..]);
        result
    }

    /// Replaces the contents of `<code class="language-X">` blocks with
    /// syntax highlighted markup.
    ///
    /// # Errors
    ///
    /// Returns error if highlighting a block fails
    fn highlight_code_blocks(&self, html: &str) -> Result<String> {
        const OPEN: &str = "<code class=\"language-";
        const CLOSE: &str = "</code>";

        let mut result = String::with_capacity(html.len());
        let mut last_end = 0;
        let mut search_pos = 0;

        while let Some(found) = html[search_pos..].find(OPEN) {
            let code_start = search_pos + found;
            let lang_start = code_start + OPEN.len();

            let Some(lang_len) = html[lang_start..].find('"') else {
                search_pos = lang_start;
                continue;
            };
            let lang_end = lang_start + lang_len;
            let language = &html[lang_start..lang_end];

            let Some(content_start) = html[lang_end..].find('>').map(|p| lang_end + p + 1) else {
                search_pos = lang_end;
                continue;
            };
            let Some(content_end) = html[content_start..].find(CLOSE).map(|p| content_start + p)
            else {
                search_pos = content_start;
                continue;
            };

            let code = Self::html_decode(&html[content_start..content_end]);
            let highlighted = self
                .highlight_code(&code, language)
                .with_context(|| format!("Failed to highlight {} code block", language))?;

            result.push_str(&html[last_end..code_start]);
            result.push_str(OPEN);
            result.push_str(language);
            result.push_str("\">");
            result.push_str(&highlighted);
            result.push_str(CLOSE);

            last_end = content_end + CLOSE.len();
            search_pos = last_end;
        }

        result.push_str(&html[last_end..]);
        Ok(result)
    }

    /// Highlights code with CSS classes using the `hljs-` prefix.
    ///
    /// Unknown languages fall back to escaped plain text.
    fn highlight_code(&self, code: &str, language: &str) -> Result<String> {
        if code.is_empty() {
            return Ok(String::new());
        }

        let syntax = self
            .syntax_set
            .find_syntax_by_token(language)
            .or_else(|| self.syntax_set.find_syntax_by_extension(language));

        let Some(syntax) = syntax else {
            return Ok(Self::html_escape(code));
        };

        let mut generator = ClassedHTMLGenerator::new_with_class_style(
            syntax,
            &self.syntax_set,
            ClassStyle::SpacedPrefixed { prefix: "hljs-" },
        );

        for line in LinesWithEndings::from(code) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .context("Failed to parse line for syntax highlighting")?;
        }

        Ok(generator.finalize())
    }

    /// Reverses the entity escaping comrak applies inside code blocks.
    fn html_decode(html: &str) -> String {
        html.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&amp;", "&")
    }

    fn html_escape(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#39;")
    }
}

impl<'a> Default for MarkdownRenderer<'a> {
    fn default() -> Self {
        Self::new()
    }
}
