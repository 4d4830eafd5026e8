//! Markdown rendering for articles.
//!
//! This module converts article Markdown to HTML using comrak with the
//! common GitHub extensions (tables, strikethrough, autolinks, task lists,
//! footnotes), highlights fenced code with syntect, and rewrites relative
//! links between articles to point at their generated pages.

mod links;
mod renderer;

pub use links::LinkResolver;
pub use renderer::MarkdownRenderer;
