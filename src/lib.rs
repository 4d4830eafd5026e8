//! Static site generator for Markdown articles grouped by topic.

mod config;
mod error;
mod files;
mod generators;
pub mod logging;
mod markdown;
pub mod pages;
mod paths;
pub mod serve;
mod site;
mod templates;
mod watch;

pub use config::{Config, Mode};
pub use error::{SiteError, find_site_error};
pub use files::{read_source_file, save_to_file};
pub use generators::{BuildReport, Project, build_site, generate_article_pages, generate_index_page};
pub use markdown::{LinkResolver, MarkdownRenderer};
pub use paths::{article_output_path, article_url, root_prefix};
pub use serve::{ServeOptions, serve};
pub use site::{Article, SiteConfig, Topic, TopicSection};
pub use templates::{ARTICLE_TEMPLATE, ArticleView, INDEX_TEMPLATE, TemplateRenderer};
pub use watch::Watcher;
