//! Site configuration: topics and the articles filed under them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;

use crate::error::SiteError;
use crate::files::read_source_file;

/// Named grouping articles are indexed under on the table of contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub slug: String,
    pub title: String,
}

/// One Markdown document plus its metadata.
///
/// Keys beyond the named fields are kept in `extra` and serialized back
/// inline, so templates see the record exactly as written in the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Markdown path relative to the articles directory.
    pub source: String,
    /// Slug of the owning topic.
    pub topic: String,
    #[serde(default)]
    pub title: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Articles sharing one topic, in config order.
#[derive(Debug, Clone, Serialize)]
pub struct TopicSection<'a> {
    pub slug: &'a str,
    pub title: &'a str,
    pub articles: Vec<&'a Article>,
}

/// Parsed `config.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub articles: Vec<Article>,
}

impl SiteConfig {
    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::MissingFile`] if the file does not exist and
    /// [`SiteError::Config`] if it is not a valid configuration document.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SiteError> {
        let path = path.as_ref();
        let raw = read_source_file(path)?;
        serde_json::from_str(&raw).map_err(|source| SiteError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses a configuration document from a string.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if parsing fails.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// Groups articles by topic slug.
    ///
    /// Groups appear in order of the first article naming each topic;
    /// articles keep config order within their group. Topics that no
    /// article references are absent.
    pub fn articles_by_topic(&self) -> Vec<(&str, Vec<&Article>)> {
        let mut groups: Vec<(&str, Vec<&Article>)> = Vec::new();
        for article in &self.articles {
            match groups.iter_mut().find(|(slug, _)| *slug == article.topic) {
                Some((_, members)) => members.push(article),
                None => groups.push((article.topic.as_str(), vec![article])),
            }
        }
        groups
    }

    /// Maps topic slug to title.
    pub fn topic_titles(&self) -> HashMap<&str, &str> {
        self.topics
            .iter()
            .map(|t| (t.slug.as_str(), t.title.as_str()))
            .collect()
    }

    /// Returns table of contents sections.
    ///
    /// Declared topics come first in declaration order, each with its
    /// articles (possibly none). Topics referenced by articles but never
    /// declared follow, titled by their slug.
    pub fn topic_sections(&self) -> Vec<TopicSection<'_>> {
        let mut grouped = self.articles_by_topic();

        let mut sections: Vec<TopicSection<'_>> = self
            .topics
            .iter()
            .map(|topic| {
                let articles = grouped
                    .iter()
                    .position(|(slug, _)| *slug == topic.slug)
                    .map(|i| grouped.remove(i).1)
                    .unwrap_or_default();
                TopicSection {
                    slug: &topic.slug,
                    title: &topic.title,
                    articles,
                }
            })
            .collect();

        sections.extend(grouped.into_iter().map(|(slug, articles)| TopicSection {
            slug,
            title: slug,
            articles,
        }));

        sections
    }
}
