//! Polling file watcher for live reload.

use glob::Pattern;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

use crate::generators::Project;

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Escapes a relative directory for use as a literal glob prefix.
fn literal(dir: &Path) -> String {
    Pattern::escape(&dir.to_string_lossy())
}

/// Detects added, removed and modified files by comparing modification
/// times between polls.
///
/// Patterns are glob expressions relative to the watched root, such as
/// `templates/*.html` or `articles/**/*.md`.
#[derive(Debug)]
pub struct Watcher {
    root: PathBuf,
    patterns: Vec<String>,
    last: BTreeMap<PathBuf, SystemTime>,
}

impl Watcher {
    /// Creates watcher and records the current state as the baseline.
    pub fn new(root: impl Into<PathBuf>, patterns: Vec<String>) -> Self {
        let mut watcher = Self {
            root: root.into(),
            patterns,
            last: BTreeMap::new(),
        };
        watcher.last = watcher.snapshot();
        watcher
    }

    /// Watches `templates/*.html`, `articles/**/*.md` and the config file.
    pub fn for_project(project: &Project) -> Self {
        Self::new(
            &project.root,
            vec![
                format!("{}/*.html", literal(&project.templates_dir)),
                format!("{}/**/*.md", literal(&project.articles_dir)),
                literal(&project.config_file),
            ],
        )
    }

    /// Glob patterns this watcher matches, relative to its root.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Current modification times of every matching file.
    pub fn snapshot(&self) -> BTreeMap<PathBuf, SystemTime> {
        let root = literal(&self.root);
        let mut files = BTreeMap::new();

        for pattern in &self.patterns {
            let full = format!("{}/{}", root, pattern);
            let paths = match glob::glob(&full) {
                Ok(paths) => paths,
                Err(e) => {
                    warn!("Invalid watch pattern {}: {}", pattern, e);
                    continue;
                }
            };

            for entry in paths {
                match entry {
                    Ok(path) => {
                        if path.is_file()
                            && let Some(modified) = modified_time(&path)
                        {
                            files.insert(path, modified);
                        }
                    }
                    Err(e) => debug!("Skipping unreadable path: {}", e),
                }
            }
        }

        files
    }

    /// Number of files matched at the last poll.
    pub fn tracked(&self) -> usize {
        self.last.len()
    }

    /// Returns paths that changed since the previous call, sorted.
    pub fn changed(&mut self) -> Vec<PathBuf> {
        let current = self.snapshot();

        let mut changed: Vec<PathBuf> = current
            .iter()
            .filter(|(path, modified)| self.last.get(*path) != Some(*modified))
            .map(|(path, _)| path.clone())
            .collect();
        changed.extend(
            self.last
                .keys()
                .filter(|path| !current.contains_key(*path))
                .cloned(),
        );
        changed.sort();

        if !changed.is_empty() {
            debug!("Detected {} changed files", changed.len());
        }

        self.last = current;
        changed
    }
}
