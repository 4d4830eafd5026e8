//! Command line configuration.

use anyhow::{Result, bail};
use clap::{ArgAction, ArgGroup, Parser};
use std::path::PathBuf;
use std::time::Duration;

use crate::generators::Project;
use crate::serve::ServeOptions;

/// What a run should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Build once and exit.
    Build,
    /// Build, serve, and rebuild on change.
    LiveReload,
}

/// Command line configuration for topicpress.
#[derive(Debug, Clone, Parser)]
#[command(name = "topicpress", version, about, long_about = None)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .multiple(true)
        .args(["livereload", "build"])
))]
pub struct Config {
    /// Serve the site and rebuild when articles or templates change
    #[arg(short, long)]
    pub livereload: bool,

    /// Build the site once
    #[arg(short, long)]
    pub build: bool,

    /// Project directory holding the config, articles and templates
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Site configuration file, relative to the project directory
    #[arg(long, default_value = "config.json")]
    pub config: PathBuf,

    /// Article page output directory, relative to the project directory
    #[arg(long, default_value = "static_files/articles")]
    pub output_dir: PathBuf,

    /// Preview server host
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Preview server port
    #[arg(long, default_value_t = 5500)]
    pub port: u16,

    /// Milliseconds between checks for changed files
    #[arg(long, default_value_t = 500)]
    pub poll_interval: u64,

    /// Open the preview in the default browser
    #[arg(long)]
    pub open: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Config {
    /// Parses configuration from command line arguments.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Validates configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the project directory does not exist, the output
    /// directory escapes it, or the poll interval is zero.
    pub fn validate(&self) -> Result<()> {
        if !self.root.is_dir() {
            bail!("Project directory does not exist: {}", self.root.display());
        }
        if self.output_dir.is_absolute()
            || self
                .output_dir
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            bail!(
                "Output directory must be relative to the project: {}",
                self.output_dir.display()
            );
        }
        if self.poll_interval == 0 {
            bail!("Poll interval must be greater than zero");
        }

        Ok(())
    }

    /// Selected mode; live reload wins when both flags are given since it
    /// builds first anyway.
    pub fn mode(&self) -> Mode {
        if self.livereload {
            Mode::LiveReload
        } else {
            Mode::Build
        }
    }

    /// Project layout described by the flags.
    pub fn project(&self) -> Project {
        let mut project = Project::new(&self.root);
        project.config_file = self.config.clone();
        project.articles_out = self.output_dir.clone();
        project
    }

    /// Preview server settings described by the flags.
    pub fn serve_options(&self) -> ServeOptions {
        ServeOptions {
            host: self.host.clone(),
            port: self.port,
            poll_interval: Duration::from_millis(self.poll_interval),
            open_browser: self.open,
        }
    }
}
