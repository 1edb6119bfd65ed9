//! folio: filters, collections and plugin wiring for a static site
//!
//! The crate registers template filters (`excerpt`, `tag_list`,
//! `array_to_sentence_string`, `date_to_string`), the `year` shortcode and
//! the `posts`, `projects` and `tags` collections with an engine built from
//! tera and pulldown-cmark, and copies passthrough asset directories.

pub mod collections;
pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod registry;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

pub use generator::BuildSummary;

/// A site rooted at a base directory
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Input (content) directory
    pub input_dir: PathBuf,
    /// Output directory
    pub output_dir: PathBuf,
}

impl Site {
    /// Create a site from a directory, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Self::with_config(base_dir, config)
    }

    /// Create a site with an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Result<Self> {
        config.validate()?;

        let base_dir = base_dir.as_ref().to_path_buf();
        let input_dir = resolve(&base_dir, &config.input_dir);
        let output_dir = resolve(&base_dir, &config.output_dir);

        Ok(Self {
            config,
            base_dir,
            input_dir,
            output_dir,
        })
    }

    /// Directories searched for layouts and partials
    pub fn include_dirs(&self) -> Vec<PathBuf> {
        self.config
            .template
            .include_roots
            .iter()
            .map(|root| resolve(&self.input_dir, root))
            .collect()
    }

    /// Passthrough directories as (name, source path)
    pub fn passthrough_dirs(&self) -> Vec<(String, PathBuf)> {
        self.config
            .passthrough
            .iter()
            .map(|name| (name.clone(), resolve(&self.input_dir, name)))
            .collect()
    }

    /// Build the site
    pub fn build(&self) -> Result<BuildSummary> {
        commands::build::run(self)
    }

    /// Remove the output directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}

/// Join `dir` onto `base`, treating `.` and empty as `base` itself
fn resolve(base: &Path, dir: &str) -> PathBuf {
    match dir.trim_end_matches('/') {
        "" | "." => base.to_path_buf(),
        dir => base.join(dir),
    }
}
