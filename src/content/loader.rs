//! Content loader - discovers records in the input directory

use anyhow::{Context, Result};
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use super::{frontmatter, is_markdown_path, ContentRecord, MarkdownRenderer};
use crate::Site;

/// Loads content records from the input directory
pub struct ContentLoader<'a> {
    site: &'a Site,
    renderer: MarkdownRenderer,
    /// Directories never treated as content
    excluded: Vec<PathBuf>,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(site: &'a Site) -> Self {
        let renderer = MarkdownRenderer::new(site.config.markdown.clone());

        let mut excluded = vec![site.output_dir.clone()];
        excluded.extend(site.include_dirs());
        excluded.extend(site.passthrough_dirs().into_iter().map(|(_, dir)| dir));

        Self {
            site,
            renderer,
            excluded,
        }
    }

    /// Load every markdown and template record, in engine order
    pub fn load_records(&self) -> Result<Vec<ContentRecord>> {
        let input_dir = &self.site.input_dir;
        if !input_dir.exists() {
            anyhow::bail!("Input directory {:?} does not exist", input_dir);
        }

        let mut records = Vec::new();

        for entry in WalkDir::new(input_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !self.is_excluded(e))
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !self.is_content_file(path) {
                continue;
            }

            match self.load_record(path) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("Failed to load {:?}: {:#}", path, e);
                }
            }
        }

        records.sort_by(engine_order);
        tracing::debug!("Discovered {} records in {:?}", records.len(), input_dir);

        Ok(records)
    }

    /// Load a single record from a file
    fn load_record(&self, path: &Path) -> Result<ContentRecord> {
        let source = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
        let (data, body) = frontmatter::parse(&source);

        let input_path = path
            .strip_prefix(&self.site.input_dir)
            .unwrap_or(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        // With the markdown template engine on, conversion waits for generation
        let content = if is_markdown_path(&input_path) && !self.site.config.markdown.template_engine {
            self.renderer.render(body)
        } else {
            body.to_string()
        };

        let record = ContentRecord::new(input_path, data, content);
        tracing::debug!("Loaded {} -> {:?}", record.input_path, record.url);
        Ok(record)
    }

    fn is_excluded(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return false;
        }
        let hidden = entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('_') || name.starts_with('.'))
            .unwrap_or(false);
        hidden || self.excluded.iter().any(|dir| entry.path() == dir)
    }

    fn is_content_file(&self, path: &Path) -> bool {
        let ext = path.extension().and_then(|e| e.to_str());
        match ext {
            Some("md") | Some("markdown") => true,
            Some(ext) => ext == self.site.config.template.file_extension,
            None => false,
        }
    }
}

/// Dated records first by date, then undated; ties by input path
fn engine_order(a: &ContentRecord, b: &ContentRecord) -> Ordering {
    let by_date = match (&a.date, &b.date) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_date.then_with(|| a.input_path.cmp(&b.input_path))
}
