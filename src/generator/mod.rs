//! Generator module - renders every record and copies passthrough directories

use anyhow::{anyhow, bail, Result};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use tera::Context;
use walkdir::WalkDir;

use crate::collections::CollectionOutput;
use crate::content::{ContentRecord, MarkdownRenderer, RecordKind};
use crate::registry::HookRegistry;
use crate::templates::TemplateRenderer;
use crate::Site;

/// Counts reported after a build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Records discovered
    pub records: usize,
    /// Pages written
    pub written: usize,
    /// Records with `permalink: false`
    pub skipped: usize,
    /// Files copied from passthrough directories
    pub copied: usize,
}

/// `page` variable in the template context
#[derive(Debug, Serialize)]
struct PageData<'a> {
    url: Option<&'a str>,
    input_path: &'a str,
    date: Option<String>,
}

/// Front-matter keys plus `page`
fn page_context(record: &ContentRecord) -> Context {
    let mut context = Context::new();
    for (key, value) in &record.data {
        context.insert(key.as_str(), value);
    }
    context.insert(
        "page",
        &PageData {
            url: record.url.as_deref(),
            input_path: &record.input_path,
            date: record
                .date
                .map(|d| d.format("%Y-%m-%dT%H:%M:%S").to_string()),
        },
    );
    context
}

/// Static site generator using Tera templates
pub struct Generator<'a> {
    site: &'a Site,
    registry: HookRegistry,
    renderer: TemplateRenderer,
}

impl<'a> Generator<'a> {
    /// Create a new generator with the standard hooks registered
    pub fn new(site: &'a Site) -> Result<Self> {
        let registry = HookRegistry::standard(&site.config)?;
        Self::with_registry(site, registry)
    }

    /// Create a generator with a caller-supplied registry
    pub fn with_registry(site: &'a Site, registry: HookRegistry) -> Result<Self> {
        let renderer = TemplateRenderer::new(site, &registry)?;
        Ok(Self {
            site,
            registry,
            renderer,
        })
    }

    /// Generate the entire site
    pub fn generate(&mut self, records: &[ContentRecord]) -> Result<BuildSummary> {
        fs::create_dir_all(&self.site.output_dir)?;

        let mut summary = BuildSummary {
            records: records.len(),
            ..BuildSummary::default()
        };

        let expanded;
        let records = if self.site.config.markdown.template_engine {
            expanded = self.expand_markdown(records)?;
            expanded.as_slice()
        } else {
            records
        };

        let collections = self.registry.derive_collections(records);
        self.renderer.add_record_templates(records)?;

        for record in records {
            let Some(output_path) = record.output_path(&self.site.output_dir) else {
                tracing::debug!("Skipping {} (permalink: false)", record.input_path);
                summary.skipped += 1;
                continue;
            };

            let html = self.render_record(record, &collections)?;

            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| anyhow!("Failed to create dir {:?}: {}", parent, e))?;
            }
            fs::write(&output_path, &html)
                .map_err(|e| anyhow!("Failed to write {:?}: {}", output_path, e))?;
            tracing::debug!("Generated: {:?}", output_path);
            summary.written += 1;
        }

        summary.copied = self.copy_passthrough()?;

        Ok(summary)
    }

    /// Render markdown bodies through tera, then convert them to HTML
    ///
    /// Collections are not in scope here since they are derived from the
    /// converted records.
    fn expand_markdown(&mut self, records: &[ContentRecord]) -> Result<Vec<ContentRecord>> {
        let markdown = MarkdownRenderer::new(self.site.config.markdown.clone());

        self.renderer.add_record_bodies(
            records
                .iter()
                .filter(|r| r.kind == RecordKind::Markdown),
        )?;

        records
            .iter()
            .map(|record| {
                let mut record = record.clone();
                if record.kind == RecordKind::Markdown {
                    let body = self
                        .renderer
                        .render_record(&record, &page_context(&record))?;
                    record.content = markdown.render(&body);
                }
                Ok(record)
            })
            .collect()
    }

    /// Render a record's body, then wrap it in its layout chain
    fn render_record(
        &self,
        record: &ContentRecord,
        collections: &IndexMap<String, CollectionOutput>,
    ) -> Result<String> {
        let mut context = page_context(record);
        context.insert("collections", collections);

        let content = match record.kind {
            RecordKind::Markdown => record.content.clone(),
            RecordKind::Template => self.renderer.render_record(record, &context)?,
        };

        self.apply_layouts(record.layout(), content, context)
    }


    /// Render `content` through `layout`, following each layout's own `layout` key
    fn apply_layouts(
        &self,
        layout: Option<&str>,
        mut content: String,
        mut context: Context,
    ) -> Result<String> {
        let mut visited = HashSet::new();
        let mut next = layout.map(str::to_string);

        while let Some(layout) = next {
            let name = self.renderer.resolve_layout(&layout).ok_or_else(|| {
                anyhow!(
                    "Layout `{}` not found in {:?}",
                    layout,
                    self.site.config.template.include_roots
                )
            })?;
            if !visited.insert(name.clone()) {
                bail!("Layout `{}` includes itself", name);
            }

            let data = self.renderer.layout_data(&name);
            // Page data wins over layout data
            if let Some(data) = data {
                for (key, value) in data {
                    if key != "layout" && !context.contains_key(key) {
                        context.insert(key.as_str(), value);
                    }
                }
            }

            context.insert("content", &content);
            content = self.renderer.render(&name, &context)?;

            next = data
                .and_then(|d| d.get("layout"))
                .and_then(|v| v.as_str())
                .filter(|l| !l.is_empty())
                .map(str::to_string);
        }

        Ok(content)
    }

    /// Copy passthrough directories verbatim into the output directory
    fn copy_passthrough(&self) -> Result<usize> {
        let mut copied = 0;

        for (name, source_dir) in self.site.passthrough_dirs() {
            if !source_dir.exists() {
                tracing::debug!("Passthrough directory {:?} not found, skipping", source_dir);
                continue;
            }

            for entry in WalkDir::new(&source_dir)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if !path.is_file() {
                    continue;
                }

                let relative = path.strip_prefix(&source_dir)?;
                let dest = self.site.output_dir.join(&name).join(relative);

                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent)?;
                }

                fs::copy(path, &dest)?;
                copied += 1;
            }

            tracing::debug!("Copied passthrough directory {}", name);
        }

        Ok(copied)
    }
}
