//! Template rendering with tera
//!
//! Layouts and partials are loaded from the include roots and registered
//! under their path relative to the root. Hooks from the registry are
//! installed as tera filters and functions. With `strict_filters` off, any
//! filter a template names that tera does not know is installed as a
//! pass-through so rendering continues.

use anyhow::{Context as _, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tera::{Context, Tera};
use walkdir::WalkDir;

use crate::content::{frontmatter, ContentRecord, FrontMatter, RecordKind};
use crate::registry::{Filter, HookRegistry, Shortcode};
use crate::Site;

lazy_static! {
    static ref TAG_BODY: Regex = Regex::new(r"(?s)\{\{(.*?)\}\}|\{%(.*?)%\}").unwrap();
    static ref PIPED_FILTER: Regex = Regex::new(r"\|\s*([A-Za-z_][A-Za-z0-9_]*)").unwrap();
    static ref FILTER_BLOCK: Regex = Regex::new(r"^-?\s*filter\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap();
}

/// Name prefix for templates that come from content records
const RECORD_PREFIX: &str = "@records/";

/// Template renderer over tera
pub struct TemplateRenderer {
    tera: Tera,
    extension: String,
    strict_filters: bool,
    /// Front-matter of each include-root template, keyed by template name
    layouts: HashMap<String, FrontMatter>,
}

impl TemplateRenderer {
    /// Create a renderer with hooks installed and include roots loaded
    pub fn new(site: &Site, registry: &HookRegistry) -> Result<Self> {
        let mut tera = Tera::default();

        // Output is HTML built by filters; escaping is left to templates
        tera.autoescape_on(vec![]);

        install_hooks(&mut tera, registry);

        let mut renderer = Self {
            tera,
            extension: site.config.template.file_extension.clone(),
            strict_filters: site.config.template.strict_filters,
            layouts: HashMap::new(),
        };

        let mut templates = Vec::new();
        for root in site.include_dirs() {
            templates.extend(renderer.read_include_root(&root)?);
        }
        renderer.add_templates(templates)?;

        Ok(renderer)
    }

    /// Read every template under an include root as (name, body)
    fn read_include_root(&mut self, root: &Path) -> Result<Vec<(String, String)>> {
        if !root.exists() {
            tracing::debug!("Include root {:?} does not exist, skipping", root);
            return Ok(Vec::new());
        }

        let mut templates = Vec::new();
        for entry in WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let name = path
                .strip_prefix(root)?
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if self.layouts.contains_key(&name) {
                tracing::debug!("Template {} shadowed by an earlier include root", name);
                continue;
            }

            let source =
                fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
            let (data, body) = frontmatter::parse(&source);
            templates.push((name.clone(), body.to_string()));
            self.layouts.insert(name, data);
        }

        tracing::debug!("Loaded {} templates from {:?}", templates.len(), root);
        Ok(templates)
    }

    /// Register templates in one batch so `extends` can reference each other
    pub fn add_templates(&mut self, templates: Vec<(String, String)>) -> Result<()> {
        if templates.is_empty() {
            return Ok(());
        }
        if !self.strict_filters {
            for (_, source) in &templates {
                self.pass_through_unknown_filters(source);
            }
        }
        self.tera
            .add_raw_templates(templates)
            .context("parsing templates")?;
        Ok(())
    }

    /// Register the body of every template record
    pub fn add_record_templates(&mut self, records: &[ContentRecord]) -> Result<()> {
        self.add_record_bodies(records.iter().filter(|r| r.kind == RecordKind::Template))
    }

    /// Register the bodies of the given records as templates
    pub fn add_record_bodies<'r>(
        &mut self,
        records: impl Iterator<Item = &'r ContentRecord>,
    ) -> Result<()> {
        let templates = records
            .map(|r| (record_template_name(r), r.content.clone()))
            .collect();
        self.add_templates(templates)
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        self.tera
            .render(template_name, context)
            .with_context(|| format!("rendering {}", template_name))
    }

    /// Render a template record's own body
    pub fn render_record(&self, record: &ContentRecord, context: &Context) -> Result<String> {
        self.render(&record_template_name(record), context)
    }

    /// Template name for a layout reference: exact, or with the template extension
    pub fn resolve_layout(&self, layout: &str) -> Option<String> {
        let with_ext = format!("{}.{}", layout, self.extension);
        [layout.to_string(), with_ext]
            .into_iter()
            .find(|name| self.layouts.contains_key(name))
    }

    /// Front-matter of an include-root template
    pub fn layout_data(&self, name: &str) -> Option<&FrontMatter> {
        self.layouts.get(name)
    }

    /// Install identity filters for names tera would reject
    fn pass_through_unknown_filters(&mut self, source: &str) {
        for name in filter_names(source) {
            if self.tera.get_filter(&name).is_err() {
                tracing::debug!("Filter `{}` is not registered, passing values through", name);
                self.tera.register_filter(&name, PassThrough);
            }
        }
    }
}

fn record_template_name(record: &ContentRecord) -> String {
    format!("{}{}", RECORD_PREFIX, record.input_path)
}

/// Filter names used in `{{ x | name }}`, `{% ... | name %}` and `{% filter name %}`
fn filter_names(source: &str) -> HashSet<String> {
    let mut names = HashSet::new();
    for caps in TAG_BODY.captures_iter(source) {
        let (body, is_statement) = match (caps.get(1), caps.get(2)) {
            (Some(expr), _) => (expr.as_str(), false),
            (None, Some(stmt)) => (stmt.as_str(), true),
            (None, None) => continue,
        };
        for filter in PIPED_FILTER.captures_iter(body) {
            names.insert(filter[1].to_string());
        }
        if is_statement {
            if let Some(block) = FILTER_BLOCK.captures(body.trim_start()) {
                names.insert(block[1].to_string());
            }
        }
    }
    names
}

/// Install registry filters and shortcodes into tera
pub fn install_hooks(tera: &mut Tera, registry: &HookRegistry) {
    for (name, filter) in registry.filters() {
        tera.register_filter(name, FilterAdapter(Arc::clone(filter)));
    }
    for (name, shortcode) in registry.shortcodes() {
        tera.register_function(name, ShortcodeAdapter(Arc::clone(shortcode)));
    }
}

/// A registry filter seen through tera's filter interface
struct FilterAdapter(Arc<dyn Filter>);

impl tera::Filter for FilterAdapter {
    fn filter(&self, value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
        self.0
            .apply(value)
            .map_err(|e| tera::Error::msg(e.to_string()))
    }

    fn is_safe(&self) -> bool {
        self.0.is_safe()
    }
}

/// A registry shortcode seen as a tera function
struct ShortcodeAdapter(Arc<dyn Shortcode>);

impl tera::Function for ShortcodeAdapter {
    fn call(&self, _args: &HashMap<String, Value>) -> tera::Result<Value> {
        self.0.render().map_err(|e| tera::Error::msg(e.to_string()))
    }
}

/// Identity filter for unregistered names when strict filters are off
struct PassThrough;

impl tera::Filter for PassThrough {
    fn filter(&self, value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
        Ok(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use tempfile::TempDir;

    fn renderer_with(config: SiteConfig, files: &[(&str, &str)]) -> (TempDir, TemplateRenderer) {
        let dir = TempDir::new().unwrap();
        for (rel, content) in files {
            let path = dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        let site = Site::with_config(dir.path(), config).unwrap();
        let registry = HookRegistry::standard(&site.config).unwrap();
        let renderer = TemplateRenderer::new(&site, &registry).unwrap();
        (dir, renderer)
    }

    #[test]
    fn test_filter_names() {
        let names = filter_names(
            "{{ a | upper | tag_list }}{% for x in xs | reverse %}{% endfor %}{% filter shout %}hi{% endfilter %}",
        );
        for expected in ["upper", "tag_list", "reverse", "shout"] {
            assert!(names.contains(expected), "missing {}", expected);
        }
        assert!(filter_names("plain | text").is_empty());
    }

    #[test]
    fn test_includes_and_layout_resolution() {
        let (_dir, renderer) = renderer_with(
            SiteConfig::default(),
            &[
                ("_includes/base.liquid", "---\nsite_name: Demo\n---\n<main>{{ content }}</main>"),
                ("_includes/partials/nav.liquid", "<nav></nav>"),
            ],
        );
        assert_eq!(renderer.resolve_layout("base"), Some("base.liquid".to_string()));
        assert_eq!(renderer.resolve_layout("base.liquid"), Some("base.liquid".to_string()));
        assert_eq!(renderer.resolve_layout("missing"), None);
        assert_eq!(renderer.layout_data("base.liquid").unwrap()["site_name"], "Demo");

        let mut context = Context::new();
        context.insert("content", "<p>x</p>");
        assert_eq!(
            renderer.render("base.liquid", &context).unwrap(),
            "<main><p>x</p></main>"
        );
    }

    #[test]
    fn test_registered_hooks_render() {
        let (_dir, renderer) = renderer_with(
            SiteConfig::default(),
            &[(
                "_includes/hooks.liquid",
                "{{ tags | tag_list }}|{{ names | array_to_sentence_string }}|{{ day | date_to_string }}|{{ body | excerpt }}|{{ year() | length }}",
            )],
        );
        let mut context = Context::new();
        context.insert("tags", &vec!["a"]);
        context.insert("names", &vec!["A", "B", "C"]);
        context.insert("day", "2024-03-05");
        context.insert("body", "<h2>x</h2><p>Intro</p>");

        assert_eq!(
            renderer.render("hooks.liquid", &context).unwrap(),
            r#"<a href="/tag/a/" >a</a>|A, B, and C|5 Mar 2024|Intro...|4"#
        );
    }

    #[test]
    fn test_unknown_filter_passes_through() {
        let (_dir, renderer) = renderer_with(
            SiteConfig::default(),
            &[("_includes/page.liquid", "{{ title | smartify | upper }}")],
        );
        let mut context = Context::new();
        context.insert("title", "hello");
        assert_eq!(renderer.render("page.liquid", &context).unwrap(), "HELLO");
    }

    #[test]
    fn test_strict_filters_fail_on_unknown() {
        let mut config = SiteConfig::default();
        config.template.strict_filters = true;
        let (_dir, renderer) = renderer_with(
            config,
            &[("_includes/page.liquid", "{{ title | smartify }}")],
        );
        let mut context = Context::new();
        context.insert("title", "hello");
        assert!(renderer.render("page.liquid", &context).is_err());
    }

    #[test]
    fn test_hook_errors_surface() {
        let mut config = SiteConfig::default();
        config.filters.excerpt.fallback = crate::config::ExcerptFallback::Error;
        let (_dir, renderer) = renderer_with(
            config,
            &[("_includes/page.liquid", "{{ body | excerpt }}")],
        );
        let mut context = Context::new();
        context.insert("body", "<div></div>");
        let err = renderer.render("page.liquid", &context).unwrap_err();
        assert!(format!("{:#}", err).contains("no <p> block found"));
    }
}
