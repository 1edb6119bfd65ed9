//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::ConfigError;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Directory
    pub input_dir: String,
    pub output_dir: String,
    /// Directories copied verbatim into the output tree
    pub passthrough: Vec<String>,

    // Engine
    #[serde(default)]
    pub template: TemplateConfig,
    #[serde(default)]
    pub markdown: MarkdownConfig,
    #[serde(default)]
    pub collections: CollectionsConfig,
    #[serde(default)]
    pub filters: FiltersConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            input_dir: ".".to_string(),
            output_dir: "_site".to_string(),
            passthrough: vec!["assets".to_string()],

            template: TemplateConfig::default(),
            markdown: MarkdownConfig::default(),
            collections: CollectionsConfig::default(),
            filters: FiltersConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        tracing::debug!("Loaded configuration from {:?}", path.as_ref());
        Ok(config)
    }

    /// Reject option combinations the engine cannot honour
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ext = &self.template.file_extension;
        if ext.is_empty() || ext.contains('.') || ext.contains('/') {
            return Err(ConfigError::FileExtension(ext.clone()));
        }
        if self.template.dynamic_partials {
            return Err(ConfigError::DynamicPartials);
        }
        if self.template.include_roots.is_empty() {
            return Err(ConfigError::NoIncludeRoots);
        }
        for pattern in [&self.collections.posts, &self.collections.projects] {
            glob::Pattern::new(pattern).map_err(|e| ConfigError::Pattern {
                pattern: pattern.clone(),
                reason: e.msg.to_string(),
            })?;
        }
        Ok(())
    }
}

/// Templating engine options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Extension (without dot) of template records and layouts
    pub file_extension: String,
    /// Resolve include targets at render time; unsupported, must stay off
    pub dynamic_partials: bool,
    /// Fail on filters that are not registered instead of passing values through
    pub strict_filters: bool,
    /// Search paths for layouts and partials, relative to the input directory
    pub include_roots: Vec<String>,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            file_extension: "liquid".to_string(),
            dynamic_partials: false,
            strict_filters: false,
            include_roots: vec!["_includes".to_string()],
        }
    }
}

/// Markdown renderer options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Pass raw HTML through untouched
    pub html: bool,
    /// Render soft line breaks as `<br />`
    pub breaks: bool,
    /// Turn bare URLs into links
    pub linkify: bool,
    /// Smart quotes and dashes
    pub typographer: bool,
    pub footnotes: bool,
    /// Render markdown bodies through the template engine before converting
    pub template_engine: bool,
    #[serde(default)]
    pub anchors: AnchorConfig,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            html: true,
            breaks: true,
            linkify: true,
            typographer: true,
            footnotes: true,
            template_engine: false,
            anchors: AnchorConfig::default(),
        }
    }
}

/// Heading anchor options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    pub enabled: bool,
    /// Wrap each heading's content in a link to itself
    pub permalink: bool,
    pub class: String,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            permalink: true,
            class: "header-anchor".to_string(),
        }
    }
}

/// Glob patterns selecting the path-based collections
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionsConfig {
    pub posts: String,
    pub projects: String,
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            posts: "posts/**/*.md".to_string(),
            projects: "projects/**/*.md".to_string(),
        }
    }
}

/// Options for the built-in filters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FiltersConfig {
    pub tag_url_prefix: String,
    #[serde(default)]
    pub excerpt: ExcerptConfig,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            tag_url_prefix: "/tag/".to_string(),
            excerpt: ExcerptConfig::default(),
        }
    }
}

/// Excerpt filter options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExcerptConfig {
    /// Maximum number of characters kept from the paragraph
    pub length: usize,
    pub suffix: String,
    pub fallback: ExcerptFallback,
}

impl Default for ExcerptConfig {
    fn default() -> Self {
        Self {
            length: 200,
            suffix: "...".to_string(),
            fallback: ExcerptFallback::Empty,
        }
    }
}

/// What the excerpt filter yields when the input has no paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExcerptFallback {
    /// Render an empty string
    #[default]
    Empty,
    /// Truncate the tag-stripped input instead
    Truncate,
    /// Fail the render
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.output_dir, "_site");
        assert_eq!(config.passthrough, vec!["assets"]);
        assert_eq!(config.template.file_extension, "liquid");
        assert!(!config.template.dynamic_partials);
        assert!(!config.template.strict_filters);
        assert_eq!(config.template.include_roots, vec!["_includes"]);
        assert!(config.markdown.html && config.markdown.breaks && config.markdown.linkify);
        assert!(!config.markdown.template_engine);
        assert_eq!(config.filters.excerpt.length, 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
output_dir: public
template:
  strict_filters: true
markdown:
  breaks: false
  template_engine: true
  anchors:
    class: anchor
filters:
  excerpt:
    fallback: truncate
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.output_dir, "public");
        assert!(config.template.strict_filters);
        assert_eq!(config.template.file_extension, "liquid");
        assert!(!config.markdown.breaks);
        assert!(config.markdown.typographer);
        assert!(config.markdown.template_engine);
        assert_eq!(config.markdown.anchors.class, "anchor");
        assert!(config.markdown.anchors.permalink);
        assert_eq!(config.filters.excerpt.fallback, ExcerptFallback::Truncate);
        assert_eq!(config.filters.excerpt.length, 200);
    }

    #[test]
    fn test_dynamic_partials_rejected() {
        let mut config = SiteConfig::default();
        config.template.dynamic_partials = true;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DynamicPartials)
        ));
    }

    #[test]
    fn test_bad_extension_rejected() {
        let mut config = SiteConfig::default();
        config.template.file_extension = ".liquid".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::FileExtension(_))
        ));
    }

    #[test]
    fn test_bad_pattern_rejected() {
        let mut config = SiteConfig::default();
        config.collections.posts = "posts/[".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Pattern { .. })));
    }
}
