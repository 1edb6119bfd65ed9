//! Configuration module

mod site;

pub use site::AnchorConfig;
pub use site::CollectionsConfig;
pub use site::ExcerptConfig;
pub use site::ExcerptFallback;
pub use site::FiltersConfig;
pub use site::MarkdownConfig;
pub use site::SiteConfig;
pub use site::TemplateConfig;

use thiserror::Error;

/// Invalid engine configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("template.file_extension must be a bare extension like \"liquid\", got {0:?}")]
    FileExtension(String),

    #[error("template.dynamic_partials is not supported: include targets must be literal names")]
    DynamicPartials,

    #[error("template.include_roots must name at least one directory")]
    NoIncludeRoots,

    #[error("invalid collection pattern {pattern:?}: {reason}")]
    Pattern { pattern: String, reason: String },
}
