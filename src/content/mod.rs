//! Content module - discovers records and renders markdown

pub mod frontmatter;
pub mod loader;
mod markdown;
mod record;

pub use frontmatter::FrontMatter;
pub use loader::ContentLoader;
pub use markdown::MarkdownRenderer;
pub use record::{is_markdown_path, ContentRecord, RecordKind};
