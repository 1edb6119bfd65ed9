//! Content records - the unit the engine hands to filters and collections

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

use super::FrontMatter;
use crate::helpers::parse_date_value;

/// How a record's body is turned into HTML
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Rendered by the markdown renderer at load time
    Markdown,
    /// Rendered by the template engine at generation time
    Template,
}

/// A single page or post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentRecord {
    /// Path relative to the input directory, `/`-separated
    pub input_path: String,

    /// Output URL; `None` when front-matter sets `permalink: false`
    pub url: Option<String>,

    /// Date from the `date` front-matter key
    pub date: Option<NaiveDateTime>,

    /// Front-matter
    pub data: FrontMatter,

    /// Rendered HTML for markdown, template source for templates
    pub content: String,

    pub kind: RecordKind,
}

impl ContentRecord {
    /// Create a record, deriving kind, date and URL from the path and front-matter
    pub fn new(input_path: impl Into<String>, data: FrontMatter, content: impl Into<String>) -> Self {
        let input_path = input_path.into().replace('\\', "/");
        let kind = if is_markdown_path(&input_path) {
            RecordKind::Markdown
        } else {
            RecordKind::Template
        };
        let date = data.get("date").and_then(parse_date_value);
        let url = match data.get("permalink") {
            Some(Value::Bool(false)) => None,
            Some(Value::String(permalink)) => Some(normalize_permalink(permalink)),
            _ => Some(url_for_input(&input_path)),
        };

        Self {
            input_path,
            url,
            date,
            data,
            content: content.into(),
            kind,
        }
    }

    /// Tags declared by this record; a single string counts as one tag
    pub fn tags(&self) -> Vec<&str> {
        match self.data.get("tags") {
            Some(Value::String(tag)) => vec![tag.as_str()],
            Some(Value::Array(tags)) => tags.iter().filter_map(|t| t.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    /// Whether the record declares a `tags` key at all
    pub fn has_tags(&self) -> bool {
        self.data.contains_key("tags")
    }

    pub fn title(&self) -> Option<&str> {
        self.data.get("title").and_then(|v| v.as_str())
    }

    /// Layout template name from front-matter
    pub fn layout(&self) -> Option<&str> {
        self.data
            .get("layout")
            .and_then(|v| v.as_str())
            .filter(|l| !l.is_empty())
    }

    /// Where this record is written under `output_dir`
    pub fn output_path(&self, output_dir: &Path) -> Option<PathBuf> {
        let url = self.url.as_ref()?;
        let relative = url.trim_start_matches('/');
        if url.ends_with('/') {
            Some(output_dir.join(relative).join("index.html"))
        } else {
            Some(output_dir.join(relative))
        }
    }
}

/// Check if a path is a markdown file
pub fn is_markdown_path(path: &str) -> bool {
    path.ends_with(".md") || path.ends_with(".markdown")
}

/// `posts/hello.md` → `/posts/hello/`, `about/index.md` → `/about/`, `index.md` → `/`
fn url_for_input(input_path: &str) -> String {
    let without_ext = match input_path.rfind('.') {
        Some(dot) if !input_path[dot..].contains('/') => &input_path[..dot],
        _ => input_path,
    };

    let stem = if without_ext == "index" {
        ""
    } else {
        without_ext.strip_suffix("/index").unwrap_or(without_ext)
    };

    if stem.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", stem)
    }
}

fn normalize_permalink(permalink: &str) -> String {
    format!("/{}", permalink.trim_start_matches('/'))
}
