//! Hook registry - the filters, shortcodes and collections the engine calls
//!
//! Each hook is an explicit trait implementation stored in a lookup table
//! at initialization. `HookRegistry::standard` registers the built-in set;
//! the template layer installs filters and shortcodes into tera, and the
//! generator derives every collection before rendering.

mod filters;

use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

pub use filters::{
    DateToStringFilter, ExcerptFilter, SentenceFilter, TagListFilter, YearShortcode,
};

use crate::collections::{CollectionOutput, PathCollection, TagCollection};
use crate::config::SiteConfig;
use crate::content::ContentRecord;
use crate::helpers::{ExcerptError, SystemClock};

/// Errors raised by hooks or by registration
#[derive(Debug, Error)]
pub enum HookError {
    #[error("{hook}: expected {expected}, got {got}")]
    InvalidInput {
        hook: String,
        expected: &'static str,
        got: String,
    },

    #[error("excerpt: {0}")]
    NoExcerptFound(#[from] ExcerptError),

    #[error("{hook}: cannot parse {value} as a date")]
    InvalidDate { hook: String, value: String },

    #[error("a {kind} named `{name}` is already registered")]
    Duplicate { kind: &'static str, name: String },

    #[error("invalid collection pattern `{pattern}`: {reason}")]
    Pattern { pattern: String, reason: String },
}

/// A template filter: one value in, one value out
pub trait Filter: Send + Sync {
    fn name(&self) -> &str;

    fn apply(&self, value: &Value) -> Result<Value, HookError>;

    /// Output is markup and must not be escaped
    fn is_safe(&self) -> bool {
        false
    }
}

/// A template shortcode: no input, evaluated on every render
pub trait Shortcode: Send + Sync {
    fn name(&self) -> &str;

    fn render(&self) -> Result<Value, HookError>;
}

/// A named result set derived from all content records
pub trait Collection: Send + Sync {
    fn name(&self) -> &str;

    fn derive(&self, records: &[ContentRecord]) -> CollectionOutput;
}

/// Lookup tables of registered hooks, in registration order
#[derive(Default)]
pub struct HookRegistry {
    filters: IndexMap<String, Arc<dyn Filter>>,
    shortcodes: IndexMap<String, Arc<dyn Shortcode>>,
    collections: IndexMap<String, Box<dyn Collection>>,
}

impl HookRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in filters, shortcode and collections
    pub fn standard(config: &SiteConfig) -> Result<Self, HookError> {
        let mut registry = Self::new();

        registry.register_filter(ExcerptFilter::new(config.filters.excerpt.clone()))?;
        registry.register_filter(TagListFilter::new(&config.filters.tag_url_prefix))?;
        registry.register_filter(SentenceFilter)?;
        registry.register_filter(DateToStringFilter)?;

        registry.register_shortcode(YearShortcode::new(SystemClock))?;

        registry.register_collection(PathCollection::new("posts", &config.collections.posts)?)?;
        registry.register_collection(PathCollection::new(
            "projects",
            &config.collections.projects,
        )?)?;
        registry.register_collection(TagCollection)?;

        tracing::debug!(
            "Registered {} filters, {} shortcodes, {} collections",
            registry.filters.len(),
            registry.shortcodes.len(),
            registry.collections.len()
        );

        Ok(registry)
    }

    pub fn register_filter<F: Filter + 'static>(&mut self, filter: F) -> Result<(), HookError> {
        let name = filter.name().to_string();
        if self.filters.contains_key(&name) {
            return Err(HookError::Duplicate {
                kind: "filter",
                name,
            });
        }
        self.filters.insert(name, Arc::new(filter));
        Ok(())
    }

    pub fn register_shortcode<S: Shortcode + 'static>(
        &mut self,
        shortcode: S,
    ) -> Result<(), HookError> {
        let name = shortcode.name().to_string();
        if self.shortcodes.contains_key(&name) {
            return Err(HookError::Duplicate {
                kind: "shortcode",
                name,
            });
        }
        self.shortcodes.insert(name, Arc::new(shortcode));
        Ok(())
    }

    pub fn register_collection<C: Collection + 'static>(
        &mut self,
        collection: C,
    ) -> Result<(), HookError> {
        let name = collection.name().to_string();
        if self.collections.contains_key(&name) {
            return Err(HookError::Duplicate {
                kind: "collection",
                name,
            });
        }
        self.collections.insert(name, Box::new(collection));
        Ok(())
    }

    pub fn filter(&self, name: &str) -> Option<&Arc<dyn Filter>> {
        self.filters.get(name)
    }

    pub fn shortcode(&self, name: &str) -> Option<&Arc<dyn Shortcode>> {
        self.shortcodes.get(name)
    }

    pub fn collection(&self, name: &str) -> Option<&dyn Collection> {
        self.collections.get(name).map(|c| c.as_ref())
    }

    pub fn filters(&self) -> impl Iterator<Item = (&str, &Arc<dyn Filter>)> {
        self.filters.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn shortcodes(&self) -> impl Iterator<Item = (&str, &Arc<dyn Shortcode>)> {
        self.shortcodes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(|k| k.as_str())
    }

    /// Derive every registered collection from the full record list
    pub fn derive_collections(
        &self,
        records: &[ContentRecord],
    ) -> IndexMap<String, CollectionOutput> {
        self.collections
            .iter()
            .map(|(name, collection)| {
                let output = collection.derive(records);
                tracing::debug!("Collection `{}`: {} entries", name, output.len());
                (name.clone(), output)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_standard_registry_hooks() {
        let registry = HookRegistry::standard(&SiteConfig::default()).unwrap();

        let filters: Vec<&str> = registry.filters().map(|(name, _)| name).collect();
        assert_eq!(
            filters,
            vec!["excerpt", "tag_list", "array_to_sentence_string", "date_to_string"]
        );
        assert!(registry.shortcode("year").is_some());
        assert!(registry.collection("posts").is_some());
        assert!(registry.collection("projects").is_some());
        assert!(registry.collection("tags").is_some());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut registry = HookRegistry::new();
        registry.register_filter(SentenceFilter).unwrap();
        let err = registry.register_filter(SentenceFilter).unwrap_err();
        assert!(matches!(err, HookError::Duplicate { kind: "filter", .. }));

        registry.register_collection(TagCollection).unwrap();
        assert!(registry.register_collection(TagCollection).is_err());
    }

    #[test]
    fn test_lookup_and_apply() {
        let registry = HookRegistry::standard(&SiteConfig::default()).unwrap();
        let filter = registry.filter("array_to_sentence_string").unwrap();
        assert_eq!(filter.apply(&json!(["A", "B"])).unwrap(), json!("A and B"));
        assert!(registry.filter("missing").is_none());
    }

    #[test]
    fn test_derive_collections() {
        let registry = HookRegistry::standard(&SiteConfig::default()).unwrap();
        let records = vec![
            ContentRecord::new(
                "posts/one.md",
                json!({"tags": ["b", "a"]}).as_object().cloned().unwrap(),
                "",
            ),
            ContentRecord::new(
                "projects/tool.md",
                json!({"tags": ["a", "c"]}).as_object().cloned().unwrap(),
                "",
            ),
        ];

        let collections = registry.derive_collections(&records);
        let names: Vec<&String> = collections.keys().collect();
        assert_eq!(names, vec!["posts", "projects", "tags"]);
        assert_eq!(collections["posts"].len(), 1);
        assert_eq!(collections["projects"].len(), 1);
        assert_eq!(
            collections["tags"],
            CollectionOutput::Values(vec!["a".into(), "b".into(), "c".into()])
        );
    }
}
