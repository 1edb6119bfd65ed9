//! Collections - named result sets derived from every content record

use glob::{MatchOptions, Pattern};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::content::ContentRecord;
use crate::registry::{Collection, HookError};

/// Output of a collection, exposed to templates as `collections.<name>`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CollectionOutput {
    Records(Vec<ContentRecord>),
    Values(Vec<String>),
}

impl CollectionOutput {
    pub fn len(&self) -> usize {
        match self {
            CollectionOutput::Records(records) => records.len(),
            CollectionOutput::Values(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Records whose input path matches a glob, in engine order
pub struct PathCollection {
    name: String,
    pattern: Pattern,
}

impl PathCollection {
    pub fn new(name: &str, pattern: &str) -> Result<Self, HookError> {
        let pattern = Pattern::new(pattern).map_err(|e| HookError::Pattern {
            pattern: pattern.to_string(),
            reason: e.msg.to_string(),
        })?;
        Ok(Self {
            name: name.to_string(),
            pattern,
        })
    }

    pub fn matches(&self, record: &ContentRecord) -> bool {
        // `*` must not cross directories so `posts/*.md` stays one level deep
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        self.pattern.matches_with(&record.input_path, options)
    }
}

impl Collection for PathCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn derive(&self, records: &[ContentRecord]) -> CollectionOutput {
        CollectionOutput::Records(
            records
                .iter()
                .filter(|record| self.matches(record))
                .cloned()
                .collect(),
        )
    }
}

/// Distinct tags across all records, sorted ascending, case preserved
pub struct TagCollection;

impl Collection for TagCollection {
    fn name(&self) -> &str {
        "tags"
    }

    fn derive(&self, records: &[ContentRecord]) -> CollectionOutput {
        CollectionOutput::Values(distinct_tags(records))
    }
}

/// Sorted distinct tags of every record that declares any
pub fn distinct_tags(records: &[ContentRecord]) -> Vec<String> {
    let tags: BTreeSet<&str> = records
        .iter()
        .filter(|record| record.has_tags())
        .flat_map(|record| record.tags())
        .collect();
    tags.into_iter().map(str::to_string).collect()
}
