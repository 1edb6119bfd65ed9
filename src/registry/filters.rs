//! Built-in filters and shortcodes

use serde_json::Value;

use super::{Filter, HookError, Shortcode};
use crate::config::{ExcerptConfig, ExcerptFallback};
use crate::helpers::{
    array_to_sentence_string, current_year, date_to_string, excerpt, parse_date_value,
    strip_html, tag_list, take_chars, Clock,
};

/// Sequence-of-strings input; a lone string is one item, null is none
fn string_list(hook: &str, value: &Value) -> Result<Vec<String>, HookError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                Value::Number(n) => Ok(n.to_string()),
                other => Err(invalid(hook, "a sequence of strings", other)),
            })
            .collect(),
        other => Err(invalid(hook, "a sequence of strings", other)),
    }
}

fn invalid(hook: &str, expected: &'static str, got: &Value) -> HookError {
    HookError::InvalidInput {
        hook: hook.to_string(),
        expected,
        got: got.to_string(),
    }
}

/// `excerpt`: first paragraph, truncated
pub struct ExcerptFilter {
    config: ExcerptConfig,
}

impl ExcerptFilter {
    pub fn new(config: ExcerptConfig) -> Self {
        Self { config }
    }
}

impl Filter for ExcerptFilter {
    fn name(&self) -> &str {
        "excerpt"
    }

    fn apply(&self, value: &Value) -> Result<Value, HookError> {
        let html = match value {
            Value::String(s) => s.as_str(),
            Value::Null => "",
            other => return Err(invalid(self.name(), "an HTML string", other)),
        };

        let ExcerptConfig {
            length,
            suffix,
            fallback,
        } = &self.config;

        match excerpt(html, *length, suffix) {
            Ok(text) => Ok(Value::String(text)),
            Err(e) => match fallback {
                ExcerptFallback::Empty => Ok(Value::String(String::new())),
                ExcerptFallback::Truncate => {
                    let text = strip_html(html);
                    let text = text.trim();
                    if text.is_empty() {
                        Ok(Value::String(String::new()))
                    } else {
                        Ok(Value::String(format!("{}{}", take_chars(text, *length), suffix)))
                    }
                }
                ExcerptFallback::Error => Err(e.into()),
            },
        }
    }

    fn is_safe(&self) -> bool {
        true
    }
}

/// `tag_list`: tag links joined as a sentence
pub struct TagListFilter {
    prefix: String,
}

impl TagListFilter {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }
}

impl Filter for TagListFilter {
    fn name(&self) -> &str {
        "tag_list"
    }

    fn apply(&self, value: &Value) -> Result<Value, HookError> {
        let tags = string_list(self.name(), value)?;
        Ok(Value::String(tag_list(&tags, &self.prefix)))
    }

    fn is_safe(&self) -> bool {
        true
    }
}

/// `array_to_sentence_string`: "A, B, and C"
pub struct SentenceFilter;

impl Filter for SentenceFilter {
    fn name(&self) -> &str {
        "array_to_sentence_string"
    }

    fn apply(&self, value: &Value) -> Result<Value, HookError> {
        let items = string_list(self.name(), value)?;
        Ok(Value::String(array_to_sentence_string(&items)))
    }
}

/// `date_to_string`: "5 Mar 2024"
pub struct DateToStringFilter;

impl Filter for DateToStringFilter {
    fn name(&self) -> &str {
        "date_to_string"
    }

    fn apply(&self, value: &Value) -> Result<Value, HookError> {
        let date = parse_date_value(value).ok_or_else(|| HookError::InvalidDate {
            hook: self.name().to_string(),
            value: value.to_string(),
        })?;
        Ok(Value::String(date_to_string(&date)))
    }
}

/// `year`: current year, read from the clock on every call
pub struct YearShortcode<C> {
    clock: C,
}

impl<C: Clock> YearShortcode<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> Shortcode for YearShortcode<C> {
    fn name(&self) -> &str {
        "year"
    }

    fn render(&self) -> Result<Value, HookError> {
        Ok(Value::String(current_year(&self.clock)))
    }
}
