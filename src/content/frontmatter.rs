//! Front-matter parsing

use serde_json::{Map, Value};

/// Front-matter data: arbitrary keys as JSON values
pub type FrontMatter = Map<String, Value>;

/// Split YAML front-matter from the body.
///
/// Returns an empty map and the original content when there is no
/// front-matter block, or when the block is not valid YAML mapping syntax.
pub fn parse(content: &str) -> (FrontMatter, &str) {
    let trimmed = content.trim_start_matches('\u{feff}');
    let Some(rest) = trimmed.strip_prefix("---") else {
        return (FrontMatter::new(), content);
    };
    // `---` must be alone on its line
    let Some(rest) = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
    else {
        return (FrontMatter::new(), content);
    };

    let (yaml_content, remaining) = if let Some(body) = rest.strip_prefix("---") {
        ("", body)
    } else if let Some(end_pos) = rest.find("\n---") {
        (&rest[..end_pos], &rest[end_pos + 4..])
    } else {
        return (FrontMatter::new(), content);
    };
    // Drop the remainder of the closing fence line
    let remaining = match remaining.find('\n') {
        Some(pos) if remaining[..pos].trim().is_empty() => &remaining[pos + 1..],
        None if remaining.trim().is_empty() => "",
        _ => return (FrontMatter::new(), content),
    };

    if yaml_content.trim().is_empty() {
        return (FrontMatter::new(), remaining);
    }

    match serde_yaml::from_str::<Value>(yaml_content) {
        Ok(Value::Object(map)) => (map, remaining),
        Ok(other) => {
            tracing::warn!(
                "Front-matter is not a mapping ({}), treating as content",
                kind_of(&other)
            );
            (FrontMatter::new(), content)
        }
        Err(e) => {
            tracing::warn!(
                "Failed to parse YAML front-matter, treating as content: {}",
                e
            );
            (FrontMatter::new(), content)
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
