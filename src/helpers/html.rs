//! HTML helper functions

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    /// First `<p>` block; `<p ...>` with attributes matches, `<pre>` does not
    static ref PARAGRAPH: Regex = Regex::new(r"(?is)<p(?:\s[^>]*)?>(.*?)</p>").unwrap();
}

/// Excerpt extraction failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExcerptError {
    #[error("no <p> block found")]
    NoExcerptFound,
}

/// First `length` characters of the first paragraph's inner HTML, plus `suffix`
///
/// # Examples
/// ```ignore
/// excerpt("<h1>T</h1><p>Hello</p>", 200, "...") // -> Ok("Hello...")
/// ```
pub fn excerpt(html: &str, length: usize, suffix: &str) -> Result<String, ExcerptError> {
    let inner = PARAGRAPH
        .captures(html)
        .and_then(|caps| caps.get(1))
        .ok_or(ExcerptError::NoExcerptFound)?;

    Ok(format!("{}{}", take_chars(inner.as_str(), length), suffix))
}

/// Prefix of at most `n` characters
pub fn take_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Strip HTML tags from a string
pub fn strip_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;

    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    result
}
