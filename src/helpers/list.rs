//! List helper functions for tag links and sentence lists

/// Join items as a US-English conjunction list
///
/// # Examples
/// ```ignore
/// array_to_sentence_string(&["A", "B", "C"]) // -> "A, B, and C"
/// ```
pub fn array_to_sentence_string<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [first, second] => format!("{} and {}", first.as_ref(), second.as_ref()),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(|s| s.as_ref()).collect();
            format!("{}, and {}", head.join(", "), last.as_ref())
        }
    }
}

/// Link to a tag's page: `<a href="/tag/<slug>/" >tag</a>`
pub fn tag_link(tag: &str, prefix: &str) -> String {
    format!(
        r#"<a href="{}/{}/" >{}</a>"#,
        prefix.trim_end_matches('/'),
        slug::slugify(tag),
        tag
    )
}

/// Tag links joined as a sentence
pub fn tag_list<S: AsRef<str>>(tags: &[S], prefix: &str) -> String {
    let links: Vec<String> = tags.iter().map(|t| tag_link(t.as_ref(), prefix)).collect();
    array_to_sentence_string(&links)
}
