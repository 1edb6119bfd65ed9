//! Markdown rendering with heading anchors, footnotes and linkify

use lazy_static::lazy_static;
use pulldown_cmark::{html, CowStr, Event, HeadingLevel, LinkType, Options, Parser, Tag, TagEnd};
use regex::Regex;
use std::collections::HashMap;
use std::ops::Range;

use crate::config::MarkdownConfig;

lazy_static! {
    static ref BARE_URL: Regex = Regex::new(r"(?:https?://|www\.)[^\s<>]+").unwrap();
}

/// Characters that end a sentence rather than a URL
const URL_TRAILING: &[char] = &['.', ',', ':', ';', '!', '?', ')', '\'', '"'];

/// Markdown renderer configured from `MarkdownConfig`
pub struct MarkdownRenderer {
    config: MarkdownConfig,
}

/// A heading whose events are held back until its text (and so its slug) is known
struct PendingHeading<'a> {
    level: HeadingLevel,
    events: Vec<Event<'a>>,
}

/// A text event with the source range it was parsed from
struct TextPiece<'a> {
    text: CowStr<'a>,
    range: Range<usize>,
}

impl TextPiece<'_> {
    /// Text equals its source, i.e. no entity decoding or smart punctuation
    fn is_verbatim(&self, source: &str) -> bool {
        self.text.as_ref() == &source[self.range.clone()]
    }
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new(config: MarkdownConfig) -> Self {
        Self { config }
    }

    fn options(&self) -> Options {
        let mut options =
            Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
        if self.config.typographer {
            options |= Options::ENABLE_SMART_PUNCTUATION;
        }
        if self.config.footnotes {
            options |= Options::ENABLE_FOOTNOTES;
        }
        options
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options()).into_offset_iter();

        let mut events: Vec<Event> = Vec::new();
        let mut heading: Option<PendingHeading> = None;
        let mut used_ids: HashMap<String, usize> = HashMap::new();
        let mut text_run: Vec<TextPiece> = Vec::new();
        let mut in_code_block = false;
        let mut link_depth = 0usize;

        for (event, range) in parser {
            // Permalinked heading content is already inside a link
            let linkable = self.config.linkify
                && !in_code_block
                && link_depth == 0
                && !(heading.is_some() && self.config.anchors.permalink);

            let event = match event {
                Event::Text(text) if linkable => {
                    text_run.push(TextPiece { text, range });
                    continue;
                }
                other => other,
            };

            if !text_run.is_empty() {
                let mut linked = Vec::new();
                linkify_run(markdown, std::mem::take(&mut text_run), &mut linked);
                emit(&mut heading, &mut events, linked);
            }

            let mut out: Vec<Event> = Vec::with_capacity(1);

            match event {
                Event::Start(Tag::Heading { level, .. }) if self.config.anchors.enabled => {
                    heading = Some(PendingHeading {
                        level,
                        events: Vec::new(),
                    });
                    continue;
                }
                Event::End(TagEnd::Heading(_)) if heading.is_some() => {
                    if let Some(pending) = heading.take() {
                        self.flush_heading(pending, &mut used_ids, &mut events);
                    }
                    continue;
                }
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_code_block = true;
                    out.push(Event::Start(Tag::CodeBlock(kind)));
                }
                Event::End(TagEnd::CodeBlock) => {
                    in_code_block = false;
                    out.push(Event::End(TagEnd::CodeBlock));
                }
                Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) => {
                    link_depth += 1;
                    out.push(Event::Start(Tag::Link {
                        link_type,
                        dest_url,
                        title,
                        id,
                    }));
                }
                Event::End(TagEnd::Link) => {
                    link_depth = link_depth.saturating_sub(1);
                    out.push(Event::End(TagEnd::Link));
                }
                Event::Html(raw) | Event::InlineHtml(raw) if !self.config.html => {
                    out.push(Event::Text(raw));
                }
                Event::SoftBreak if self.config.breaks => out.push(Event::HardBreak),
                other => out.push(other),
            }

            emit(&mut heading, &mut events, out);
        }

        if !text_run.is_empty() {
            let mut linked = Vec::new();
            linkify_run(markdown, text_run, &mut linked);
            emit(&mut heading, &mut events, linked);
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    /// Emit a heading with a unique id, its content wrapped in a self-link
    fn flush_heading<'a>(
        &self,
        pending: PendingHeading<'a>,
        used_ids: &mut HashMap<String, usize>,
        events: &mut Vec<Event<'a>>,
    ) {
        let id = unique_slug(&heading_text(&pending.events), used_ids);

        events.push(Event::Start(Tag::Heading {
            level: pending.level,
            id: Some(CowStr::from(id.clone())),
            classes: Vec::new(),
            attrs: vec![(CowStr::Borrowed("tabindex"), Some(CowStr::Borrowed("-1")))],
        }));

        let anchors = &self.config.anchors;
        if anchors.permalink {
            events.push(Event::InlineHtml(CowStr::from(format!(
                r##"<a class="{}" href="#{}">"##,
                anchors.class, id
            ))));
        }
        events.extend(pending.events);
        if anchors.permalink {
            events.push(Event::InlineHtml(CowStr::Borrowed("</a>")));
        }
        events.push(Event::End(TagEnd::Heading(pending.level)));
    }
}

/// Append to the open heading if there is one, else to the document
fn emit<'a>(
    heading: &mut Option<PendingHeading<'a>>,
    events: &mut Vec<Event<'a>>,
    out: Vec<Event<'a>>,
) {
    match heading.as_mut() {
        Some(pending) => pending.events.extend(out),
        None => events.extend(out),
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(MarkdownConfig::default())
    }
}

/// Plain text of a heading's inline events
fn heading_text(events: &[Event]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            _ => {}
        }
    }
    text
}

/// Slug for a heading, suffixed `-1`, `-2`, ... when already used in this document
fn unique_slug(text: &str, used: &mut HashMap<String, usize>) -> String {
    let base = slug::slugify(text);
    let base = if base.is_empty() {
        "section".to_string()
    } else {
        base
    };

    let mut candidate = base.clone();
    while let Some(count) = used.get_mut(&base) {
        *count += 1;
        candidate = format!("{}-{}", base, count);
        if !used.contains_key(&candidate) {
            break;
        }
    }
    used.entry(candidate.clone()).or_insert(0);
    candidate
}

/// Link bare URLs in a run of text events, one source-contiguous group at a time
fn linkify_run<'a>(source: &str, run: Vec<TextPiece<'a>>, out: &mut Vec<Event<'a>>) {
    let mut group: Vec<TextPiece<'a>> = Vec::new();
    for piece in run {
        if group
            .last()
            .is_some_and(|last| last.range.end != piece.range.start)
        {
            linkify_group(source, std::mem::take(&mut group), out);
        }
        group.push(piece);
    }
    if !group.is_empty() {
        linkify_group(source, group, out);
    }
}

/// Match URLs against the raw source of the group so parser splits and
/// smart punctuation cannot cut or rewrite them
fn linkify_group<'a>(source: &str, group: Vec<TextPiece<'a>>, out: &mut Vec<Event<'a>>) {
    let (Some(first), Some(last)) = (group.first(), group.last()) else {
        return;
    };
    let (start, end) = (first.range.start, last.range.end);
    let raw = &source[start..end];

    let mut spans: Vec<Range<usize>> = Vec::new();
    for m in BARE_URL.find_iter(raw) {
        let url = m.as_str().trim_end_matches(URL_TRAILING);
        if url.is_empty() || url == "www." {
            continue;
        }
        let mut span = start + m.start()..start + m.start() + url.len();

        // A substituted piece is never split across a URL boundary
        for piece in group.iter().filter(|p| !p.is_verbatim(source)) {
            if piece.range.start < span.start && span.start < piece.range.end {
                span.start = piece.range.start;
            }
            if piece.range.start < span.end && span.end < piece.range.end {
                span.end = piece.range.end;
            }
        }
        if spans.last().is_some_and(|prev| span.start < prev.end) {
            continue;
        }
        spans.push(span);
    }

    if spans.is_empty() {
        out.extend(group.into_iter().map(|p| Event::Text(p.text)));
        return;
    }

    let mut cursor = start;
    for span in spans {
        if span.start > cursor {
            out.push(Event::Text(CowStr::from(rendered_text(
                source,
                &group,
                cursor..span.start,
            ))));
        }

        let url = url_text(source, &group, span.clone());
        let href = if url.starts_with("www.") {
            format!("http://{}", url)
        } else {
            url.clone()
        };
        out.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: CowStr::from(href),
            title: CowStr::from(""),
            id: CowStr::from(""),
        }));
        out.push(Event::Text(CowStr::from(url)));
        out.push(Event::End(TagEnd::Link));

        cursor = span.end;
    }

    if cursor < end {
        out.push(Event::Text(CowStr::from(rendered_text(
            source,
            &group,
            cursor..end,
        ))));
    }
}

/// Parsed text of the pieces covering `range`
fn rendered_text(source: &str, group: &[TextPiece], range: Range<usize>) -> String {
    let mut text = String::new();
    for piece in group {
        let (s, e) = (
            range.start.max(piece.range.start),
            range.end.min(piece.range.end),
        );
        if s >= e {
            continue;
        }
        if piece.is_verbatim(source) {
            text.push_str(&source[s..e]);
        } else {
            text.push_str(&piece.text);
        }
    }
    text
}

/// URL text for `range`: source characters, with entities decoded
fn url_text(source: &str, group: &[TextPiece], range: Range<usize>) -> String {
    let mut url = String::new();
    for piece in group {
        let (s, e) = (
            range.start.max(piece.range.start),
            range.end.min(piece.range.end),
        );
        if s >= e {
            continue;
        }
        if !piece.is_verbatim(source) && source[piece.range.clone()].starts_with('&') {
            url.push_str(&piece.text);
        } else {
            url.push_str(&source[s..e]);
        }
    }
    url
}
