//! Markdown to HTML conversion.
//!
//! Wraps pulldown-cmark with the extensions documentation pages use (tables,
//! footnotes, strikethrough, task lists, `{#id}` heading attributes) and adds
//! two passes over the event stream:
//!
//! - every heading gets an `id` (explicit `{#id}` wins, otherwise derived from
//!   its text and de-duplicated within the page) and a trailing `#` anchor link;
//! - the top-level blocks are collected as plain text, which the search index
//!   uses to split a page into sections.

use maud::html;
use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use std::collections::HashMap;

/// A rendered page body.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub html: String,
    pub blocks: Vec<Block>,
}

/// One top-level block of the document, reduced to plain text.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading { level: u8, id: String, text: String },
    Text(String),
}

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Convert Markdown to HTML, collecting top-level blocks along the way.
pub fn render(markdown: &str) -> Rendered {
    let events: Vec<Event> = Parser::new_ext(markdown, options()).collect();

    let ids = heading_ids(&events);
    let blocks = collect_blocks(&events, &ids);
    let events = attach_heading_ids(events, &ids);

    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, events.into_iter());
    Rendered { html, blocks }
}

/// Convert Markdown to HTML.
pub fn to_html(markdown: &str) -> String {
    render(markdown).html
}

/// Final id of every heading, in document order.
fn heading_ids(events: &[Event]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut ids = Vec::new();
    let mut current: Option<(Option<String>, String)> = None;

    for event in events {
        match event {
            Event::Start(Tag::Heading { id, .. }) => {
                current = Some((id.as_ref().map(|s| s.to_string()), String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, title)) = current.as_mut() {
                    title.push_str(text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((explicit, title)) = current.take() {
                    let base = explicit.unwrap_or_else(|| slugify(&title));
                    ids.push(dedupe(base, &mut seen));
                }
            }
            _ => {}
        }
    }
    ids
}

fn dedupe(base: String, seen: &mut HashMap<String, usize>) -> String {
    let count = seen.entry(base.clone()).or_insert(0);
    let id = if *count == 0 {
        base.clone()
    } else {
        format!("{base}-{count}")
    };
    *count += 1;
    if id != base {
        seen.entry(id.clone()).or_insert(1);
    }
    id
}

/// Lowercase, keep letters and digits in any script, turn whitespace and
/// other separators into single dashes. Never empty.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() || c == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "section".to_string()
    } else {
        slug
    }
}

fn attach_heading_ids<'a>(events: Vec<Event<'a>>, ids: &[String]) -> Vec<Event<'a>> {
    let mut ids = ids.iter();
    let mut current_id: Option<String> = None;
    let mut result = Vec::with_capacity(events.len());

    for event in events {
        match event {
            Event::Start(Tag::Heading {
                level,
                classes,
                attrs,
                ..
            }) => {
                let id = ids.next().cloned();
                current_id = id.clone();
                result.push(Event::Start(Tag::Heading {
                    level,
                    id: id.map(CowStr::from),
                    classes,
                    attrs,
                }));
            }
            Event::End(TagEnd::Heading(level)) => {
                if let Some(id) = current_id.take() {
                    let anchor = html! {
                        a.heading-anchor href=(format!("#{id}")) aria-hidden="true" { "#" }
                    };
                    result.push(Event::InlineHtml(CowStr::from(anchor.into_string())));
                }
                result.push(Event::End(TagEnd::Heading(level)));
            }
            other => result.push(other),
        }
    }
    result
}

/// Group events into top-level blocks.
fn collect_blocks(events: &[Event], ids: &[String]) -> Vec<Block> {
    let mut ids = ids.iter();
    let mut blocks = Vec::new();
    let mut depth = 0usize;
    let mut heading: Option<(u8, String)> = None;
    let mut text = String::new();

    for event in events {
        match event {
            Event::Start(tag) => {
                // Nested headings still consume an id to stay aligned.
                let id = match tag {
                    Tag::Heading { level, .. } => {
                        Some((level_number(*level), ids.next().cloned().unwrap_or_default()))
                    }
                    _ => None,
                };
                if depth == 0 {
                    text.clear();
                    heading = id;
                }
                depth += 1;
            }
            Event::End(tag_end) => {
                depth = depth.saturating_sub(1);
                if is_block_end(tag_end) {
                    push_space(&mut text);
                }
                if depth == 0 {
                    let content = normalize_whitespace(&text);
                    match heading.take() {
                        Some((level, id)) => blocks.push(Block::Heading {
                            level,
                            id,
                            text: content,
                        }),
                        None if !content.is_empty() => blocks.push(Block::Text(content)),
                        None => {}
                    }
                }
            }
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::Html(raw) => {
                text.push_str(&strip_html_tags(raw));
                push_space(&mut text);
            }
            Event::SoftBreak | Event::HardBreak => push_space(&mut text),
            _ => {}
        }
    }
    blocks
}

fn is_block_end(tag_end: &TagEnd) -> bool {
    matches!(
        tag_end,
        TagEnd::Paragraph
            | TagEnd::Heading(_)
            | TagEnd::Item
            | TagEnd::TableCell
            | TagEnd::TableRow
            | TagEnd::CodeBlock
            | TagEnd::BlockQuote(_)
    )
}

fn push_space(text: &mut String) {
    if !text.ends_with(' ') {
        text.push(' ');
    }
}

fn level_number(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Remove tags and decode the common entities.
pub fn strip_html_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                result.push(' ');
            }
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Collapse whitespace runs into single spaces and trim.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
