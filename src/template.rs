//! Page layouts.
//!
//! A page is rendered into one of two layouts:
//!
//! - **Built-in**: a maud document with the sidebar, the page body, and the
//!   embedded `static/style.css` and `static/site.js`.
//! - **Custom**: an HTML file named by `template` in `config.toml`, with slots
//!   for the page title, body, and sidebar:
//!
//! ```html
//! <title>{{TITLE}}</title>
//! <aside>{{SIDEBAR}}</aside>      <!-- {{SIDEBAR_CONTENT}} also accepted -->
//! <main>{{CONTENT}}</main>
//! ```
//!
//! Custom templates are split into literal text and slots once, when loaded.
//! Slot values are never rescanned, so a title or body containing `{{CONTENT}}`
//! is output as-is. The title is HTML-escaped; body and sidebar are already HTML.
//! Unknown `{{...}}` sequences are left untouched.

use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CSS: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/site.js");

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to read template {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Template {0} has no {{{{CONTENT}}}} slot")]
    MissingContentSlot(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Title,
    Content,
    Sidebar,
}

impl Slot {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "TITLE" => Some(Slot::Title),
            "CONTENT" => Some(Slot::Content),
            "SIDEBAR" | "SIDEBAR_CONTENT" => Some(Slot::Sidebar),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Literal(String),
    Slot(Slot),
}

/// A custom template, split into literal text and slots.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Tokenize template source. Returns `None` if there is no `{{CONTENT}}` slot.
    pub fn parse(source: &str) -> Option<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = source;

        while let Some(start) = rest.find("{{") {
            let after_open = &rest[start + 2..];
            let slot = after_open
                .find("}}")
                .and_then(|end| Slot::from_name(after_open[..end].trim()).map(|s| (s, end)));
            match slot {
                Some((slot, end)) => {
                    literal.push_str(&rest[..start]);
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Slot(slot));
                    rest = &after_open[end + 2..];
                }
                None => {
                    literal.push_str(&rest[..start + 2]);
                    rest = after_open;
                }
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        segments
            .contains(&Segment::Slot(Slot::Content))
            .then_some(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Fill the slots.
    pub fn render(&self, page: &PageParts) -> String {
        let title = html! { (page.title) }.into_string();
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Slot(Slot::Title) => out.push_str(&title),
                Segment::Slot(Slot::Content) => out.push_str(page.content),
                Segment::Slot(Slot::Sidebar) => out.push_str(page.sidebar),
            }
        }
        out
    }
}

/// What goes into a layout: a plain-text title and two HTML fragments.
#[derive(Debug, Clone, Copy)]
pub struct PageParts<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub sidebar: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Layout {
    Builtin,
    Custom(Template),
}

impl Layout {
    /// Load the layout named by `template` (relative to `root`, unless
    /// absolute), or the built-in layout when none is configured.
    pub fn load(root: &Path, template: Option<&Path>) -> Result<Self, TemplateError> {
        let Some(relative) = template else {
            return Ok(Layout::Builtin);
        };
        let path = root.join(relative);
        if !path.is_file() {
            return Err(TemplateError::NotFound(path));
        }
        let source = fs::read_to_string(&path).map_err(|source| TemplateError::Read {
            path: path.clone(),
            source,
        })?;
        let template = Template::parse(&source).ok_or(TemplateError::MissingContentSlot(path))?;
        Ok(Layout::Custom(template))
    }

    pub fn render(&self, page: &PageParts) -> String {
        match self {
            Layout::Builtin => base_document(page).into_string(),
            Layout::Custom(template) => template.render(page),
        }
    }
}

/// The built-in layout.
fn base_document(page: &PageParts) -> Markup {
    html! {
        (DOCTYPE)
        html lang="ja" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (page.title) }
                style { (PreEscaped(CSS)) }
            }
            body {
                button.sidebar-toggle type="button" aria-controls="sidebar" aria-label="メニュー" {
                    span.hamburger-line {}
                    span.hamburger-line {}
                    span.hamburger-line {}
                }
                aside.sidebar #sidebar {
                    (PreEscaped(page.sidebar))
                }
                main.main-content {
                    article.content {
                        (PreEscaped(page.content))
                    }
                }
                script { (PreEscaped(JS)) }
            }
        }
    }
}
