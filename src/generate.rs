//! HTML site generation.
//!
//! Stage 2 of the build. Takes the scanned [`Site`] and writes the final
//! static site. Nothing is written until the layout has loaded.
//!
//! ## Generated Files
//!
//! - **Pages** (`/{slug}.html`): one per document, with the sidebar and
//!   previous/next links
//! - **Index page** (`/index.html`): fixed introduction plus a category overview
//! - **Search index** (`/search-index.json`): see [`crate::search`]
//!
//! ## Output Structure
//!
//! ```text
//! site/
//! ├── index.html
//! ├── vision.html
//! ├── director_mindset.html
//! ├── page_02_01.html
//! ├── faq_1.html
//! ├── faq_2.html
//! └── search-index.json
//! ```
//!
//! Existing files are overwritten; nothing else in the output directory is
//! touched.
//!
//! ## Previous/Next Links
//!
//! Pages built around an embedded video keep the links right under it: when
//! the first `<iframe>` sits directly inside a `<div>`, the links go after that
//! `div`. Otherwise they go at the end of the page.

use crate::config::SiteConfig;
use crate::markdown;
use crate::nav::PageNav;
use crate::scan::Site;
use crate::search;
use crate::sidebar::{Sidebar, SidebarSubcategory};
use crate::template::{Layout, PageParts};
use crate::types::Page;
use maud::{Markup, PreEscaped, html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Introduction shown on the index page, below the site title.
const INDEX_INTRO: &str = "\
このガイドラインは、日々の業務で判断に迷ったときの基準や考え方、進め方をまとめたものです。

左のサイドバーからカテゴリを選ぶか、検索ボックスにキーワードを入力してください。\
各ページの下にある「次へ」のリンクをたどると、すべてのページを順番に読み進められます。
";

pub const INDEX_FILE: &str = "index.html";
pub const SEARCH_INDEX_FILE: &str = "search-index.json";

/// What a build wrote.
#[derive(Debug)]
pub struct GenerateReport {
    pub output_dir: PathBuf,
    /// Markdown files found by the scan, including skipped ones.
    pub discovered: usize,
    pub skipped: usize,
    pub pages: Vec<GeneratedPage>,
    pub search_entries: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPage {
    pub title: String,
    /// Output file name, e.g. `vision.html`.
    pub file_name: String,
    /// Source path relative to the content root.
    pub source: String,
}

pub fn generate(
    site: &Site,
    layout: &Layout,
    output_dir: &Path,
) -> Result<GenerateReport, GenerateError> {
    fs::create_dir_all(output_dir)?;

    let sidebar = Sidebar::build(&site.pages, &site.config);

    let mut generated = Vec::with_capacity(site.pages.len());
    for page in &site.pages {
        let nav = site.navigation.get(&page.slug).cloned().unwrap_or_default();
        let html = render_page(page, &nav, &sidebar, &site.config, layout);
        let file_name = page.output_file();
        fs::write(output_dir.join(&file_name), html)?;
        tracing::info!("Generated {file_name}");
        generated.push(GeneratedPage {
            title: page.title.clone(),
            file_name,
            source: page.relative_path.clone(),
        });
    }

    let index_html = render_index(&site.pages, &sidebar, &site.config, layout);
    fs::write(output_dir.join(INDEX_FILE), index_html)?;
    tracing::info!("Generated {INDEX_FILE}");

    let entries = search::build_index(&site.pages, &site.config.search);
    fs::write(
        output_dir.join(SEARCH_INDEX_FILE),
        serde_json::to_string_pretty(&entries)?,
    )?;
    tracing::info!("Generated {SEARCH_INDEX_FILE} ({} entries)", entries.len());

    Ok(GenerateReport {
        output_dir: output_dir.to_path_buf(),
        discovered: site.discovered,
        skipped: site.skipped.len(),
        pages: generated,
        search_entries: entries.len(),
    })
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders one document page.
pub fn render_page(
    page: &Page,
    nav: &PageNav,
    sidebar: &Sidebar,
    config: &SiteConfig,
    layout: &Layout,
) -> String {
    let mut body = markdown::to_html(&page.body);
    if let Some(duration) = &page.duration {
        let badge = html! { span.duration-badge.page-duration { (duration) } };
        insert_after_first_heading(&mut body, &badge.into_string());
    }
    let nav_html = render_page_nav(nav, config).into_string();
    let content = insert_after_video_block(&body, &nav_html);
    let sidebar_html = render_sidebar(sidebar, config, Some(&page.slug)).into_string();

    layout.render(&PageParts {
        title: &page.title,
        content: &content,
        sidebar: &sidebar_html,
    })
}

/// Renders the index page from the fixed introduction.
fn render_index(pages: &[Page], sidebar: &Sidebar, config: &SiteConfig, layout: &Layout) -> String {
    let intro = markdown::to_html(INDEX_INTRO);
    let content = html! {
        h1 { (config.site.title) }
        @if !config.site.description.is_empty() {
            p.site-description { (config.site.description) }
        }
        (PreEscaped(intro))
        @if let Some(first) = pages.first() {
            p.start-reading {
                a href=(first.output_file()) { (config.labels.next) " " (first.title) }
            }
        }
        ul.category-overview {
            @for category in sidebar.categories.iter().filter(|c| !c.name.is_empty()) {
                @if let Some(first) = first_page(category) {
                    li {
                        a href=(first.output_file()) { (category.name) }
                    }
                }
            }
        }
    }
    .into_string();
    let sidebar_html = render_sidebar(sidebar, config, None).into_string();

    layout.render(&PageParts {
        title: &config.site.title,
        content: &content,
        sidebar: &sidebar_html,
    })
}

fn first_page<'a>(category: &crate::sidebar::SidebarCategory<'a>) -> Option<&'a Page> {
    category
        .subcategories
        .iter()
        .flat_map(|s| s.pages.iter())
        .chain(category.pages.iter())
        .next()
        .copied()
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the sidebar: site header, search box, and the category tree.
///
/// `current` is the slug of the page being rendered; its link is marked and
/// its category and subcategory are expanded. All other groups start collapsed.
pub fn render_sidebar(sidebar: &Sidebar, config: &SiteConfig, current: Option<&str>) -> Markup {
    html! {
        div.sidebar-header {
            a href=(INDEX_FILE) {
                h1 { (config.site.title) }
            }
            @if !config.site.description.is_empty() {
                p { (config.site.description) }
            }
        }
        div.sidebar-search {
            input #sidebarSearch type="search" placeholder="ページを検索..." autocomplete="off";
            ul.search-results #searchResults {}
        }
        nav.sidebar-nav {
            a.nav-item.current[current.is_none()] href=(INDEX_FILE) {
                span.nav-item-text { (config.labels.home) }
            }
            div.nav-divider {}
            @for category in &sidebar.categories {
                @if category.name.is_empty() {
                    @for sub in &category.subcategories {
                        (render_subcategory(sub, current))
                    }
                    @for page in &category.pages {
                        (render_nav_link(page, current))
                    }
                } @else {
                    @let open = current.is_some_and(|slug| category.contains(slug));
                    div.category.collapsed[!open] {
                        div.category-title { (category.name) }
                        div.category-content {
                            @for sub in &category.subcategories {
                                (render_subcategory(sub, current))
                            }
                            @for page in &category.pages {
                                (render_nav_link(page, current))
                            }
                        }
                    }
                }
            }
        }
    }
}

fn render_subcategory(sub: &SidebarSubcategory, current: Option<&str>) -> Markup {
    let open = current.is_some_and(|slug| sub.contains(slug));
    html! {
        div.subcategory-folder.collapsed[!open] {
            div.subcategory-folder-title {
                span.nav-item-text { (sub.label) }
                @if let Some(total) = &sub.total_duration {
                    span.duration-badge { (total) }
                }
            }
            div.subcategory-folder-content {
                @for page in &sub.pages {
                    (render_nav_link(page, current))
                }
            }
        }
    }
}

fn render_nav_link(page: &Page, current: Option<&str>) -> Markup {
    let is_current = current == Some(page.slug.as_str());
    html! {
        a.nav-item.current[is_current] href=(page.output_file()) {
            span.nav-item-text { (page.title) }
            @if let Some(duration) = &page.duration {
                span.duration-badge { (duration) }
            }
        }
    }
}

/// Renders the previous/next links. A missing side is an empty `span` so the
/// remaining link keeps its position.
pub fn render_page_nav(nav: &PageNav, config: &SiteConfig) -> Markup {
    html! {
        nav.page-nav {
            @if let Some(prev) = &nav.prev {
                a.nav-prev href=(prev.href()) title=(prev.title) { (config.labels.prev) }
            } @else {
                span {}
            }
            @if let Some(next) = &nav.next {
                a.nav-next href=(next.href()) title=(next.title) { (config.labels.next) }
            } @else {
                span {}
            }
        }
    }
}

// ============================================================================
// HTML splicing
// ============================================================================

/// Insert `fragment` right after the `div` that directly wraps the first
/// `<iframe>`, or append it when there is no such `div`.
pub fn insert_after_video_block(html: &str, fragment: &str) -> String {
    let at = video_block_end(html).unwrap_or(html.len());
    let mut out = String::with_capacity(html.len() + fragment.len());
    out.push_str(&html[..at]);
    out.push_str(fragment);
    out.push_str(&html[at..]);
    out
}

/// Insert `fragment` after the first `</h1>`, or at the start when the page
/// has no level-1 heading.
fn insert_after_first_heading(html: &mut String, fragment: &str) {
    let at = html.find("</h1>").map(|i| i + "</h1>".len()).unwrap_or(0);
    html.insert_str(at, fragment);
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

struct Tag {
    name: String,
    closing: bool,
    self_closing: bool,
    start: usize,
    end: usize,
}

/// Byte offset just past the closing tag of the `div` that directly contains
/// the first `<iframe>`.
fn video_block_end(html: &str) -> Option<usize> {
    let iframe_at = html.find("<iframe")?;
    let mut stack: Vec<String> = Vec::new();
    let mut target_depth: Option<usize> = None;
    let mut pos = 0;

    while let Some(tag) = next_tag(html, pos) {
        if target_depth.is_none() && tag.start >= iframe_at {
            if stack.last().map(String::as_str) != Some("div") {
                return None;
            }
            target_depth = Some(stack.len());
        }
        pos = tag.end;

        if tag.closing {
            if let Some(i) = stack.iter().rposition(|name| *name == tag.name) {
                stack.truncate(i);
                if target_depth.is_some_and(|depth| stack.len() < depth) {
                    return Some(tag.end);
                }
            }
        } else if tag.self_closing || VOID_ELEMENTS.contains(&tag.name.as_str()) {
            continue;
        } else if tag.name == "script" || tag.name == "style" {
            // Raw text: jump to the closing tag.
            let close = format!("</{}", tag.name);
            pos = html[pos..].find(&close).map_or(html.len(), |i| pos + i);
        } else {
            stack.push(tag.name);
        }
    }
    None
}

/// Next start or end tag at or after `pos`, skipping comments and declarations.
fn next_tag(html: &str, mut pos: usize) -> Option<Tag> {
    loop {
        let start = pos + html[pos..].find('<')?;
        let rest = &html[start..];
        if rest.starts_with("<!--") {
            pos = start + rest.find("-->")? + 3;
            continue;
        }
        let end = start + tag_len(rest)?;
        let inner = &html[start + 1..end - 1];
        let (closing, inner) = match inner.strip_prefix('/') {
            Some(inner) => (true, inner),
            None => (false, inner),
        };
        let name: String = inner
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        if name.is_empty() {
            pos = end;
            continue;
        }
        return Some(Tag {
            name,
            closing,
            self_closing: inner.trim_end().ends_with('/'),
            start,
            end,
        });
    }
}

/// Length of the tag at the start of `s`, including `<` and `>`. Quoted
/// attribute values may contain `>`.
fn tag_len(s: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices().skip(1) {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '>' => return Some(i + 1),
            None => {}
        }
    }
    None
}

// ============================================================================
// Tests
// ============================================================================
