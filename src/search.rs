//! Search index extraction.
//!
//! Produces the flat `search-index.json` array the site's client-side search
//! reads. Two granularities:
//!
//! - **Sections** (default): one entry per `#`, `##` or `###` heading. The
//!   entry's content is the text of the blocks that follow the heading, up to
//!   the next heading of the same or a higher level. A page without such
//!   headings gets a single whole-page entry instead.
//! - **Pages**: one entry per page with the text of the whole body.
//!
//! Content is plain text, whitespace-collapsed and cut to
//! `search.snippet_chars` characters. Entries follow page order, then section
//! order within a page. Repeated headings produce repeated entries.

use crate::config::{SearchConfig, SearchMode};
use crate::markdown::{self, Block};
use crate::types::Page;
use serde::Serialize;

/// Deepest heading level that starts a section.
const MAX_SECTION_LEVEL: u8 = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEntry {
    pub page_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    /// Output file of the page, e.g. `vision.html`.
    pub url: String,
    pub content: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
}

/// Build the index for all pages, in page order.
pub fn build_index(pages: &[Page], config: &SearchConfig) -> Vec<SearchEntry> {
    pages
        .iter()
        .flat_map(|page| page_entries(page, &markdown::render(&page.body).blocks, config))
        .collect()
}

/// Entries for one page, given its rendered blocks.
pub fn page_entries(page: &Page, blocks: &[Block], config: &SearchConfig) -> Vec<SearchEntry> {
    let entry = |section: Option<(&str, &str)>, content: String| SearchEntry {
        page_title: page.title.clone(),
        section_title: section.map(|(title, _)| title.to_string()),
        section_id: section.map(|(_, id)| id.to_string()),
        url: page.output_file(),
        content: markdown::truncate_chars(&content, config.snippet_chars),
        category: page.category.clone(),
        subcategory: page.subcategory.clone(),
    };

    let sections = match config.mode {
        SearchMode::Pages => Vec::new(),
        SearchMode::Sections => sections(blocks),
    };

    if sections.is_empty() {
        return vec![entry(None, join_text(blocks))];
    }
    sections
        .into_iter()
        .map(|(title, id, content)| entry(Some((title, id)), content))
        .collect()
}

/// `(heading text, heading id, section text)` for every section heading.
fn sections(blocks: &[Block]) -> Vec<(&str, &str, String)> {
    blocks
        .iter()
        .enumerate()
        .filter_map(|(i, block)| match block {
            Block::Heading { level, id, text } if *level <= MAX_SECTION_LEVEL => {
                let body = blocks[i + 1..]
                    .iter()
                    .take_while(|b| !matches!(b, Block::Heading { level: l, .. } if l <= level))
                    .map(block_text)
                    .collect::<Vec<_>>()
                    .join(" ");
                Some((text.as_str(), id.as_str(), body))
            }
            _ => None,
        })
        .collect()
}

fn block_text(block: &Block) -> &str {
    match block {
        Block::Heading { text, .. } | Block::Text(text) => text,
    }
}

fn join_text(blocks: &[Block]) -> String {
    blocks.iter().map(block_text).collect::<Vec<_>>().join(" ")
}
