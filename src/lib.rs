//! # Simple Docs
//!
//! A static site generator for internal guideline documents written in
//! Markdown. The directory tree is the data source: top-level directories
//! become categories, their subdirectories become subcategories, and numeric
//! prefixes (`01_`, `2-`) set the reading order.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! ```text
//! 1. Scan      content/  →  Site     (filesystem → ordered, resolved pages)
//! 2. Generate  Site      →  site/    (HTML pages, index, search index)
//! ```
//!
//! The scan does all the deciding: metadata, slugs, ordering and prev/next
//! links are fixed before any HTML exists. Generation only renders. Each stage
//! can be tested without the other: scan tests never render, and render tests
//! build their pages by hand.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: walks the content directory, resolves every document, sorts the site |
//! | [`generate`] | Stage 2: renders pages, index and search index using Maud |
//! | [`config`] | `config.toml` loading, validation, and merging over stock defaults |
//! | [`types`] | The resolved [`types::Page`] shared by both stages |
//! | [`naming`] | `NN_name` prefix parser and file-name title cleanup |
//! | [`frontmatter`] | YAML front matter splitting and typed parsing |
//! | [`metadata`] | Title, category, order and duration resolution for one document |
//! | [`slug`] | Output file names: declared, mapped, derived, de-duplicated |
//! | [`nav`] | Previous/next links over the global page order |
//! | [`sidebar`] | Category → subcategory → page tree for display |
//! | [`markdown`] | Markdown to HTML with heading ids; plain-text block extraction |
//! | [`search`] | `search-index.json` entries per section or per page |
//! | [`template`] | Built-in layout and user-supplied HTML templates |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/). Interpolated titles,
//! category names and labels are escaped automatically, and the built-in layout
//! ships inside the binary. A user template is still possible, but it is a
//! plain HTML file with three slots rather than a template language.
//!
//! ## One Global Order
//!
//! Pages are sorted once, by category priority, subcategory, `order` and file
//! name. The sidebar, the previous/next chain and the search index all follow
//! that same order, so "next" always means the next entry in the sidebar.
//!
//! ## Slugs Are Decided Up Front
//!
//! Japanese file names do not make good URLs. Slugs come from front matter,
//! then a configurable name table, then numeric prefixes, with a short hash as
//! the last resort. Collisions are resolved in discovery order before sorting,
//! so the same tree always produces the same file names.

pub mod config;
pub mod frontmatter;
pub mod generate;
pub mod markdown;
pub mod metadata;
pub mod naming;
pub mod nav;
pub mod output;
pub mod scan;
pub mod search;
pub mod sidebar;
pub mod slug;
pub mod template;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
