//! Shared test utilities for the simple-docs test suite.
//!
//! Provides fixture setup, document writers, and lookup helpers that work
//! with scan results (`Site`, `Page`).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let site = scan(tmp.path()).unwrap();
//!
//! let vision = find_page(&site, "vision");
//! assert_eq!(vision.title, "ビジョン");
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::scan::Site;
use crate::types::{DEFAULT_ORDER, Page};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write a document at `relative` under `root`, creating parent directories.
pub fn write_doc(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

/// Write `config.toml` at the content root.
pub fn write_config(root: &Path, toml: &str) {
    std::fs::write(root.join("config.toml"), toml).unwrap();
}

// =========================================================================
// Builders
// =========================================================================

/// A minimal uncategorized page with the given slug and title.
pub fn page(slug: &str, title: &str) -> Page {
    Page {
        source_path: PathBuf::from(format!("/content/{slug}.md")),
        relative_path: format!("{slug}.md"),
        file_name: format!("{slug}.md"),
        title: title.to_string(),
        category: String::new(),
        subcategory: None,
        subcategory_order: None,
        order: DEFAULT_ORDER,
        duration: None,
        tags: Vec::new(),
        date: None,
        body: format!("# {title}\n"),
        slug: slug.to_string(),
    }
}

// =========================================================================
// Site lookups: panic with a clear message on miss
// =========================================================================

/// Find a page by slug. Panics if not found.
pub fn find_page<'a>(site: &'a Site, slug: &str) -> &'a Page {
    site.find_page(slug).unwrap_or_else(|| {
        panic!("page '{slug}' not found. Available: {:?}", page_slugs(site))
    })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// All page slugs in site order.
pub fn page_slugs(site: &Site) -> Vec<&str> {
    site.pages.iter().map(|p| p.slug.as_str()).collect()
}

/// All page titles in site order.
pub fn page_titles(site: &Site) -> Vec<&str> {
    site.pages.iter().map(|p| p.title.as_str()).collect()
}
