//! Content discovery and site indexing.
//!
//! Stage 1 of the build. Walks the content root, resolves every Markdown
//! document into a [`Page`], assigns collision-free slugs, sorts the pages
//! into one global order, and chains them for prev/next navigation.
//!
//! ## Directory Structure
//!
//! ```text
//! content/                             # Content root
//! ├── config.toml                      # Site configuration (optional)
//! ├── 01_最初にみる動画/                # Category (prefix stripped → 最初にみる動画)
//! │   ├── index.md                     # Ignored (index.html is generated)
//! │   ├── 01_はじめに/                  # Subcategory
//! │   │   ├── 01_vision.md             # order 1
//! │   │   └── 02_ディレクターの心得.md
//! │   └── 02_業務/
//! │       └── 01_全体の業務プロセス.md
//! ├── 02_商談マニュアル/
//! │   └── 01_ヒアリング.md              # No subcategory
//! └── 03_その他/
//!     ├── よくある質問FAQ.md            # order 999 (no prefix)
//!     └── アーカイブ/                   # Excluded, never published
//!         └── old.md
//! ```
//!
//! ## Global Order
//!
//! Pages are sorted ascending by
//! `(category rank, subcategory rank, order, file name, relative path)`:
//!
//! - **Category rank**: position in `[categories] order`. Unlisted categories
//!   (and uncategorized pages) share the last rank.
//! - **Subcategory rank**: the subcategory's numeric prefix, or 999 when it has
//!   none or the page has no subcategory. With `sort = "lexical"` the
//!   subcategory name itself, empty for pages without one.
//! - **Relative path**: only breaks ties between identically named files in
//!   different folders.
//!
//! ## Failure Semantics
//!
//! A document that cannot be read or is not valid UTF-8 is skipped with a
//! warning and listed in [`Site::skipped`]. Only a missing content root, an
//! invalid config, or a tree with no documents at all abort the scan.

use crate::config::{self, SiteConfig, SubcategorySort};
use crate::metadata::resolve_document;
use crate::nav::Navigation;
use crate::slug::{derive_slug, resolve_collisions};
use crate::types::{DEFAULT_ORDER, Page};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Content root not found or not a directory: {0}")]
    MissingRoot(PathBuf),
    #[error("No Markdown documents found in {0}")]
    NoDocuments(PathBuf),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Output of the scan stage: every page in global order, plus navigation.
#[derive(Debug, Serialize)]
pub struct Site {
    pub pages: Vec<Page>,
    pub navigation: Navigation,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedDocument>,
    /// Markdown files found, including skipped ones.
    pub discovered: usize,
    pub config: SiteConfig,
}

impl Site {
    pub fn find_page(&self, slug: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.slug == slug)
    }
}

/// A document left out of the site, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedDocument {
    pub path: PathBuf,
    pub reason: String,
}

/// Scan a content root, loading `config.toml` from it.
pub fn scan(root: &Path) -> Result<Site, ScanError> {
    let config = config::load_config(root)?;
    scan_with_config(root, config)
}

/// Scan a content root with an already-loaded config.
pub fn scan_with_config(root: &Path, config: SiteConfig) -> Result<Site, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::MissingRoot(root.to_path_buf()));
    }

    let (documents, mut skipped) = discover(root, &config);
    let discovered = documents.len() + skipped.len();

    let mut pages = Vec::with_capacity(documents.len());
    for (path, relative_path) in documents {
        match read_page(&path, &relative_path, &config) {
            Ok(page) => pages.push(page),
            Err(reason) => {
                tracing::warn!("Skipping {}: {reason}", path.display());
                skipped.push(SkippedDocument { path, reason });
            }
        }
    }

    if pages.is_empty() {
        return Err(ScanError::NoDocuments(root.to_path_buf()));
    }

    // Collisions resolve in discovery order, before sorting.
    let initial: Vec<String> = pages.iter().map(|p| p.slug.clone()).collect();
    for (page, slug) in pages.iter_mut().zip(resolve_collisions(&initial)) {
        if page.slug != slug {
            tracing::debug!("{}: slug {} → {slug}", page.relative_path, page.slug);
        }
        page.slug = slug;
    }

    sort_pages(&mut pages, &config);
    let navigation = Navigation::build(&pages);

    tracing::info!(
        "{} documents discovered, {} pages indexed, {} skipped",
        discovered,
        pages.len(),
        skipped.len()
    );

    Ok(Site {
        pages,
        navigation,
        skipped,
        discovered,
        config,
    })
}

/// Walk the content root in file-name order, returning candidate documents
/// as `(absolute path, relative path)` pairs.
fn discover(root: &Path, config: &SiteConfig) -> (Vec<(PathBuf, String)>, Vec<SkippedDocument>) {
    let mut documents = Vec::new();
    let mut skipped = Vec::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_excluded_dir(e, config));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                tracing::warn!("Skipping {}: {e}", path.display());
                skipped.push(SkippedDocument {
                    path,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_markdown(entry.path()) {
            continue;
        }
        if config.discovery.skip_index && entry.file_name() == "index.md" {
            tracing::debug!("Ignoring {}", entry.path().display());
            continue;
        }

        match relative_path(root, entry.path()) {
            Some(rel) => documents.push((entry.into_path(), rel)),
            None => {
                let path = entry.into_path();
                tracing::warn!("Skipping {}: path is not valid UTF-8", path.display());
                skipped.push(SkippedDocument {
                    path,
                    reason: "path is not valid UTF-8".to_string(),
                });
            }
        }
    }

    (documents, skipped)
}

fn is_excluded_dir(entry: &DirEntry, config: &SiteConfig) -> bool {
    entry.file_type().is_dir()
        && entry.file_name().to_str().is_some_and(|name| {
            config
                .discovery
                .exclude_dirs
                .iter()
                .any(|excluded| excluded == name)
        })
}

fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md")
}

/// `/`-separated path relative to `root`. `None` if any component is not UTF-8.
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Option<Vec<&str>> = rel.components().map(|c| c.as_os_str().to_str()).collect();
    Some(parts?.join("/"))
}

/// Read and resolve one document. Errors are human-readable skip reasons.
fn read_page(path: &Path, relative_path: &str, config: &SiteConfig) -> Result<Page, String> {
    let bytes = fs::read(path).map_err(|e| format!("cannot read file: {e}"))?;
    let text = String::from_utf8(bytes).map_err(|_| "not valid UTF-8 text".to_string())?;

    let doc = resolve_document(relative_path, &text, &config.subcategories);
    let slug = derive_slug(relative_path, doc.declared_slug.as_deref(), &config.slugs);
    let file_name = relative_path
        .rsplit('/')
        .next()
        .unwrap_or(relative_path)
        .to_string();

    tracing::debug!("Discovered {relative_path} → {slug}.html");

    Ok(Page {
        source_path: path.to_path_buf(),
        relative_path: relative_path.to_string(),
        file_name,
        title: doc.title,
        category: doc.category,
        subcategory: doc.subcategory,
        subcategory_order: doc.subcategory_order,
        order: doc.order,
        duration: doc.duration,
        tags: doc.tags,
        date: doc.date,
        body: doc.body,
        slug,
    })
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SubcategoryKey<'a> {
    Rank(i64),
    Name(&'a str),
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct SortKey<'a> {
    category: usize,
    subcategory: SubcategoryKey<'a>,
    order: i64,
    file_name: &'a str,
    relative_path: &'a str,
}

fn sort_key<'a>(page: &'a Page, config: &SiteConfig) -> SortKey<'a> {
    let subcategory = match config.subcategories.sort {
        SubcategorySort::NumericPrefix => SubcategoryKey::Rank(
            page.subcategory
                .as_ref()
                .and(page.subcategory_order)
                .map(i64::from)
                .unwrap_or(DEFAULT_ORDER),
        ),
        SubcategorySort::Lexical => SubcategoryKey::Name(page.subcategory.as_deref().unwrap_or("")),
    };
    SortKey {
        category: config.category_rank(&page.category),
        subcategory,
        order: page.order,
        file_name: &page.file_name,
        relative_path: &page.relative_path,
    }
}

/// Sort pages into global order. Stable and total: no two distinct
/// documents compare equal.
pub fn sort_pages(pages: &mut [Page], config: &SiteConfig) {
    pages.sort_by(|a, b| sort_key(a, config).cmp(&sort_key(b, config)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    #[test]
    fn missing_root_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = scan(&tmp.path().join("nope"));
        assert!(matches!(result, Err(ScanError::MissingRoot(_))));
    }

    #[test]
    fn empty_root_is_error() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), "notes.txt", "not markdown");
        let result = scan(tmp.path());
        assert!(matches!(result, Err(ScanError::NoDocuments(_))));
    }

    #[test]
    fn fixtures_discovered_and_excluded() {
        let tmp = setup_fixtures();
        let site = scan(tmp.path()).unwrap();

        let paths: Vec<&str> = site.pages.iter().map(|p| p.relative_path.as_str()).collect();
        assert!(!paths.iter().any(|p| p.contains("アーカイブ")));
        assert!(!paths.iter().any(|p| p.ends_with("index.md")));
        assert_eq!(site.discovered, site.pages.len());
        assert!(site.skipped.is_empty());
    }

    #[test]
    fn fixtures_global_order() {
        let tmp = setup_fixtures();
        let site = scan(tmp.path()).unwrap();

        assert_eq!(
            page_slugs(&site),
            vec![
                "vision",
                "director_mindset",
                "business_process",
                "page_02_01",
                "faq_1",
                "faq_2",
                "getting-started",
                "page_04_01",
            ]
        );
    }

    #[test]
    fn fixtures_duplicate_faq_suffixed_in_discovery_order() {
        let tmp = setup_fixtures();
        let site = scan(tmp.path()).unwrap();

        assert_eq!(find_page(&site, "faq_1").relative_path, "02_商談マニュアル/02_よくある質問FAQ.md");
        assert_eq!(find_page(&site, "faq_2").relative_path, "03_その他/よくある質問FAQ.md");
    }

    #[test]
    fn category_priority_overrides_discovery_order() {
        let tmp = TempDir::new().unwrap();
        // Discovered as その他, 商談マニュアル, 最初にみる動画
        write_doc(tmp.path(), "その他/x.md", "# その他の文書");
        write_doc(tmp.path(), "商談マニュアル/y.md", "# 商談");
        write_doc(tmp.path(), "最初にみる動画/z.md", "# 動画");

        let site = scan(tmp.path()).unwrap();
        let categories: Vec<&str> = site.pages.iter().map(|p| p.category.as_str()).collect();
        assert_eq!(categories, vec!["最初にみる動画", "商談マニュアル", "その他"]);
    }

    #[test]
    fn numeric_subcategory_rank_beats_lexical() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), "01_最初にみる動画/10_後半/01_a.md", "# A");
        write_doc(tmp.path(), "01_最初にみる動画/2_前半/01_b.md", "# B");

        let site = scan(tmp.path()).unwrap();
        assert_eq!(page_titles(&site), vec!["B", "A"]);

        write_config(tmp.path(), "[subcategories]\nsort = \"lexical\"\n");
        let site = scan(tmp.path()).unwrap();
        assert_eq!(page_titles(&site), vec!["A", "B"]);
    }

    #[test]
    fn order_then_file_name() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), "その他/b.md", "---\norder: 1\n---\n# B");
        write_doc(tmp.path(), "その他/a.md", "---\norder: 1\n---\n# A");
        write_doc(tmp.path(), "その他/05_z.md", "# Z");
        write_doc(tmp.path(), "その他/c.md", "# C");

        let site = scan(tmp.path()).unwrap();
        assert_eq!(page_titles(&site), vec!["A", "B", "Z", "C"]);
    }

    #[test]
    fn sort_keys_are_monotonic() {
        let tmp = setup_fixtures();
        let site = scan(tmp.path()).unwrap();
        for pair in site.pages.windows(2) {
            assert!(sort_key(&pair[0], &site.config) < sort_key(&pair[1], &site.config));
        }
    }

    #[test]
    fn index_kept_when_configured() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), "docs/index.md", "# Index");
        write_doc(tmp.path(), "docs/other.md", "# Other");
        write_config(tmp.path(), "[discovery]\nskip_index = false\n");

        let site = scan(tmp.path()).unwrap();
        assert_eq!(site.pages.len(), 2);
    }

    #[test]
    fn page_never_takes_the_index_slug() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), "docs/01_index.md", "# Overview");
        write_doc(tmp.path(), "docs/02_setup.md", "---\nslug: index\n---\n# Setup");
        write_doc(tmp.path(), "docs/03_usage.md", "# Usage");

        let site = scan(tmp.path()).unwrap();
        assert_eq!(page_slugs(&site), vec!["index_1", "index_2", "usage"]);
        assert_eq!(find_page(&site, "index_1").title, "Overview");
    }

    #[test]
    fn custom_exclude_dirs() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), "docs/drafts/wip.md", "# WIP");
        write_doc(tmp.path(), "docs/archive/old.md", "# Old");
        write_doc(tmp.path(), "docs/live.md", "# Live");
        write_config(tmp.path(), "[discovery]\nexclude_dirs = [\"drafts\"]\n");

        let site = scan(tmp.path()).unwrap();
        assert_eq!(page_titles(&site), vec!["Live", "Old"]);
    }

    #[test]
    fn exclusion_is_case_sensitive_and_whole_name() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), "docs/ARCHIVE/a.md", "# Upper");
        write_doc(tmp.path(), "docs/archived/b.md", "# Archived");
        write_doc(tmp.path(), "docs/アーカイブ/c.md", "# Hidden");

        let site = scan(tmp.path()).unwrap();
        assert_eq!(page_titles(&site), vec!["Upper", "Archived"]);
    }

    #[test]
    fn non_utf8_document_skipped() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), "docs/good.md", "# Good");
        let bad = tmp.path().join("docs/bad.md");
        fs::write(&bad, [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let site = scan(tmp.path()).unwrap();
        assert_eq!(page_titles(&site), vec!["Good"]);
        assert_eq!(site.discovered, 2);
        assert_eq!(site.skipped.len(), 1);
        assert_eq!(site.skipped[0].path, bad);
    }

    #[test]
    fn slugs_unique_across_site() {
        let tmp = TempDir::new().unwrap();
        for dir in ["a", "b", "c"] {
            write_doc(tmp.path(), &format!("{dir}/faq.md"), "# FAQ");
            write_doc(tmp.path(), &format!("{dir}/faq_1.md"), "# FAQ one");
        }

        let site = scan(tmp.path()).unwrap();
        let mut slugs = page_slugs(&site);
        let total = slugs.len();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), total);
    }

    #[test]
    fn navigation_covers_every_page() {
        let tmp = setup_fixtures();
        let site = scan(tmp.path()).unwrap();
        assert_eq!(site.navigation.len(), site.pages.len());

        let first = site.navigation.get(&site.pages[0].slug).unwrap();
        assert!(first.prev.is_none());
        assert_eq!(first.next.as_ref().unwrap().slug, site.pages[1].slug);
    }
}
