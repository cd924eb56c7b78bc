//! Shared types used across all pipeline stages.

use serde::Serialize;
use std::path::PathBuf;

/// Order assigned to documents that declare none and carry no numeric file prefix.
pub const DEFAULT_ORDER: i64 = 999;

/// One discovered document, fully resolved.
///
/// Built once per document during the scan. After construction only `slug`
/// changes, and only while collisions are being resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    /// Absolute location of the source file.
    pub source_path: PathBuf,
    /// Path relative to the content root, `/`-separated.
    pub relative_path: String,
    /// Final path component, including the `.md` extension.
    pub file_name: String,
    /// Front matter title → first `# heading` → cleaned file name.
    pub title: String,
    /// Empty string means uncategorized.
    pub category: String,
    pub subcategory: Option<String>,
    /// Numeric prefix of the raw subcategory name, used for ordering even when
    /// the stored subcategory has its prefix stripped.
    pub subcategory_order: Option<u32>,
    pub order: i64,
    /// Normalized display duration, e.g. `"5分"`.
    pub duration: Option<String>,
    pub tags: Vec<String>,
    pub date: Option<String>,
    /// Markdown with the front matter removed.
    #[serde(skip_serializing)]
    pub body: String,
    /// Output identifier without extension; unique across the site.
    pub slug: String,
}

impl Page {
    /// Output file name, e.g. `vision.html`.
    pub fn output_file(&self) -> String {
        format!("{}.html", self.slug)
    }
}
