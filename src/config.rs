//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. The file lives in
//! the content root and is sparse: user values are merged over the stock
//! defaults, so a config only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! # template = "_templates/page.html"   # External template (default: built-in layout)
//!
//! [site]
//! title = "ガイドライン"
//! description = ""
//!
//! [labels]
//! home = "ホーム"
//! prev = "← 前へ"
//! next = "次へ →"
//!
//! [categories]
//! order = ["最初にみる動画", "商談マニュアル", "その他"]
//!
//! [subcategories]
//! keep_prefix = true          # "01_はじめに" stays as-is on the page record
//! sort = "numeric-prefix"     # or "lexical"
//!
//! [discovery]
//! exclude_dirs = ["アーカイブ", "archive", "Archive", "_archive"]
//! skip_index = true           # ignore index.md files
//!
//! [slugs]
//! "はじめに" = "introduction"
//!
//! [search]
//! mode = "sections"           # or "pages"
//! snippet_chars = 500
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// External HTML template, relative to the content root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    pub site: SiteInfo,
    pub labels: LabelsConfig,
    pub categories: CategoriesConfig,
    pub subcategories: SubcategoriesConfig,
    pub discovery: DiscoveryConfig,
    /// Exact-match table from prefix-stripped file stem to output slug.
    pub slugs: BTreeMap<String, String>,
    pub search: SearchConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.snippet_chars == 0 {
            return Err(ConfigError::Validation(
                "search.snippet_chars must be greater than 0".into(),
            ));
        }
        if self.discovery.exclude_dirs.iter().any(|d| d.is_empty()) {
            return Err(ConfigError::Validation(
                "discovery.exclude_dirs entries must not be empty".into(),
            ));
        }
        for (name, slug) in &self.slugs {
            if !is_safe_slug(slug) {
                return Err(ConfigError::Validation(format!(
                    "slugs.\"{name}\" = \"{slug}\" must be non-empty and contain only ASCII letters, digits, '_' or '-'"
                )));
            }
        }
        if self.template.as_deref().is_some_and(str::is_empty) {
            return Err(ConfigError::Validation("template must not be empty".into()));
        }
        Ok(())
    }

    /// Rank of a category in the priority list. Unlisted categories all share
    /// the rank after the last listed one.
    pub fn category_rank(&self, category: &str) -> usize {
        self.categories
            .order
            .iter()
            .position(|c| c == category)
            .unwrap_or(self.categories.order.len())
    }
}

/// Non-empty ASCII letters, digits, `_` or `-`.
pub(crate) fn is_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Site identity shown in the sidebar header and on the index page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    pub title: String,
    pub description: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            title: "ガイドライン".to_string(),
            description: String::new(),
        }
    }
}

/// Fixed link labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabelsConfig {
    pub home: String,
    pub prev: String,
    pub next: String,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            home: "ホーム".to_string(),
            prev: "← 前へ".to_string(),
            next: "次へ →".to_string(),
        }
    }
}

/// Category priority, shared by the global page order and the sidebar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CategoriesConfig {
    pub order: Vec<String>,
}

impl Default for CategoriesConfig {
    fn default() -> Self {
        Self {
            order: vec![
                "最初にみる動画".to_string(),
                "商談マニュアル".to_string(),
                "その他".to_string(),
            ],
        }
    }
}

/// How subcategories are compared when sorting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubcategorySort {
    /// By the leading number of the subcategory folder name (`02_…` before `10_…`).
    #[default]
    NumericPrefix,
    /// By the subcategory name as a plain string.
    Lexical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SubcategoriesConfig {
    /// Keep the `NN_` prefix on `Page.subcategory` (and in the search index).
    pub keep_prefix: bool,
    pub sort: SubcategorySort,
}

impl Default for SubcategoriesConfig {
    fn default() -> Self {
        Self {
            keep_prefix: true,
            sort: SubcategorySort::NumericPrefix,
        }
    }
}

/// Which files the scan picks up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoveryConfig {
    /// Directory names whose contents are never published. Case-sensitive,
    /// matched against whole path components.
    pub exclude_dirs: Vec<String>,
    /// Ignore `index.md` files; the index page is generated.
    pub skip_index: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            exclude_dirs: vec![
                "アーカイブ".to_string(),
                "archive".to_string(),
                "Archive".to_string(),
                "_archive".to_string(),
            ],
            skip_index: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchMode {
    /// One entry per `#`, `##` or `###` section.
    #[default]
    Sections,
    /// One entry per page.
    Pages,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    pub mode: SearchMode,
    /// Maximum characters of content kept per entry.
    pub snippet_chars: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            mode: SearchMode::Sections,
            snippet_chars: 500,
        }
    }
}

/// Stock slug table for the known document names.
pub fn default_slugs() -> BTreeMap<String, String> {
    [
        ("guideline_why", "guideline_why"),
        ("vision", "vision"),
        ("はじめに", "introduction"),
        ("ディレクターの心得", "director_mindset"),
        ("全体の業務プロセス", "business_process"),
        ("コミュニケーションガイド", "communication_guide"),
        ("代表的なトラブルシューティング", "troubleshooting"),
        ("ガイドライン要点まとめ", "guideline_summary"),
        ("実践改善事例集", "improvement_cases"),
        ("新機能の使い方", "new_features"),
        ("よくある質問FAQ", "faq"),
        ("プロジェクト管理のコツ", "project_management_tips"),
        ("AIチャット", "ai-assistant"),
        ("ガイドライン追加・改善", "feedback"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// The stock slug table is part of the defaults, so user `[slugs]` entries
/// extend it rather than replace it.
pub fn stock_defaults_value() -> toml::Value {
    let stock = SiteConfig {
        slugs: default_slugs(),
        ..SiteConfig::default()
    };
    toml::Value::try_from(stock).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the content root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(root)?)
}

/// Stock configuration, identical to loading a content root without `config.toml`.
pub fn stock_config() -> SiteConfig {
    resolve_config(stock_defaults_value(), None).expect("stock config must be valid")
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Simple Docs Configuration
# ==========================
# Place this file in the content root. All settings are optional; values
# shown below are the defaults. Unknown keys cause an error.

# External HTML template, relative to the content root. The template is
# split on the slots {{TITLE}}, {{CONTENT}} and {{SIDEBAR}} (alias
# {{SIDEBAR_CONTENT}}). {{CONTENT}} is required. Omit to use the built-in layout.
# template = "_templates/page.html"

# ---------------------------------------------------------------------------
# Site identity (sidebar header, index page)
# ---------------------------------------------------------------------------
[site]
title = "ガイドライン"
description = ""

# ---------------------------------------------------------------------------
# Link labels
# ---------------------------------------------------------------------------
[labels]
home = "ホーム"
prev = "← 前へ"
next = "次へ →"

# ---------------------------------------------------------------------------
# Category priority. Used for the global page order (and so prev/next) and
# for the sidebar. Unlisted categories follow, in order of first appearance.
# ---------------------------------------------------------------------------
[categories]
order = ["最初にみる動画", "商談マニュアル", "その他"]

# ---------------------------------------------------------------------------
# Subcategories (second-level folders)
# ---------------------------------------------------------------------------
[subcategories]
# Keep the numeric prefix ("01_はじめに") on the page's subcategory. The
# sidebar always shows the name without the prefix.
keep_prefix = true

# "numeric-prefix": 2_… sorts before 10_…
# "lexical":        plain string comparison
sort = "numeric-prefix"

# ---------------------------------------------------------------------------
# Discovery
# ---------------------------------------------------------------------------
[discovery]
# Folders that are never published (case-sensitive, whole names).
exclude_dirs = ["アーカイブ", "archive", "Archive", "_archive"]

# Ignore index.md files; index.html is always generated.
skip_index = true

# ---------------------------------------------------------------------------
# Output slugs for known document names (exact match on the file name
# without its numeric prefix and extension). Entries here extend the stock
# table. A plain-ASCII front matter `slug:` always wins.
# ---------------------------------------------------------------------------
[slugs]
"AIチャット" = "ai-assistant"
guideline_why = "guideline_why"
vision = "vision"
"はじめに" = "introduction"
"ディレクターの心得" = "director_mindset"
"全体の業務プロセス" = "business_process"
"コミュニケーションガイド" = "communication_guide"
"代表的なトラブルシューティング" = "troubleshooting"
"ガイドライン要点まとめ" = "guideline_summary"
"実践改善事例集" = "improvement_cases"
"新機能の使い方" = "new_features"
"よくある質問FAQ" = "faq"
"プロジェクト管理のコツ" = "project_management_tips"
"ガイドライン追加・改善" = "feedback"

# ---------------------------------------------------------------------------
# Search index (search-index.json)
# ---------------------------------------------------------------------------
[search]
# "sections": one entry per #, ## or ### heading
# "pages":    one entry per page
mode = "sections"

# Maximum characters of text kept per entry.
snippet_chars = 500
"##
}
