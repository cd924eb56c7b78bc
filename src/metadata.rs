//! Document metadata extraction and resolution.
//!
//! Each document can carry metadata from two independent sources:
//!
//! - **Front matter**: a leading YAML block (see [`crate::frontmatter`]).
//! - **The filesystem**: the document's relative path and file name, plus the
//!   first `# heading` of its body.
//!
//! ## Resolution priority
//!
//! Each field is resolved independently. The first non-empty value wins:
//!
//! - **Title**: front matter → first level-1 heading → cleaned file stem
//! - **Category**: front matter → first directory (numeric prefix stripped) → `""`
//! - **Subcategory**: front matter → second directory, when the file sits below it
//! - **Order**: front matter → leading digits of the file name → 999
//!
//! An explicit `order: null` (or any unparseable order) resolves to 999 rather
//! than falling through to the file name.
//!
//! Malformed front matter is treated as absent: the whole text becomes the
//! body and every field falls back to the filesystem. A single broken
//! document never fails the build.

use crate::config::SubcategoriesConfig;
use crate::frontmatter::{self, DurationValue, FrontMatter, OrderValue};
use crate::naming::{leading_number, strip_order_prefix, title_from_stem};
use crate::types::DEFAULT_ORDER;
use regex::Regex;
use std::sync::LazyLock;

static H1: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#[ \t]+(.+?)[ \t]*\r?$").expect("valid regex"));

/// Resolve a metadata field from multiple sources.
///
/// Takes a list of optional values in priority order and returns the first
/// non-None, non-empty value.
///
/// ```text
/// title:    resolve(&[front_matter_title, first_h1, file_title])
/// category: resolve(&[front_matter_category, directory_category])
/// ```
pub fn resolve(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

/// Every field of a page that is a pure function of the document itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDocument {
    pub title: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub subcategory_order: Option<u32>,
    pub order: i64,
    pub duration: Option<String>,
    pub tags: Vec<String>,
    pub date: Option<String>,
    pub body: String,
    /// `slug:` from front matter, unsanitized.
    pub declared_slug: Option<String>,
}

/// Resolve one document.
///
/// `relative_path` is `/`-separated and relative to the content root
/// (e.g. `01_最初にみる動画/01_はじめに/02_vision.md`).
pub fn resolve_document(
    relative_path: &str,
    text: &str,
    subcategories: &SubcategoriesConfig,
) -> ResolvedDocument {
    let (front_matter, body) = split_front_matter(relative_path, text);
    let fm = front_matter.unwrap_or_default();

    let segments: Vec<&str> = relative_path.split('/').collect();
    let (dirs, file_name) = segments.split_at(segments.len() - 1);
    let file_name = file_name[0];
    let stem = file_name.strip_suffix(".md").unwrap_or(file_name);

    let file_title = title_from_stem(stem);
    let title = resolve(&[fm.title.as_deref(), first_heading(body), Some(file_title.as_str())])
        .unwrap_or(file_title);

    let path_category = dirs.first().map(|d| strip_order_prefix(d));
    let category =
        resolve(&[fm.category.as_deref(), path_category.as_deref()]).unwrap_or_default();

    let raw_subcategory = resolve(&[
        fm.subcategory.as_deref(),
        dirs.get(1).copied(),
    ]);
    let subcategory_order = raw_subcategory.as_deref().and_then(leading_number);
    let subcategory = raw_subcategory.map(|s| {
        if subcategories.keep_prefix {
            s
        } else {
            strip_order_prefix(&s)
        }
    });

    let order = match &fm.order {
        Some(OrderValue::Number(n)) => *n,
        Some(OrderValue::Null) => DEFAULT_ORDER,
        Some(OrderValue::Invalid(raw)) => {
            tracing::debug!("{relative_path}: unparseable order {raw:?}, using {DEFAULT_ORDER}");
            DEFAULT_ORDER
        }
        None => leading_number(file_name)
            .map(i64::from)
            .unwrap_or(DEFAULT_ORDER),
    };

    ResolvedDocument {
        title,
        category,
        subcategory,
        subcategory_order,
        order,
        duration: fm.duration.as_ref().and_then(normalize_duration),
        tags: fm.tags,
        date: fm.date,
        body: body.to_string(),
        declared_slug: fm.slug,
    }
}

/// Split and parse front matter, falling back to "no front matter" when the
/// block does not parse.
fn split_front_matter<'a>(relative_path: &str, text: &'a str) -> (Option<FrontMatter>, &'a str) {
    match frontmatter::split(text) {
        (Some(yaml), body) => match frontmatter::parse(yaml) {
            Ok(fm) => (Some(fm), body),
            Err(e) => {
                tracing::warn!("{relative_path}: ignoring malformed front matter: {e}");
                (None, text)
            }
        },
        (None, body) => (None, body),
    }
}

/// Text of the first level-1 ATX heading anywhere in the body.
pub fn first_heading(body: &str) -> Option<&str> {
    H1.captures_iter(body).find_map(|c| {
        c.get(1)
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
    })
}

/// Normalize a front matter duration for display.
///
/// Numbers and digit-only strings get the minute suffix; other text passes
/// through. Zero and blank values mean "no duration".
pub fn normalize_duration(value: &DurationValue) -> Option<String> {
    match value {
        DurationValue::Integer(0) => None,
        DurationValue::Integer(n) => Some(format!("{n}分")),
        DurationValue::Float(f) if *f == 0.0 || !f.is_finite() => None,
        DurationValue::Float(f) => Some(format!("{f}分")),
        DurationValue::Text(s) if s.is_empty() => None,
        DurationValue::Text(s) if s.chars().all(|c| decimal_digit(c).is_some()) => {
            Some(format!("{s}分"))
        }
        DurationValue::Text(s) => Some(s.clone()),
    }
}

/// Sum a set of display durations into a total such as `1時間15分`.
///
/// Each duration contributes the first run of digits it contains; durations
/// without digits are ignored. Returns `None` when the total is zero.
pub fn total_duration<'a>(durations: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let total: u64 = durations
        .into_iter()
        .filter_map(first_number)
        .fold(0u64, u64::saturating_add);

    match (total / 60, total % 60) {
        (0, 0) => None,
        (0, minutes) => Some(format!("{minutes}分")),
        (hours, 0) => Some(format!("{hours}時間")),
        (hours, minutes) => Some(format!("{hours}時間{minutes}分")),
    }
}

fn first_number(s: &str) -> Option<u64> {
    let start = s.find(|c: char| decimal_digit(c).is_some())?;
    s[start..]
        .chars()
        .map_while(decimal_digit)
        .try_fold(0u64, |n, d| n.checked_mul(10)?.checked_add(u64::from(d)))
}

/// Value of an ASCII or full-width digit.
fn decimal_digit(c: char) -> Option<u32> {
    match c {
        '0'..='9' => c.to_digit(10),
        '０'..='９' => Some(c as u32 - '０' as u32),
        _ => None,
    }
}
