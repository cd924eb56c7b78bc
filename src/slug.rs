//! Output slug assignment.
//!
//! A slug is the output file name of a page without its `.html` extension.
//! Slugs must be safe in both URLs and file names, and unique across the site.
//!
//! ## Derivation
//!
//! First match wins:
//!
//! 1. An explicit `slug:` in front matter, sanitized. It is ignored with a
//!    warning unless the result is plain ASCII.
//! 2. An exact match of the prefix-stripped file stem in the `[slugs]` table.
//! 3. Names containing Japanese script fall back to the digit prefixes of
//!    the file and its folder, kept verbatim (`page_02_01`, `page_01`).
//!    Without any digits the slug is `page_` plus the first 8 hex digits of
//!    the SHA-256 of the document's relative path.
//! 4. Anything else is lowercased, with non-word characters removed and
//!    whitespace turned into `_`.
//!
//! ## Collisions
//!
//! After every page has a slug, each slug shared by more than one page gets
//! `_1`, `_2`, … appended to every occurrence, in discovery order. A suffixed
//! slug that is already taken by another page is skipped over.
//!
//! `index` belongs to the generated site index, so a page that would get it
//! is suffixed the same way (`index_1`).

use crate::config::is_safe_slug;
use crate::naming::{parse_entry_name, strip_order_prefix};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Slugs of files the generator writes itself.
pub const RESERVED_SLUGS: &[&str] = &["index"];

/// Derive the initial slug for one document.
///
/// `relative_path` is `/`-separated, relative to the content root.
pub fn derive_slug(
    relative_path: &str,
    declared: Option<&str>,
    table: &BTreeMap<String, String>,
) -> String {
    if let Some(declared) = declared {
        let slug = sanitize(declared);
        if is_safe_slug(&slug) {
            return slug;
        }
        if !slug.is_empty() {
            tracing::warn!(
                "{relative_path}: ignoring slug \"{declared}\": only ASCII letters, digits, '_' and '-' are allowed"
            );
        }
    }

    let (parent, file_name) = match relative_path.rsplit_once('/') {
        Some((parent, file)) => (Some(parent), file),
        None => (None, relative_path),
    };
    let stem = file_name.strip_suffix(".md").unwrap_or(file_name);
    let name = strip_order_prefix(stem);

    if let Some(slug) = table.get(&name) {
        return slug.clone();
    }

    if contains_japanese(&name) {
        return match digit_prefix(file_name) {
            Some(file_num) => {
                let dir_num = parent
                    .and_then(|p| p.rsplit('/').next())
                    .filter(|dir| parse_entry_name(dir).number.is_some())
                    .and_then(digit_prefix);
                match dir_num {
                    Some(dir_num) => format!("page_{dir_num}_{file_num}"),
                    None => format!("page_{file_num}"),
                }
            }
            None => hashed_slug(relative_path),
        };
    }

    let slug = sanitize(&name);
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

/// Lowercase, drop everything but word characters, whitespace and `-`, then
/// turn whitespace runs into `_`.
pub fn sanitize(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();
    kept.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// Hiragana, katakana or CJK unified ideographs.
pub fn contains_japanese(s: &str) -> bool {
    s.chars().any(|c| {
        matches!(c,
            '\u{3040}'..='\u{309f}' | '\u{30a0}'..='\u{30ff}' | '\u{4e00}'..='\u{9faf}')
    })
}

/// Leading ASCII digits, verbatim (`"02_x"` → `"02"`).
fn digit_prefix(name: &str) -> Option<&str> {
    let end = name
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(name.len());
    (end > 0).then(|| &name[..end])
}

fn hashed_slug(relative_path: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(relative_path.as_bytes()));
    format!("page_{}", &digest[..8])
}

/// Make every slug unique.
///
/// Slugs are given in discovery order; the result is in the same order.
/// Unique slugs are returned unchanged, unless they are reserved.
pub fn resolve_collisions(slugs: &[String]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for slug in slugs {
        *counts.entry(slug.as_str()).or_default() += 1;
    }
    let keeps = |slug: &str| counts[slug] == 1 && !RESERVED_SLUGS.iter().any(|r| *r == slug);

    let mut taken: HashSet<String> = slugs
        .iter()
        .filter(|s| keeps(s.as_str()))
        .cloned()
        .chain(RESERVED_SLUGS.iter().map(|s| s.to_string()))
        .collect();
    let mut next_suffix: HashMap<&str, usize> = HashMap::new();

    slugs
        .iter()
        .map(|slug| {
            if keeps(slug.as_str()) {
                return slug.clone();
            }
            let n = next_suffix.entry(slug.as_str()).or_insert(0);
            loop {
                *n += 1;
                let candidate = format!("{slug}_{n}");
                if taken.insert(candidate.clone()) {
                    return candidate;
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_slugs;

    fn slug(path: &str) -> String {
        derive_slug(path, None, &default_slugs())
    }

    #[test]
    fn table_match_on_stripped_stem() {
        assert_eq!(slug("01_最初にみる動画/02_vision.md"), "vision");
        assert_eq!(slug("02_商談マニュアル/05_よくある質問FAQ.md"), "faq");
        assert_eq!(slug("03_その他/ガイドライン追加・改善.md"), "feedback");
    }

    #[test]
    fn table_match_is_exact() {
        // Contains a table key but is not one.
        assert_eq!(slug("03_その他/03_よくある質問FAQ_追加.md"), "page_03_03");
    }

    #[test]
    fn declared_slug_wins() {
        let s = derive_slug("x/02_vision.md", Some("Our Vision"), &default_slugs());
        assert_eq!(s, "our_vision");
    }

    #[test]
    fn blank_declared_slug_ignored() {
        let s = derive_slug("x/02_vision.md", Some("!!!"), &default_slugs());
        assert_eq!(s, "vision");
    }

    #[test]
    fn japanese_with_numbers() {
        assert_eq!(slug("02_商談マニュアル/01_ヒアリング.md"), "page_02_01");
        assert_eq!(slug("その他/07_メモ.md"), "page_07");
        assert_eq!(slug("01_ヒアリング.md"), "page_01");
    }

    #[test]
    fn japanese_without_numbers_uses_path_hash() {
        let a = slug("その他/メモ.md");
        let b = slug("その他/メモ.md");
        let c = slug("別/メモ.md");
        assert!(a.starts_with("page_"));
        assert_eq!(a.len(), "page_".len() + 8);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn ascii_sanitized() {
        assert_eq!(slug("misc/Getting Started!.md"), "getting_started");
        assert_eq!(slug("misc/03-release-notes.md"), "release-notes");
        assert_eq!(slug("misc/!!!.md"), "untitled");
    }

    #[test]
    fn collisions_suffixed_in_discovery_order() {
        let slugs = vec!["faq".to_string(), "vision".to_string(), "faq".to_string()];
        assert_eq!(resolve_collisions(&slugs), vec!["faq_1", "vision", "faq_2"]);
    }

    #[test]
    fn collision_suffix_skips_taken_slug() {
        let slugs = vec!["faq".to_string(), "faq_1".to_string(), "faq".to_string()];
        let resolved = resolve_collisions(&slugs);
        assert_eq!(resolved, vec!["faq_2", "faq_1", "faq_3"]);
        let unique: HashSet<_> = resolved.iter().collect();
        assert_eq!(unique.len(), resolved.len());
    }

    #[test]
    fn non_ascii_declared_slug_falls_back() {
        let table = default_slugs();
        assert_eq!(derive_slug("docs/a.md", Some("はじめに"), &table), "a");
        assert_eq!(derive_slug("docs/a.md", Some("intro-はじめに"), &table), "a");
        assert_eq!(
            derive_slug("02_商談マニュアル/01_ヒアリング.md", Some("ヒアリング"), &table),
            "page_02_01"
        );
        assert_eq!(derive_slug("docs/a.md", Some("Intro-2"), &table), "intro-2");
    }

    #[test]
    fn index_slug_is_reserved() {
        let slugs = vec!["index".to_string(), "vision".to_string()];
        assert_eq!(resolve_collisions(&slugs), vec!["index_1", "vision"]);

        let slugs = vec!["index".to_string(), "index_1".to_string(), "index".to_string()];
        assert_eq!(resolve_collisions(&slugs), vec!["index_2", "index_1", "index_3"]);
    }

    #[test]
    fn contains_japanese_detects_scripts() {
        assert!(contains_japanese("ひらがな"));
        assert!(contains_japanese("カタカナ"));
        assert!(contains_japanese("漢字"));
        assert!(!contains_japanese("ascii_only"));
    }
}
