//! Centralized filename parsing for the `NN_name` ordering convention.
//!
//! Category folders, subcategory folders and documents all share one naming
//! pattern: an optional numeric prefix followed by `_` or `-`, then the name.
//!
//! ```text
//! 01_最初にみる動画/          → number=Some(1), name="最初にみる動画"
//! 02-onboarding/              → number=Some(2), name="onboarding"
//! 03_よくある質問FAQ.md       → number=Some(3), name="よくある質問FAQ"
//! getting-started.md          → number=None,    name="getting-started"
//! ```
//!
//! ## Display Titles
//!
//! Document titles derived from file names drop only a short `NN_` prefix and
//! turn separators into spaces, except for section-style numbering such as
//! `1-1.はじめに`, which is kept verbatim because the number is part of the title.

/// Result of parsing a numbered entry name like `01_はじめに`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedName {
    /// Number prefix if present (e.g., `1` from `01_はじめに`)
    pub number: Option<u32>,
    /// Name part after the `NN_` / `NN-` prefix. For unnumbered entries, the full input.
    pub name: String,
}

/// Parse an entry name following the `NN_name` / `NN-name` convention.
///
/// - `"01_はじめに"` → number=Some(1), name="はじめに"
/// - `"020-My-Guide"` → number=Some(20), name="My-Guide"
/// - `"2023"` → number=None, name="2023" (no separator, not a prefix)
/// - `"vision"` → number=None, name="vision"
pub fn parse_entry_name(name: &str) -> ParsedName {
    if let Some(sep) = name.find(['_', '-']) {
        let prefix = &name[..sep];
        if !prefix.is_empty()
            && prefix.bytes().all(|b| b.is_ascii_digit())
            && let Ok(num) = prefix.parse::<u32>()
        {
            return ParsedName {
                number: Some(num),
                name: name[sep + 1..].to_string(),
            };
        }
    }
    ParsedName {
        number: None,
        name: name.to_string(),
    }
}

/// Strip a leading `NN_` / `NN-` ordering prefix, keeping everything else.
pub fn strip_order_prefix(name: &str) -> String {
    parse_entry_name(name).name
}

/// Parse just the leading digit run of a name (`"02_vision.md"` → `Some(2)`).
pub fn leading_number(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take_while(|c| c.is_ascii_digit()).collect();
    prefix.parse().ok()
}

/// Derive a display title from a file stem.
///
/// - `"01_はじめに"` → `"はじめに"`
/// - `"02_project_kickoff"` → `"project kickoff"`
/// - `"1-1.はじめに"` → `"1-1.はじめに"` (section numbering kept)
/// - `"about-us"` → `"about us"`
///
/// Never returns an empty string: a stem that cleans down to nothing falls
/// back to the stem itself, and an empty stem to `"untitled"`.
pub fn title_from_stem(stem: &str) -> String {
    let without_prefix = strip_short_underscore_prefix(stem);
    let title = if is_section_numbered(without_prefix) {
        without_prefix.to_string()
    } else {
        without_prefix.replace(['_', '-'], " ").trim().to_string()
    };

    if !title.is_empty() {
        title
    } else if !stem.trim().is_empty() {
        stem.trim().to_string()
    } else {
        "untitled".to_string()
    }
}

/// Drop a one- or two-digit `N_` / `0N_` prefix. Longer digit runs are kept
/// since they are usually part of the name (years, ticket numbers).
fn strip_short_underscore_prefix(stem: &str) -> &str {
    let digits = stem.bytes().take_while(|b| b.is_ascii_digit()).count();
    let short = digits == 1 || (digits == 2 && stem.starts_with('0'));
    if short && stem.as_bytes().get(digits) == Some(&b'_') {
        &stem[digits + 1..]
    } else {
        stem
    }
}

/// `1-1.`, `12-3.` style section numbering.
fn is_section_numbered(name: &str) -> bool {
    let mut rest = name;
    for sep in ['-', '.'] {
        let digits = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
        if digits == 0 || !rest[digits..].starts_with(sep) {
            return false;
        }
        rest = &rest[digits + 1..];
    }
    true
}
