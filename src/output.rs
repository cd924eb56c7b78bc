//! CLI output formatting for the scan and build commands.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every page leads with
//! its positional index and title; the source path follows as an indented
//! `Source:` line. Read top to bottom, the scan output is the reading order of
//! the site.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! 最初にみる動画
//!     はじめに (15分)
//!         001 ビジョン [5分]
//!             Source: 01_最初にみる動画/01_はじめに/01_vision.md
//!         002 ディレクターの心得 [10分]
//!             Source: 01_最初にみる動画/01_はじめに/02_ディレクターの心得.md
//! 商談マニュアル
//!     004 ヒアリング
//!         Source: 02_商談マニュアル/01_ヒアリング.md
//!
//! Skipped
//!     broken.md: invalid UTF-8
//! ```
//!
//! ## Build
//!
//! ```text
//! Home → index.html
//! 001 ビジョン → vision.html
//! 002 ディレクターの心得 → director_mindset.html
//! Search index → search-index.json (12 entries)
//!
//! 9 documents discovered, 8 pages generated, 1 skipped
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::generate::{GenerateReport, INDEX_FILE, SEARCH_INDEX_FILE};
use crate::scan::Site;
use crate::sidebar::Sidebar;
use crate::types::Page;
use std::collections::HashMap;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format a page line: index, title, and duration when present.
///
/// ```text
/// 001 ビジョン [5分]
/// 004 ヒアリング
/// ```
fn page_line(index: usize, page: &Page) -> String {
    match &page.duration {
        Some(d) => format!("{} {} [{}]", format_index(index), page.title, d),
        None => format!("{} {}", format_index(index), page.title),
    }
}

// ============================================================================
// Scan output
// ============================================================================

/// Format scan output: the sidebar tree with every page's global position.
pub fn format_scan_output(site: &Site) -> Vec<String> {
    let mut lines = Vec::new();
    let positions: HashMap<&str, usize> = site
        .pages
        .iter()
        .enumerate()
        .map(|(i, p)| (p.slug.as_str(), i + 1))
        .collect();
    let push_page = |lines: &mut Vec<String>, page: &Page, depth: usize| {
        let index = positions.get(page.slug.as_str()).copied().unwrap_or(0);
        lines.push(format!("{}{}", indent(depth), page_line(index, page)));
        lines.push(format!("{}Source: {}", indent(depth + 1), page.relative_path));
    };

    let sidebar = Sidebar::build(&site.pages, &site.config);
    for category in &sidebar.categories {
        let depth = if category.name.is_empty() {
            0
        } else {
            lines.push(category.name.to_string());
            1
        };
        for sub in &category.subcategories {
            match &sub.total_duration {
                Some(total) => lines.push(format!("{}{} ({})", indent(depth), sub.label, total)),
                None => lines.push(format!("{}{}", indent(depth), sub.label)),
            }
            for page in &sub.pages {
                push_page(&mut lines, page, depth + 1);
            }
        }
        for page in &category.pages {
            push_page(&mut lines, page, depth);
        }
    }

    if !site.skipped.is_empty() {
        lines.push(String::new());
        lines.push("Skipped".to_string());
        for skipped in &site.skipped {
            lines.push(format!(
                "    {}: {}",
                skipped.path.display(),
                skipped.reason
            ));
        }
    }

    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(site: &Site) {
    for line in format_scan_output(site) {
        println!("{}", line);
    }
}

// ============================================================================
// Build output
// ============================================================================

/// Format build output: every written file, then the summary line.
pub fn format_generate_output(report: &GenerateReport) -> Vec<String> {
    let mut lines = vec![format!("Home → {}", INDEX_FILE)];
    for (i, page) in report.pages.iter().enumerate() {
        lines.push(format!(
            "{} {} → {}",
            format_index(i + 1),
            page.title,
            page.file_name
        ));
    }
    lines.push(format!(
        "Search index → {} ({} entries)",
        SEARCH_INDEX_FILE, report.search_entries
    ));
    lines.push(String::new());
    lines.push(summary_line(report));
    lines
}

/// `N documents discovered, M pages generated, K skipped`
pub fn summary_line(report: &GenerateReport) -> String {
    format!(
        "{} documents discovered, {} pages generated, {} skipped",
        report.discovered,
        report.pages.len(),
        report.skipped
    )
}

/// Print build output to stdout.
pub fn print_generate_output(report: &GenerateReport) {
    for line in format_generate_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
