//! Sidebar tree: a display projection of the ordered pages.
//!
//! ```text
//! 最初にみる動画                 category (configured priority)
//! ├── はじめに        15分       subcategory (label without prefix, total duration)
//! │   ├── ビジョン    5分
//! │   └── ディレクターの心得
//! └── 業務
//!     └── 全体の業務プロセス
//! 商談マニュアル
//! ├── ヒアリング                 pages without a subcategory
//! └── よくある質問FAQ
//! 社内ツール                     unlisted categories follow, in order of appearance
//! ```
//!
//! The tree borrows from the page collection and owns nothing. Building it
//! twice from the same pages gives the same tree.

use crate::config::{SiteConfig, SubcategorySort};
use crate::metadata::total_duration;
use crate::naming::strip_order_prefix;
use crate::types::{DEFAULT_ORDER, Page};

#[derive(Debug, PartialEq)]
pub struct Sidebar<'a> {
    pub categories: Vec<SidebarCategory<'a>>,
}

#[derive(Debug, PartialEq)]
pub struct SidebarCategory<'a> {
    /// Empty for uncategorized pages, which render without a heading.
    pub name: &'a str,
    pub subcategories: Vec<SidebarSubcategory<'a>>,
    /// Pages with no subcategory, listed after the subcategories.
    pub pages: Vec<&'a Page>,
}

#[derive(Debug, PartialEq)]
pub struct SidebarSubcategory<'a> {
    /// Subcategory as stored on the pages.
    pub key: &'a str,
    /// Display name, numeric prefix removed.
    pub label: String,
    pub total_duration: Option<String>,
    pub pages: Vec<&'a Page>,
}

impl<'a> SidebarCategory<'a> {
    pub fn contains(&self, slug: &str) -> bool {
        self.pages.iter().any(|p| p.slug == slug)
            || self.subcategories.iter().any(|s| s.contains(slug))
    }
}

impl<'a> SidebarSubcategory<'a> {
    pub fn contains(&self, slug: &str) -> bool {
        self.pages.iter().any(|p| p.slug == slug)
    }
}

impl<'a> Sidebar<'a> {
    /// Group `pages` by category and subcategory.
    pub fn build(pages: &'a [Page], config: &SiteConfig) -> Self {
        let mut names: Vec<&'a str> = config
            .categories
            .order
            .iter()
            .filter_map(|c| pages.iter().find(|p| &p.category == c))
            .map(|p| p.category.as_str())
            .collect();
        for page in pages {
            if !names.contains(&page.category.as_str()) {
                names.push(&page.category);
            }
        }

        let categories = names
            .into_iter()
            .map(|name| build_category(name, pages, config))
            .collect();
        Self { categories }
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

fn build_category<'a>(name: &'a str, pages: &'a [Page], config: &SiteConfig) -> SidebarCategory<'a> {
    let members: Vec<&'a Page> = pages.iter().filter(|p| p.category == name).collect();

    let mut loose: Vec<&'a Page> = members
        .iter()
        .copied()
        .filter(|p| p.subcategory.is_none())
        .collect();
    sort_within_group(&mut loose);

    let mut keys: Vec<(&'a str, Option<u32>)> = Vec::new();
    for page in &members {
        if let Some(key) = page.subcategory.as_deref()
            && !keys.iter().any(|(k, _)| *k == key)
        {
            keys.push((key, page.subcategory_order));
        }
    }
    match config.subcategories.sort {
        SubcategorySort::NumericPrefix => keys.sort_by(|(ka, ra), (kb, rb)| {
            let rank = |r: &Option<u32>| r.map(i64::from).unwrap_or(DEFAULT_ORDER);
            rank(ra).cmp(&rank(rb)).then_with(|| ka.cmp(kb))
        }),
        SubcategorySort::Lexical => keys.sort_by(|(ka, _), (kb, _)| ka.cmp(kb)),
    }

    let subcategories = keys
        .into_iter()
        .map(|(key, _)| {
            let mut group: Vec<&'a Page> = members
                .iter()
                .copied()
                .filter(|p| p.subcategory.as_deref() == Some(key))
                .collect();
            sort_within_group(&mut group);
            SidebarSubcategory {
                key,
                label: strip_order_prefix(key),
                total_duration: total_duration(group.iter().filter_map(|p| p.duration.as_deref())),
                pages: group,
            }
        })
        .collect();

    SidebarCategory {
        name,
        subcategories,
        pages: loose,
    }
}

fn sort_within_group(pages: &mut [&Page]) {
    pages.sort_by(|a, b| {
        (a.order, &a.file_name, &a.relative_path).cmp(&(b.order, &b.file_name, &b.relative_path))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SubcategoriesConfig;
    use crate::test_helpers::page;

    fn doc(slug: &str, category: &str, subcategory: Option<&str>, order: i64) -> Page {
        let mut p = page(slug, slug);
        p.category = category.to_string();
        p.subcategory = subcategory.map(String::from);
        p.subcategory_order = subcategory.and_then(crate::naming::leading_number);
        p.order = order;
        p.file_name = format!("{slug}.md");
        p.relative_path = format!("{category}/{slug}.md");
        p
    }

    fn names<'a>(sidebar: &'a Sidebar) -> Vec<&'a str> {
        sidebar.categories.iter().map(|c| c.name).collect()
    }

    #[test]
    fn configured_categories_first_then_appearance() {
        let pages = vec![
            doc("t", "社内ツール", None, 1),
            doc("o", "その他", None, 1),
            doc("x", "", None, 1),
            doc("v", "最初にみる動画", None, 1),
        ];
        let config = SiteConfig::default();
        let sidebar = Sidebar::build(&pages, &config);
        assert_eq!(names(&sidebar), vec!["最初にみる動画", "その他", "社内ツール", ""]);
    }

    #[test]
    fn configured_but_empty_categories_omitted() {
        let pages = vec![doc("o", "その他", None, 1)];
        let sidebar = Sidebar::build(&pages, &SiteConfig::default());
        assert_eq!(names(&sidebar), vec!["その他"]);
    }

    #[test]
    fn pages_sorted_by_order_then_file_name() {
        let pages = vec![
            doc("c", "その他", None, 2),
            doc("b", "その他", None, 1),
            doc("a", "その他", None, 1),
        ];
        let sidebar = Sidebar::build(&pages, &SiteConfig::default());
        let slugs: Vec<&str> = sidebar.categories[0].pages.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["a", "b", "c"]);
    }

    #[test]
    fn subcategories_by_numeric_prefix() {
        let pages = vec![
            doc("a", "その他", Some("10_後半"), 1),
            doc("b", "その他", Some("2_前半"), 1),
            doc("c", "その他", Some("付録"), 1),
            doc("d", "その他", None, 1),
        ];
        let sidebar = Sidebar::build(&pages, &SiteConfig::default());
        let cat = &sidebar.categories[0];
        let labels: Vec<&str> = cat.subcategories.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["前半", "後半", "付録"]);
        assert_eq!(cat.pages.len(), 1);
        assert_eq!(cat.subcategories[0].key, "2_前半");
    }

    #[test]
    fn subcategories_lexical() {
        let pages = vec![
            doc("a", "その他", Some("10_後半"), 1),
            doc("b", "その他", Some("2_前半"), 1),
        ];
        let config = SiteConfig {
            subcategories: SubcategoriesConfig {
                sort: SubcategorySort::Lexical,
                ..SubcategoriesConfig::default()
            },
            ..SiteConfig::default()
        };
        let sidebar = Sidebar::build(&pages, &config);
        let keys: Vec<&str> = sidebar.categories[0].subcategories.iter().map(|s| s.key).collect();
        assert_eq!(keys, vec!["10_後半", "2_前半"]);
    }

    #[test]
    fn subcategory_total_duration() {
        let mut a = doc("a", "最初にみる動画", Some("01_はじめに"), 1);
        a.duration = Some("45分".to_string());
        let mut b = doc("b", "最初にみる動画", Some("01_はじめに"), 2);
        b.duration = Some("30分".to_string());
        let c = doc("c", "最初にみる動画", Some("01_はじめに"), 3);
        let pages = vec![a, b, c];

        let sidebar = Sidebar::build(&pages, &SiteConfig::default());
        let sub = &sidebar.categories[0].subcategories[0];
        assert_eq!(sub.total_duration.as_deref(), Some("1時間15分"));
    }

    #[test]
    fn contains_finds_nested_pages() {
        let pages = vec![doc("a", "その他", Some("01_x"), 1), doc("b", "その他", None, 1)];
        let sidebar = Sidebar::build(&pages, &SiteConfig::default());
        assert!(sidebar.categories[0].contains("a"));
        assert!(sidebar.categories[0].contains("b"));
        assert!(!sidebar.categories[0].contains("z"));
    }

    #[test]
    fn rebuild_is_identical() {
        let pages = vec![
            doc("a", "その他", Some("01_x"), 1),
            doc("b", "最初にみる動画", None, 1),
        ];
        let config = SiteConfig::default();
        assert_eq!(Sidebar::build(&pages, &config), Sidebar::build(&pages, &config));
    }
}
