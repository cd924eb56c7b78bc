//! Site-wide previous/next navigation.
//!
//! Pages form one flat chain in global order, crossing category boundaries so
//! a reader can page through the entire site. Links carry only the target's
//! title and slug, never the page itself.

use crate::types::Page;
use serde::Serialize;
use std::collections::BTreeMap;

/// One directed edge to another page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub title: String,
    pub slug: String,
}

impl NavLink {
    fn to(page: &Page) -> Self {
        Self {
            title: page.title.clone(),
            slug: page.slug.clone(),
        }
    }

    /// Relative URL of the target page.
    pub fn href(&self) -> String {
        format!("{}.html", self.slug)
    }
}

/// Both edges of one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageNav {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<NavLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<NavLink>,
}

/// Prev/next links for every page, keyed by slug.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Navigation {
    links: BTreeMap<String, PageNav>,
}

impl Navigation {
    /// Chain `pages` in the order given. Slugs must already be unique.
    pub fn build(pages: &[Page]) -> Self {
        let links = pages
            .iter()
            .enumerate()
            .map(|(i, page)| {
                let nav = PageNav {
                    prev: i.checked_sub(1).map(|p| NavLink::to(&pages[p])),
                    next: pages.get(i + 1).map(NavLink::to),
                };
                (page.slug.clone(), nav)
            })
            .collect();
        Self { links }
    }

    pub fn get(&self, slug: &str) -> Option<&PageNav> {
        self.links.get(slug)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PageNav)> {
        self.links.iter().map(|(slug, nav)| (slug.as_str(), nav))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::page;

    fn pages(slugs: &[&str]) -> Vec<Page> {
        slugs.iter().map(|s| page(s, &s.to_uppercase())).collect()
    }

    #[test]
    fn chain_links_neighbours() {
        let nav = Navigation::build(&pages(&["a", "b", "c"]));
        let b = nav.get("b").unwrap();
        assert_eq!(b.prev.as_ref().unwrap().slug, "a");
        assert_eq!(b.prev.as_ref().unwrap().title, "A");
        assert_eq!(b.next.as_ref().unwrap().slug, "c");
        assert_eq!(b.next.as_ref().unwrap().href(), "c.html");
    }

    #[test]
    fn ends_have_one_edge() {
        let nav = Navigation::build(&pages(&["a", "b", "c"]));
        assert!(nav.get("a").unwrap().prev.is_none());
        assert!(nav.get("c").unwrap().next.is_none());
    }

    #[test]
    fn edges_are_symmetric() {
        let nav = Navigation::build(&pages(&["a", "b", "c", "d"]));
        for (slug, links) in nav.iter() {
            if let Some(next) = &links.next {
                let back = nav.get(&next.slug).unwrap().prev.as_ref().unwrap();
                assert_eq!(back.slug, slug);
            }
            if let Some(prev) = &links.prev {
                let back = nav.get(&prev.slug).unwrap().next.as_ref().unwrap();
                assert_eq!(back.slug, slug);
            }
        }
        assert_eq!(nav.iter().filter(|(_, l)| l.prev.is_none()).count(), 1);
        assert_eq!(nav.iter().filter(|(_, l)| l.next.is_none()).count(), 1);
    }

    #[test]
    fn single_page_has_no_edges() {
        let nav = Navigation::build(&pages(&["only"]));
        assert_eq!(nav.len(), 1);
        assert_eq!(nav.get("only"), Some(&PageNav::default()));
    }

    #[test]
    fn empty_collection() {
        assert!(Navigation::build(&[]).is_empty());
    }
}
