//! Offset-based pagination.
//!
//! `total` and `total_pages` are computed here (and only here) so every
//! listing endpoint reports the same numbers for the same dataset.

use serde::{Deserialize, Serialize};

/// Default page size when the client does not ask for one.
pub const DEFAULT_PER_PAGE: u64 = 20;
/// Upper bound on page size; larger requests are clamped, not rejected.
pub const MAX_PER_PAGE: u64 = 100;

/// A validated page request. Construct via [`PageRequest::new`], which
/// clamps out-of-range values instead of erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    per_page: u64,
}

impl PageRequest {
    /// Clamp `page` to at least 1 and `per_page` into `1..=MAX_PER_PAGE`.
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// 1-indexed page number.
    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    /// Row offset for the underlying query.
    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.per_page
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PER_PAGE)
    }
}

/// One page of results plus the totals the client renders pagination from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Build a page from fetched items and the dataset's total row count.
    ///
    /// `total_pages = ceil(total / per_page)`; an empty dataset has zero
    /// pages. A page past the end is valid and simply carries no items.
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        let per_page = request.per_page();
        Self {
            items,
            total,
            page: request.page(),
            per_page,
            total_pages: total.div_ceil(per_page),
        }
    }

    /// Map the items while keeping the pagination bookkeeping.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_page_and_per_page() {
        let req = PageRequest::new(0, 0);
        assert_eq!(req.page(), 1);
        assert_eq!(req.per_page(), 1);

        let req = PageRequest::new(3, 500);
        assert_eq!(req.page(), 3);
        assert_eq!(req.per_page(), MAX_PER_PAGE);
    }

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(PageRequest::new(1, 20).offset(), 0);
        assert_eq!(PageRequest::new(4, 20).offset(), 60);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = Page::new(vec![1, 2, 3], 41, PageRequest::new(1, 20));
        assert_eq!(page.total, 41);
        assert_eq!(page.total_pages, 3);

        let exact = Page::new(vec![1], 40, PageRequest::new(2, 20));
        assert_eq!(exact.total_pages, 2);
    }

    #[test]
    fn empty_dataset_has_zero_pages() {
        let page: Page<u32> = Page::new(vec![], 0, PageRequest::default());
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn totals_are_stable_across_pages() {
        // The same dataset must report the same total/total_pages no
        // matter which page was requested.
        let first = Page::new(vec![0; 20], 55, PageRequest::new(1, 20));
        let last = Page::new(vec![0; 15], 55, PageRequest::new(3, 20));
        assert_eq!(first.total_pages, last.total_pages);
        assert_eq!(first.total, last.total);
    }

    #[test]
    fn map_preserves_bookkeeping() {
        let page = Page::new(vec![1, 2], 7, PageRequest::new(1, 2));
        let mapped = page.map(|n| n.to_string());
        assert_eq!(mapped.items, vec!["1", "2"]);
        assert_eq!(mapped.total, 7);
        assert_eq!(mapped.total_pages, 4);
    }
}
