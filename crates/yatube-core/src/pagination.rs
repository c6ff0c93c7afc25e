//! Fixed-size page slicing for post feeds.

use serde::Serialize;

/// Number of posts shown on every feed page.
pub const POSTS_PER_PAGE: u64 = 10;

/// Computes page windows over an ordered collection.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    per_page: u64,
}

/// The slice of a collection that makes up one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// 1-based page number actually served.
    pub number: u64,
    pub num_pages: u64,
    /// Total items across all pages.
    pub count: u64,
    pub offset: u64,
    pub limit: u64,
}

/// One page of items plus the metadata templates need for navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub object_list: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_page_number: Option<u64>,
    pub next_page_number: Option<u64>,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(POSTS_PER_PAGE)
    }
}

impl Paginator {
    pub const fn new(per_page: u64) -> Self {
        Self { per_page }
    }

    /// Number of pages needed for `total` items. An empty collection still has one page.
    pub fn num_pages(&self, total: u64) -> u64 {
        if total == 0 || self.per_page == 0 {
            1
        } else {
            total.div_ceil(self.per_page)
        }
    }

    /// Resolve the requested page against `total` items.
    ///
    /// Missing, non-numeric or non-positive page numbers resolve to the first page;
    /// numbers past the end resolve to the last page. Never fails.
    ///
    /// Unlike Django's `Paginator.get_page`, which sends `0` and negative numbers
    /// to the last page, every value below 1 lands on page 1 here.
    pub fn window(&self, total: u64, requested: Option<&str>) -> PageWindow {
        let num_pages = self.num_pages(total);
        let number = requested
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|n| *n >= 1)
            .unwrap_or(1)
            .min(num_pages);

        let offset = (number - 1) * self.per_page;
        let limit = self.per_page.min(total.saturating_sub(offset));

        PageWindow {
            number,
            num_pages,
            count: total,
            offset,
            limit,
        }
    }

}

impl<T> Page<T> {
    pub fn new(object_list: Vec<T>, window: &PageWindow) -> Self {
        let has_previous = window.number > 1;
        let has_next = window.number < window.num_pages;

        Self {
            object_list,
            number: window.number,
            num_pages: window.num_pages,
            count: window.count,
            has_previous,
            has_next,
            previous_page_number: has_previous.then(|| window.number - 1),
            next_page_number: has_next.then(|| window.number + 1),
        }
    }
}
