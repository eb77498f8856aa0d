//! Pagination utilities for service layer
//!
//! `Pagination` carries validated 1-based page parameters; `PageEnvelope`
//! slices an already sorted, already filtered result set.

use serde::Serialize;

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub per_page: u32,
}

impl Pagination {
    /// Index of the first item on this page.
    pub fn offset(self) -> usize {
        (self.page.max(1) as usize - 1).saturating_mul(self.per_page as usize)
    }

    /// ceil(total / per_page); zero when there is nothing to show.
    pub fn total_pages(self, total: usize) -> usize {
        let per = self.per_page.max(1) as usize;
        total.div_ceil(per)
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: 10 } }
}

/// One page of results with navigation metadata.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PageEnvelope<T> {
    pub list: Vec<T>,
    pub has_next: bool,
    pub has_prev: bool,
    pub page: u32,
    pub pages: usize,
    pub limit: u32,
    pub total: usize,
}

impl<T> PageEnvelope<T> {
    /// Cut the page window out of `items`. `total` counts every item passed in.
    pub fn paginate(items: Vec<T>, p: Pagination) -> Self {
        let total = items.len();
        let pages = p.total_pages(total);
        let list = items.into_iter().skip(p.offset()).take(p.per_page as usize).collect();
        Self {
            list,
            has_next: (p.page as usize) < pages,
            has_prev: p.page > 1 && total > 0,
            page: p.page,
            pages,
            limit: p.per_page,
            total,
        }
    }
}
