//! Page requests and paged results
//!
//! Listing endpoints accept loosely-typed `page`/`per_page` query values.
//! `PageRequest` normalises them once so repositories only ever see sane
//! bounds, and `Page` carries the totals needed to render page counts.

use serde::Serialize;

/// Page size used when the caller gives none (or an unusable one)
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Upper bound on the page size
pub const MAX_PER_PAGE: u32 = 100;

/// A normalised request for one page of results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// Builds a page request from raw caller input
    ///
    /// * missing or `< 1` page becomes page 1
    /// * missing or `< 1` per_page becomes [`DEFAULT_PER_PAGE`]
    /// * per_page above [`MAX_PER_PAGE`] is clamped
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        let page = match page {
            Some(p) if p >= 1 => p.min(u32::MAX as i64) as u32,
            _ => 1,
        };
        let per_page = match per_page {
            Some(n) if n >= 1 => n.min(MAX_PER_PAGE as i64) as u32,
            _ => DEFAULT_PER_PAGE,
        };
        Self { page, per_page }
    }

    /// 1-based page number
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Number of rows to skip
    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.per_page as i64
    }

    /// Number of rows to fetch
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results plus the total across all pages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page(),
            per_page: request.per_page(),
        }
    }

    /// Total number of pages; zero when there are no results
    pub fn pages(&self) -> u64 {
        self.total.div_ceil(self.per_page as u64)
    }

    /// Transforms every item, keeping the paging metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let request = PageRequest::default();
        assert_eq!(request.page(), 1);
        assert_eq!(request.per_page(), DEFAULT_PER_PAGE);
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn test_clamping() {
        let request = PageRequest::new(Some(-3), Some(1_000));
        assert_eq!(request.page(), 1);
        assert_eq!(request.per_page(), MAX_PER_PAGE);

        let request = PageRequest::new(Some(3), Some(0));
        assert_eq!(request.per_page(), DEFAULT_PER_PAGE);
        assert_eq!(request.offset(), 20);
    }

    #[test]
    fn test_pages() {
        let request = PageRequest::new(Some(1), Some(10));
        assert_eq!(Page::<()>::new(vec![], 0, request).pages(), 0);
        assert_eq!(Page::<()>::new(vec![], 10, request).pages(), 1);
        assert_eq!(Page::<()>::new(vec![], 11, request).pages(), 2);
    }
}
