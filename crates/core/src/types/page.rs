//! Paginated list responses.

use serde::{Deserialize, Serialize};

/// One page of a backend listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Total number of items across all pages.
    pub total: u64,
    /// 1-based page number.
    pub page: u32,
    /// Page size requested.
    pub limit: u32,
}

impl<T> Page<T> {
    /// An empty first page.
    #[must_use]
    pub const fn empty(limit: u32) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            limit,
        }
    }

    /// Number of pages, at least 1.
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        if self.limit == 0 {
            return 1;
        }
        let pages = self.total.div_ceil(u64::from(self.limit)).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Whether a later page exists.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Whether an earlier page exists.
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Map the items, keeping the pagination metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(total: u64, page: u32, limit: u32) -> Page<()> {
        Page {
            items: Vec::new(),
            total,
            page,
            limit,
        }
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(page(0, 1, 12).total_pages(), 1);
        assert_eq!(page(12, 1, 12).total_pages(), 1);
        assert_eq!(page(13, 1, 12).total_pages(), 2);
        assert_eq!(page(5, 1, 0).total_pages(), 1);
    }

    #[test]
    fn test_navigation_flags() {
        assert!(page(30, 1, 12).has_next());
        assert!(!page(30, 3, 12).has_next());
        assert!(page(30, 2, 12).has_prev());
        assert!(!page(30, 1, 12).has_prev());
    }
}
