//! Pagination metadata for search results.

use serde::{Deserialize, Serialize};

/// Where a page of search results sits within the full result set.
///
/// The caller sets `current_page` and `items_per_page`; the repository fills
/// in `total_item`, `total_page` and `item_count` after the search returns.
///
/// # Example
///
/// ```
/// use document_search_shared::PaginationMetadata;
///
/// let mut meta = PaginationMetadata::new(3, 10);
/// assert_eq!(meta.offset(), Some(20));
///
/// meta.set_totals(25, 5);
/// assert_eq!(meta.total_page, 3);
/// assert_eq!(meta.item_count, 5);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationMetadata {
    /// Page size requested by the caller. Must be positive.
    pub items_per_page: usize,
    /// 1-based page number requested by the caller.
    pub current_page: usize,
    /// Total number of matching documents reported by the engine.
    pub total_item: usize,
    /// Number of pages needed to cover `total_item`.
    pub total_page: usize,
    /// Number of hits actually returned for this page.
    pub item_count: usize,
}

impl PaginationMetadata {
    /// Create metadata for the given page and page size with empty totals.
    ///
    /// # Arguments
    ///
    /// * `current_page` - 1-based page number (0 is treated as the first page)
    /// * `items_per_page` - Page size
    pub fn new(current_page: usize, items_per_page: usize) -> Self {
        Self {
            items_per_page,
            current_page,
            total_item: 0,
            total_page: 0,
            item_count: 0,
        }
    }

    /// Number of documents to skip before this page starts.
    ///
    /// Returns `None` when the offset does not fit in a `usize`.
    pub fn offset(&self) -> Option<usize> {
        self.current_page
            .saturating_sub(1)
            .checked_mul(self.items_per_page)
    }

    /// Record the totals reported by the engine for this page.
    ///
    /// `total_page` is `total_item / items_per_page`, plus one when there is a
    /// remainder. `item_count` is taken as given, not recomputed from the totals:
    /// the number of hits the engine returned is authoritative.
    pub fn set_totals(&mut self, total_item: usize, item_count: usize) {
        self.total_item = total_item;
        self.item_count = item_count;
        self.total_page = if self.items_per_page == 0 {
            0
        } else {
            total_item.div_ceil(self.items_per_page)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        assert_eq!(PaginationMetadata::new(1, 10).offset(), Some(0));
        assert_eq!(PaginationMetadata::new(2, 10).offset(), Some(10));
        assert_eq!(PaginationMetadata::new(5, 25).offset(), Some(100));
        assert_eq!(PaginationMetadata::new(0, 10).offset(), Some(0));
    }

    #[test]
    fn test_offset_overflow_is_none() {
        assert_eq!(PaginationMetadata::new(usize::MAX / 2, 10).offset(), None);
        assert_eq!(PaginationMetadata::new(usize::MAX, 2).offset(), None);
        assert_eq!(PaginationMetadata::new(usize::MAX, 1).offset(), Some(usize::MAX - 1));
    }

    #[test]
    fn test_total_page_rounds_up() {
        let mut meta = PaginationMetadata::new(1, 10);

        meta.set_totals(25, 10);
        assert_eq!(meta.total_page, 3);

        meta.set_totals(20, 10);
        assert_eq!(meta.total_page, 2);

        meta.set_totals(1, 1);
        assert_eq!(meta.total_page, 1);

        meta.set_totals(0, 0);
        assert_eq!(meta.total_page, 0);
    }

    #[test]
    fn test_total_page_matches_ceiling_division() {
        for items_per_page in 1..=12usize {
            for total_item in 0..=100usize {
                let mut meta = PaginationMetadata::new(1, items_per_page);
                meta.set_totals(total_item, 0);

                let expected = (total_item as f64 / items_per_page as f64).ceil() as usize;
                assert_eq!(
                    meta.total_page, expected,
                    "items_per_page={}, total_item={}",
                    items_per_page, total_item
                );
            }
        }
    }

    #[test]
    fn test_item_count_is_taken_as_given() {
        let mut meta = PaginationMetadata::new(3, 10);
        meta.set_totals(25, 5);

        assert_eq!(meta.total_item, 25);
        assert_eq!(meta.item_count, 5);
        assert_eq!(meta.items_per_page, 10);
        assert_eq!(meta.current_page, 3);
    }

    #[test]
    fn test_zero_page_size_does_not_panic() {
        let mut meta = PaginationMetadata::new(1, 0);
        meta.set_totals(10, 0);
        assert_eq!(meta.total_page, 0);
    }

    #[test]
    fn test_serialization() {
        let mut meta = PaginationMetadata::new(2, 10);
        meta.set_totals(42, 10);

        let json = serde_json::to_value(meta).unwrap();
        assert_eq!(json["items_per_page"], 10);
        assert_eq!(json["current_page"], 2);
        assert_eq!(json["total_item"], 42);
        assert_eq!(json["total_page"], 5);
        assert_eq!(json["item_count"], 10);
    }
}
