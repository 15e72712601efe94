//! Client-side pagination over an in-memory row list.

use std::ops::Range;

/// Zero-based page cursor over `total` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page_size: usize,
    current_page: usize,
    total: usize,
}

impl Pagination {
    /// `page_size` of zero is treated as one.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 0,
            total: 0,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of pages; zero rows still count as one (empty) page.
    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.page_size).max(1)
    }

    /// Update the row count, keeping the cursor on a valid page.
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        self.current_page = self.current_page.min(self.total_pages() - 1);
    }

    pub fn first_page(&mut self) {
        self.current_page = 0;
    }

    pub fn prev_page(&mut self) {
        self.current_page = self.current_page.saturating_sub(1);
    }

    pub fn next_page(&mut self) {
        if self.current_page + 1 < self.total_pages() {
            self.current_page += 1;
        }
    }

    pub fn last_page(&mut self) {
        self.current_page = self.total_pages() - 1;
    }

    /// Jump to a zero-based page, clamped to the last page.
    pub fn go_to_page(&mut self, page: usize) {
        self.current_page = page.min(self.total_pages() - 1);
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 0
    }

    pub fn has_next(&self) -> bool {
        self.current_page + 1 < self.total_pages()
    }

    /// Row indices on the current page.
    pub fn range(&self) -> Range<usize> {
        let start = (self.current_page * self.page_size).min(self.total);
        let end = (start + self.page_size).min(self.total);
        start..end
    }

    /// Rows of `items` on the current page.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let range = self.range();
        &items[range.start.min(items.len())..range.end.min(items.len())]
    }

    /// "Showing 26-50 of 60", or "No records" when empty.
    pub fn summary(&self) -> String {
        if self.total == 0 {
            return "No records".to_string();
        }
        let range = self.range();
        format!("Showing {}-{} of {}", range.start + 1, range.end, self.total)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(25)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paged(total: usize) -> Pagination {
        let mut p = Pagination::new(25);
        p.set_total(total);
        p
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(paged(0).total_pages(), 1);
        assert_eq!(paged(25).total_pages(), 1);
        assert_eq!(paged(26).total_pages(), 2);
        assert_eq!(paged(60).total_pages(), 3);
    }

    #[test]
    fn test_navigation_bounds() {
        let mut p = paged(60);
        p.prev_page();
        assert_eq!(p.current_page(), 0);
        assert!(!p.has_prev());

        p.next_page();
        p.next_page();
        p.next_page();
        assert_eq!(p.current_page(), 2);
        assert!(!p.has_next());
        assert_eq!(p.range(), 50..60);

        p.first_page();
        assert_eq!(p.range(), 0..25);
        p.last_page();
        assert_eq!(p.current_page(), 2);

        p.go_to_page(1);
        assert_eq!(p.range(), 25..50);
        p.go_to_page(99);
        assert_eq!(p.current_page(), 2);
    }

    #[test]
    fn test_shrinking_total_clamps_page() {
        let mut p = paged(60);
        p.last_page();
        p.set_total(10);
        assert_eq!(p.current_page(), 0);
        assert_eq!(p.range(), 0..10);
    }

    #[test]
    fn test_summary() {
        let mut p = paged(60);
        assert_eq!(p.summary(), "Showing 1-25 of 60");
        p.next_page();
        assert_eq!(p.summary(), "Showing 26-50 of 60");
        p.last_page();
        assert_eq!(p.summary(), "Showing 51-60 of 60");
        assert_eq!(paged(0).summary(), "No records");
    }

    #[test]
    fn test_slice_and_zero_page_size() {
        let items: Vec<u32> = (0..30).collect();
        assert_eq!(Pagination::new(0).page_size(), 1);

        let mut p = Pagination::new(25);
        p.set_total(items.len());
        p.next_page();
        assert_eq!(p.slice(&items), &[25, 26, 27, 28, 29]);
    }
}
