use std::ops::Range;

/// Default number of records shown per page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Windows a large ordered record sequence into pages and tracks
/// expand/collapse state per record.
///
/// Pages are 1-based. Expansion is addressed by absolute index into the
/// full sequence, not the page-local index, so it survives page
/// navigation. The pager only knows the sequence length; the records
/// themselves stay with the session monitor.
#[derive(Debug, Clone)]
pub struct RecordPager {
    page: usize,
    page_size: usize,
    expanded: Vec<bool>,
}

impl Default for RecordPager {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            expanded: Vec::new(),
        }
    }
}

impl RecordPager {
    /// Bind to a (new) record sequence of the given length: back to
    /// page 1, everything collapsed.
    pub fn rebind(&mut self, len: usize) {
        self.page = 1;
        self.expanded = vec![false; len];
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Total pages for the bound sequence; an empty sequence still has
    /// one (empty) page.
    pub fn page_count(&self) -> usize {
        let len = self.expanded.len();
        if len == 0 {
            1
        } else {
            len.div_ceil(self.page_size)
        }
    }

    /// Move to a page, clamped into the valid range.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.page_count());
    }

    /// Change the page size; resets to page 1.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    /// Absolute index range of the current page.
    pub fn page_range(&self) -> Range<usize> {
        let len = self.expanded.len();
        let start = (self.page - 1).saturating_mul(self.page_size).min(len);
        let end = start.saturating_add(self.page_size).min(len);
        start..end
    }

    /// Whether the record at the absolute index is expanded.
    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded.get(index).copied().unwrap_or(false)
    }

    /// Flip the expanded state of the record at the absolute index.
    /// Out-of-range indices are ignored.
    pub fn toggle_expanded(&mut self, index: usize) {
        if let Some(flag) = self.expanded.get_mut(index) {
            *flag = !*flag;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_is_ceiling_of_len_over_size() {
        let mut pager = RecordPager::default();
        pager.set_page_size(10);

        pager.rebind(0);
        assert_eq!(pager.page_count(), 1);
        pager.rebind(10);
        assert_eq!(pager.page_count(), 1);
        pager.rebind(11);
        assert_eq!(pager.page_count(), 2);
        pager.rebind(95);
        assert_eq!(pager.page_count(), 10);
    }

    #[test]
    fn page_range_slices_by_one_based_page() {
        let mut pager = RecordPager::default();
        pager.set_page_size(10);
        pager.rebind(25);

        assert_eq!(pager.page_range(), 0..10);
        pager.set_page(3);
        assert_eq!(pager.page_range(), 20..25);
        // Clamped to the last page.
        pager.set_page(99);
        assert_eq!(pager.page(), 3);
    }

    #[test]
    fn expansion_is_absolute_and_survives_navigation() {
        let mut pager = RecordPager::default();
        pager.set_page_size(10);
        pager.rebind(30);

        pager.toggle_expanded(12);
        pager.set_page(3);
        pager.set_page(1);
        assert!(pager.is_expanded(12));
        assert!(!pager.is_expanded(13));

        // Changing page size moves back to page 1 but keeps expansion.
        pager.set_page(2);
        pager.set_page_size(5);
        assert_eq!(pager.page(), 1);
        assert!(pager.is_expanded(12));
    }

    #[test]
    fn rebind_collapses_everything_and_resets_page() {
        let mut pager = RecordPager::default();
        pager.set_page_size(10);
        pager.rebind(30);
        pager.toggle_expanded(5);
        pager.set_page(2);

        pager.rebind(8);
        assert_eq!(pager.page(), 1);
        assert!(!pager.is_expanded(5));
    }

    #[test]
    fn out_of_range_toggle_is_ignored() {
        let mut pager = RecordPager::default();
        pager.rebind(3);
        pager.toggle_expanded(10);
        assert!(!pager.is_expanded(10));
    }
}
