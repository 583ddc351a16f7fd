//! Pagination controller.
//!
//! Pages are 1-based. `total_pages` is never less than 1, so an empty table
//! still has a (empty) first page, and `1 <= current_page <= total_pages`
//! holds after every mutation.

use std::ops::Range;

use serde::Serialize;

use crate::error::ConfigError;

/// Page metadata, independent of the row type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub current_page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub has_next_page: bool,
    pub has_previous_page: bool,
    /// 1-based position of the first row on this page, 0 when empty.
    pub first_item: usize,
    /// 1-based position of the last row on this page, 0 when empty.
    pub last_item: usize,
}

impl PageInfo {
    fn new(total_items: usize, page_size: usize, current_page: usize) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total_pages(total_items, page_size);
        let current_page = current_page.clamp(1, total_pages);
        let range = page_range(total_items, page_size, current_page);
        let (first_item, last_item) = if range.is_empty() {
            (0, 0)
        } else {
            (range.start + 1, range.end)
        };
        Self {
            current_page,
            page_size,
            total_items,
            total_pages,
            has_next_page: current_page < total_pages,
            has_previous_page: current_page > 1,
            first_item,
            last_item,
        }
    }

    /// Index range of this page within the full sequence.
    pub fn range(&self) -> Range<usize> {
        page_range(self.total_items, self.page_size, self.current_page)
    }
}

/// One page of rows plus its metadata.
#[derive(Debug)]
pub struct Page<'a, T> {
    pub rows: &'a [T],
    pub info: PageInfo,
}

/// Entry in a compact page-number list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PageLink {
    Page(usize),
    /// Skipped run of pages.
    Gap,
}

fn total_pages(total_items: usize, page_size: usize) -> usize {
    total_items.div_ceil(page_size.max(1)).max(1)
}

fn page_range(total_items: usize, page_size: usize, current_page: usize) -> Range<usize> {
    let start = (current_page - 1).saturating_mul(page_size).min(total_items);
    let end = start.saturating_add(page_size).min(total_items);
    start..end
}

/// Slice out page `current_page` of `rows`, clamping the page into range.
///
/// # Example
///
/// ```
/// use kubetable::paginate;
///
/// let rows: Vec<u32> = (1..=25).collect();
/// let page = paginate(&rows, 10, 3);
/// assert_eq!(page.rows, &[21, 22, 23, 24, 25]);
/// assert_eq!(page.info.total_pages, 3);
/// assert!(!page.info.has_next_page);
/// ```
pub fn paginate<T>(rows: &[T], page_size: usize, current_page: usize) -> Page<'_, T> {
    let info = PageInfo::new(rows.len(), page_size, current_page);
    Page {
        rows: &rows[info.range()],
        info,
    }
}

/// Current page, page size and item count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    current_page: usize,
    page_size: usize,
    total_items: usize,
}

impl Pagination {
    /// Start on page 1 with no items. A zero page size is raised to 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
            total_items: 0,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.total_items, self.page_size)
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages()
    }

    pub fn has_previous_page(&self) -> bool {
        self.current_page > 1
    }

    pub fn info(&self) -> PageInfo {
        PageInfo::new(self.total_items, self.page_size, self.current_page)
    }

    /// Index range of the current page.
    pub fn range(&self) -> Range<usize> {
        page_range(self.total_items, self.page_size, self.current_page)
    }

    /// Jump to page `n`, clamped into `[1, total_pages]`. Returns `true` if the page changed.
    pub fn go_to_page(&mut self, n: usize) -> bool {
        let target = n.clamp(1, self.total_pages());
        let changed = target != self.current_page;
        self.current_page = target;
        changed
    }

    /// Advance one page. No-op on the last page.
    pub fn go_to_next_page(&mut self) -> bool {
        if !self.has_next_page() {
            return false;
        }
        self.current_page += 1;
        true
    }

    /// Go back one page. No-op on the first page.
    pub fn go_to_previous_page(&mut self) -> bool {
        if !self.has_previous_page() {
            return false;
        }
        self.current_page -= 1;
        true
    }

    pub fn go_to_first_page(&mut self) -> bool {
        self.go_to_page(1)
    }

    pub fn go_to_last_page(&mut self) -> bool {
        self.go_to_page(self.total_pages())
    }

    /// Change the page size and return to page 1.
    pub fn change_page_size(&mut self, size: usize) -> Result<(), ConfigError> {
        if size == 0 {
            return Err(ConfigError::InvalidPageSize(size));
        }
        self.page_size = size;
        self.current_page = 1;
        Ok(())
    }

    /// Record a new item count.
    ///
    /// If the current page would fall outside the new range it resets to 1.
    /// Returns `true` in that case.
    pub fn set_total_items(&mut self, total: usize) -> bool {
        self.total_items = total;
        if self.current_page > self.total_pages() {
            self.current_page = 1;
            return true;
        }
        false
    }

    /// Return to page 1.
    pub fn reset(&mut self) -> bool {
        self.go_to_first_page()
    }

    /// Page numbers around the current page with gaps elided.
    ///
    /// Always includes the first and last page plus `window` pages on each
    /// side of the current one.
    pub fn page_numbers(&self, window: usize) -> Vec<PageLink> {
        let total = self.total_pages();
        let lo = self.current_page.saturating_sub(window).max(1);
        let hi = self.current_page.saturating_add(window).min(total);

        let mut links = Vec::new();
        if lo > 1 {
            links.push(PageLink::Page(1));
            if lo > 2 {
                links.push(PageLink::Gap);
            }
        }
        links.extend((lo..=hi).map(PageLink::Page));
        if hi < total {
            if hi + 1 < total {
                links.push(PageLink::Gap);
            }
            links.push(PageLink::Page(total));
        }
        links
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(10)
    }
}
