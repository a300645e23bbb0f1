//! Paginated result envelope

use serde::Serialize;

/// One page of items with the metadata needed to page further
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult<T> {
    items: Vec<T>,
    total_count: u64,
    page: u32,
    page_size: u32,
    total_pages: u64,
}

impl<T> PaginatedResult<T> {
    /// Callers guarantee `items.len() <= page_size`
    pub(crate) fn new(items: Vec<T>, total_count: u64, page: u32, page_size: u32) -> Self {
        Self {
            items,
            total_count,
            page,
            page_size,
            total_pages: total_pages(total_count, page_size),
        }
    }

    /// A page with no items and a total count of zero
    pub fn empty(page: u32, page_size: u32) -> Self {
        Self::new(Vec::new(), 0, page, page_size)
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    pub fn has_next_page(&self) -> bool {
        u64::from(self.page) < self.total_pages
    }

    pub fn has_previous_page(&self) -> bool {
        self.page > 1
    }

    /// Convert every item while keeping the page metadata
    pub fn map<U, F>(self, f: F) -> PaginatedResult<U>
    where
        F: FnMut(T) -> U,
    {
        PaginatedResult {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}

fn total_pages(total_count: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total_count.div_ceil(u64::from(page_size))
}
