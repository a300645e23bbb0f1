//! Pagination request
//!
//! The input contract for paged reads. Page numbers and sizes are clamped on
//! every path in, so `page >= 1` and `1 <= page_size <= 100` always hold.

use std::collections::BTreeMap;

use serde::Deserialize;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// A normalized request for one page of data
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawPaginationRequest")]
pub struct PaginationRequest {
    page: u32,
    page_size: u32,
    search_term: Option<String>,
    sort_column: Option<String>,
    sort_direction: Option<String>,
    filters: BTreeMap<String, String>,
}

impl PaginationRequest {
    /// Create a request; out-of-range values are clamped, never rejected
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: clamp_page(page),
            page_size: clamp_page_size(page_size),
            search_term: None,
            sort_column: None,
            sort_direction: None,
            filters: BTreeMap::new(),
        }
    }

    pub fn with_search(mut self, term: &str) -> Self {
        self.set_search(Some(term));
        self
    }

    pub fn with_sort(mut self, column: &str, direction: &str) -> Self {
        self.sort_column = non_blank(Some(column));
        self.sort_direction = non_blank(Some(direction));
        self
    }

    /// Add a `key` or `key__operator` filter; a repeated key replaces the value
    pub fn with_filter(mut self, key: &str, value: impl Into<String>) -> Self {
        self.filters.insert(key.to_string(), value.into());
        self
    }

    pub fn with_filters<I, K, V>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.filters
            .extend(filters.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn set_page(&mut self, page: i64) {
        self.page = clamp_page(page);
    }

    pub fn set_page_size(&mut self, page_size: i64) {
        self.page_size = clamp_page_size(page_size);
    }

    pub fn set_search(&mut self, term: Option<&str>) {
        self.search_term = non_blank(term);
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search_term.as_deref()
    }

    pub fn sort_column(&self) -> Option<&str> {
        self.sort_column.as_deref()
    }

    pub fn sort_direction(&self) -> Option<&str> {
        self.sort_direction.as_deref()
    }

    pub fn filters(&self) -> &BTreeMap<String, String> {
        &self.filters
    }

    /// Rows skipped before this page
    pub fn skip(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    pub fn has_search(&self) -> bool {
        self.search_term.is_some()
    }

    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    pub fn has_sorting(&self) -> bool {
        self.sort_column.is_some()
    }

    /// True unless the direction is `desc` in any case
    pub fn is_ascending(&self) -> bool {
        !self
            .sort_direction
            .as_deref()
            .is_some_and(|d| d.trim().eq_ignore_ascii_case("desc"))
    }
}

impl Default for PaginationRequest {
    fn default() -> Self {
        Self::new(1, i64::from(DEFAULT_PAGE_SIZE))
    }
}

/// Wire shape accepted from query strings and JSON bodies
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawPaginationRequest {
    page: Option<i64>,
    page_size: Option<i64>,
    search_term: Option<String>,
    sort_column: Option<String>,
    sort_direction: Option<String>,
    filters: BTreeMap<String, String>,
}

impl From<RawPaginationRequest> for PaginationRequest {
    fn from(raw: RawPaginationRequest) -> Self {
        let mut request = PaginationRequest::new(
            raw.page.unwrap_or(1),
            raw.page_size.unwrap_or(i64::from(DEFAULT_PAGE_SIZE)),
        );
        request.set_search(raw.search_term.as_deref());
        request.sort_column = non_blank(raw.sort_column.as_deref());
        request.sort_direction = non_blank(raw.sort_direction.as_deref());
        request.filters = raw.filters;
        request
    }
}

fn clamp_page(page: i64) -> u32 {
    page.clamp(1, i64::from(u32::MAX)) as u32
}

fn clamp_page_size(page_size: i64) -> u32 {
    if page_size < 1 {
        DEFAULT_PAGE_SIZE
    } else {
        page_size.min(i64::from(MAX_PAGE_SIZE)) as u32
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
