//! # Pagination
//!
//! Offset pagination over an already materialized sequence. The engine never
//! fails: out-of-range parameters are clamped or produce an empty page.

pub mod uri;

pub use uri::PaginationUriBuilder;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Page size used when the caller gives none or an invalid one.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Page number used when the caller gives none or an invalid one.
pub const DEFAULT_PAGE_NUMBER: u64 = 1;

/// Caller-supplied page number and size after clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_number: u64,
    pub page_size: u64,
}

impl PageRequest {
    /// Builds a request from raw integers, clamping `page < 1` to 1 and
    /// `page_size < 1` to [`DEFAULT_PAGE_SIZE`].
    pub fn new(page: i64, page_size: i64) -> Self {
        let page_number = u64::try_from(page)
            .ok()
            .filter(|p| *p >= 1)
            .unwrap_or(DEFAULT_PAGE_NUMBER);
        let page_size = u64::try_from(page_size)
            .ok()
            .filter(|s| *s >= 1)
            .unwrap_or(DEFAULT_PAGE_SIZE);

        Self {
            page_number,
            page_size,
        }
    }

    /// Parses query-string values; anything missing or non-numeric falls back
    /// to the defaults.
    pub fn from_query(page: Option<&str>, page_size: Option<&str>) -> Self {
        let parse = |value: Option<&str>| value.and_then(|v| v.trim().parse::<i64>().ok());

        Self::new(
            parse(page).unwrap_or(DEFAULT_PAGE_NUMBER as i64),
            parse(page_size).unwrap_or(DEFAULT_PAGE_SIZE as i64),
        )
    }

    /// Index of the first item on this page.
    fn offset(&self) -> u64 {
        (self.page_number - 1).saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_number: DEFAULT_PAGE_NUMBER,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of a larger sequence plus navigation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page, in source order
    pub items: Vec<T>,
    /// Requested page number after clamping (may exceed `total_pages`)
    pub current_page: u64,
    pub page_size: u64,
    pub total_records: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl<T> Page<T> {
    /// Maps the items of the page, keeping the metadata.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            current_page: self.current_page,
            page_size: self.page_size,
            total_records: self.total_records,
            total_pages: self.total_pages,
            has_next_page: self.has_next_page,
            has_previous_page: self.has_previous_page,
        }
    }
}

/// Slices `source` into the requested page.
///
/// `page < 1` is treated as 1 and `page_size < 1` as [`DEFAULT_PAGE_SIZE`].
/// A page past the end yields no items but still reports the requested page
/// number, so `has_previous_page` can be true on an empty page.
pub fn paginate<T, I>(source: I, page: i64, page_size: i64) -> Page<T>
where
    I: IntoIterator<Item = T>,
    I::IntoIter: ExactSizeIterator,
{
    paginate_request(source, PageRequest::new(page, page_size))
}

/// Same as [`paginate`] with an already clamped request.
pub fn paginate_request<T, I>(source: I, request: PageRequest) -> Page<T>
where
    I: IntoIterator<Item = T>,
    I::IntoIter: ExactSizeIterator,
{
    let iter = source.into_iter();
    let total_records = iter.len() as u64;
    let total_pages = total_records.div_ceil(request.page_size);

    let skip = usize::try_from(request.offset()).unwrap_or(usize::MAX);
    let take = usize::try_from(request.page_size).unwrap_or(usize::MAX);
    let items: Vec<T> = iter.skip(skip).take(take).collect();

    Page {
        items,
        current_page: request.page_number,
        page_size: request.page_size,
        total_records,
        total_pages,
        has_next_page: request.page_number < total_pages,
        has_previous_page: request.page_number > 1,
    }
}
