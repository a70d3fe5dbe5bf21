//! Pager state types
//!
//! `PageInfo` and the result set live together in a `PagerState`, which is
//! the value published to subscribers on every change.

use super::previous::Previous;
use crate::error::{Error, Result};
use crate::types::{FetchMode, JsonValue, PageParams};
use serde::Serialize;

/// Pagination position and the last reported total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Current page, 1-based
    pub page: u32,
    /// Records per page
    pub page_size: u32,
    /// Total record count as last reported by the data source
    pub total: u64,
    /// Whether pages exist beyond the current one
    pub has_more: bool,
}

impl PageInfo {
    /// Create page info with no reported total
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            total: 0,
            has_more: false,
        }
    }

    /// `total > page_size * page`
    pub fn compute_has_more(total: u64, page_size: u32, page: u32) -> bool {
        total > u64::from(page_size) * u64::from(page)
    }

    /// Parameters for fetching the current page
    pub fn params(&self) -> PageParams {
        PageParams::new(self.page, self.page_size)
    }

    /// Store a freshly reported total and derive `has_more` from it
    pub(crate) fn apply_total(&mut self, total: u64) {
        self.total = total;
        self.has_more = Self::compute_has_more(total, self.page_size, self.page);
    }
}

/// Shallow update of `PageInfo`; `None` fields keep their current value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageInfoPatch {
    /// New page index
    pub page: Option<u32>,
    /// New page size
    pub page_size: Option<u32>,
    /// New total
    pub total: Option<u64>,
}

impl PageInfoPatch {
    /// Create an empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page index
    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Set the page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Set the total
    #[must_use]
    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    /// Reject zero page or page size
    pub fn validate(&self) -> Result<()> {
        if self.page == Some(0) {
            return Err(Error::InvalidPageInfo { field: "page" });
        }
        if self.page_size == Some(0) {
            return Err(Error::InvalidPageInfo { field: "page_size" });
        }
        Ok(())
    }

    pub(crate) fn apply(&self, info: &mut PageInfo) {
        if let Some(page) = self.page {
            info.page = page;
        }
        if let Some(page_size) = self.page_size {
            info.page_size = page_size;
        }
        if let Some(total) = self.total {
            info.total = total;
        }
    }
}

/// Construction-time defaults restored by `Pager::reset`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Defaults {
    pub current: u32,
    pub page_size: u32,
}

impl Defaults {
    pub fn page_info(self) -> PageInfo {
        PageInfo::new(self.current, self.page_size)
    }
}

/// What a pagination update asks the pager to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PaginationChange {
    /// Nothing observable changed
    Unchanged,
    /// Page size changed; page was reset to 1
    PageSize,
    /// Page changed
    Page { mode: FetchMode, fetch: bool },
}

/// Everything a pager owns, as seen by subscribers
#[derive(Debug, Clone)]
pub struct PagerState<T> {
    pub(crate) page_info: PageInfo,
    pub(crate) data: Vec<T>,
    pub(crate) loading: Option<bool>,
    pub(crate) effects: Vec<JsonValue>,
    prev_page: Previous<u32>,
    prev_page_size: Previous<u32>,
    prev_effects: Previous<Vec<JsonValue>>,
}

impl<T> PagerState<T> {
    pub(crate) fn new(defaults: Defaults, data: Vec<T>, effects: Vec<JsonValue>) -> Self {
        let mut state = Self {
            page_info: defaults.page_info(),
            data,
            loading: None,
            effects,
            prev_page: Previous::new(),
            prev_page_size: Previous::new(),
            prev_effects: Previous::new(),
        };
        state.seed_pagination();
        state
    }

    /// Current result set
    pub fn data_source(&self) -> &[T] {
        &self.data
    }

    /// `None` before the first fetch, then whether one is in flight
    pub fn loading(&self) -> Option<bool> {
        self.loading
    }

    /// Whether a fetch is in flight
    pub fn is_loading(&self) -> bool {
        self.loading == Some(true)
    }

    /// Whether pages exist beyond the current one
    pub fn has_more(&self) -> bool {
        self.page_info.has_more
    }

    /// Current page
    pub fn current(&self) -> u32 {
        self.page_info.page
    }

    /// Records per page
    pub fn page_size(&self) -> u32 {
        self.page_info.page_size
    }

    /// Last reported total
    pub fn total(&self) -> u64 {
        self.page_info.total
    }

    /// The whole pagination record
    pub fn page_info(&self) -> PageInfo {
        self.page_info
    }

    /// Current effect dependency list
    pub fn effects(&self) -> &[JsonValue] {
        &self.effects
    }

    /// Make the current page and page size the previous observation.
    pub(crate) fn seed_pagination(&mut self) {
        self.prev_page.observe(self.page_info.page);
        self.prev_page_size.observe(self.page_info.page_size);
    }

    /// Compare the current pagination against the previous observation.
    ///
    /// A page size change wins over a page change and resets the page to 1.
    /// The append gate checks against the pages before the requested one, not
    /// a single page, so infinite scroll keeps fetching past page 2.
    pub(crate) fn observe_pagination(&mut self, mode: FetchMode) -> PaginationChange {
        let PageInfo {
            page, page_size, ..
        } = self.page_info;
        let prev_page = self.prev_page.observe(page);
        let prev_page_size = self.prev_page_size.observe(page_size);

        if prev_page_size.is_some_and(|prev| prev != page_size) {
            self.page_info.page = 1;
            self.prev_page.observe(1);
            return PaginationChange::PageSize;
        }

        if prev_page == Some(page) {
            return PaginationChange::Unchanged;
        }

        let len = self.data.len() as u64;
        let fetch = match mode {
            FetchMode::Replace => len <= u64::from(page_size),
            // the list must not already hold the requested page
            FetchMode::Append => len <= u64::from(page_size) * u64::from(page.saturating_sub(1)),
        };
        PaginationChange::Page { mode, fetch }
    }

    /// Record the effect list as observed; `true` when it differs from the last one.
    pub(crate) fn observe_effects(&mut self) -> bool {
        let current = self.effects.clone();
        let previous = self.prev_effects.observe(current);
        previous.as_ref() != Some(&self.effects)
    }
}
