//! Paginated fetch controller
//!
//! All state sits in one `watch` channel. Every check-then-write happens
//! inside a single `send_if_modified` closure, so handles shared between
//! tasks still see at most one fetch in flight. Callbacks and the data
//! source are only ever called with no borrow of the channel held.
//!
//! Dropping an action's future while its fetch is pending abandons that
//! fetch: the result is never applied and `loading` settles back to
//! `Some(false)`, so the next action can fetch again.

use super::options::{ErrorCallback, LoadCallback, PagerOptions};
use super::types::{Defaults, PageInfo, PageInfoPatch, PaginationChange, PagerState};
use crate::error::{Error, Result};
use crate::source::DataSource;
use crate::types::{FetchMode, FetchOutcome, JsonValue};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Paginated fetch controller
///
/// Cloning is cheap; clones share the same state.
pub struct Pager<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    source: Arc<dyn DataSource<T>>,
    defaults: Defaults,
    state: watch::Sender<PagerState<T>>,
    on_load: Option<LoadCallback<T>>,
    on_request_error: Option<ErrorCallback>,
    alive: CancellationToken,
}

impl<T> Clone for Pager<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Pager<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create an idle pager. Nothing is fetched until `mount`.
    pub fn new(source: impl DataSource<T> + 'static, options: PagerOptions<T>) -> Result<Self> {
        Self::with_shared_source(Arc::new(source), options)
    }

    /// Create an idle pager over a source that is shared elsewhere
    pub fn with_shared_source(
        source: Arc<dyn DataSource<T>>,
        options: PagerOptions<T>,
    ) -> Result<Self> {
        let PagerOptions {
            config,
            default_data,
            on_load,
            on_request_error,
        } = options;
        config.validate()?;

        let defaults = Defaults {
            current: config.default_current,
            page_size: config.default_page_size,
        };
        let (state, _) = watch::channel(PagerState::new(defaults, default_data, config.effects));

        Ok(Self {
            inner: Arc::new(Inner {
                source,
                defaults,
                state,
                on_load,
                on_request_error,
                alive: CancellationToken::new(),
            }),
        })
    }

    /// Create a pager and perform the initial fetch
    pub async fn start(
        source: impl DataSource<T> + 'static,
        options: PagerOptions<T>,
    ) -> Result<Self> {
        let pager = Self::new(source, options)?;
        pager.mount().await;
        Ok(pager)
    }

    // ------------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------------

    /// Initial fetch: observe the effect list and load the current page
    pub async fn mount(&self) {
        if self.is_shut_down() {
            return;
        }
        self.inner.state.send_if_modified(|s| {
            s.observe_effects();
            false
        });
        self.fetch(FetchMode::Replace).await;
    }

    /// Refetch the current page, replacing the result set
    pub async fn reload(&self) {
        self.fetch(FetchMode::Replace).await;
    }

    /// Advance one page and append it, if more pages exist.
    ///
    /// Ignored while a fetch is in flight: the page it would append could
    /// not be requested, and the next call would skip over it.
    pub async fn fetch_more(&self) {
        let advanced = self
            .update_pagination(FetchMode::Append, |s| {
                if s.is_loading() || !s.page_info.has_more {
                    return false;
                }
                s.page_info.page = s.page_info.page.saturating_add(1);
                true
            })
            .await;
        if !advanced {
            debug!("fetch_more ignored: no more pages or a fetch is in flight");
        }
    }

    /// Go back to page 1
    pub async fn reset_page_index(&self) {
        self.update_pagination(FetchMode::Replace, |s| {
            s.page_info.page = 1;
            true
        })
        .await;
    }

    /// Jump to `page`, merging the result with the given mode
    pub async fn go_to_page(&self, page: u32, mode: FetchMode) -> Result<()> {
        PageInfoPatch::new().with_page(page).validate()?;
        self.update_pagination(mode, |s| {
            s.page_info.page = page;
            true
        })
        .await;
        Ok(())
    }

    /// Merge `patch` into the page info and react to what changed
    pub async fn set_page_info(&self, patch: PageInfoPatch) -> Result<()> {
        patch.validate()?;
        self.update_pagination(FetchMode::Replace, |s| {
            patch.apply(&mut s.page_info);
            true
        })
        .await;
        Ok(())
    }

    /// Restore the construction-time page info. Keeps the result set and
    /// does not fetch.
    pub fn reset(&self) {
        if self.is_shut_down() {
            return;
        }
        let defaults = self.inner.defaults;
        self.inner.state.send_modify(|s| {
            s.page_info = defaults.page_info();
            s.seed_pagination();
        });
    }

    /// Replace the effect dependency list, refetching if it changed
    pub async fn set_effects(&self, effects: Vec<JsonValue>) {
        if self.is_shut_down() {
            return;
        }
        let mut changed = false;
        self.inner.state.send_if_modified(|s| {
            s.effects = effects;
            changed = s.observe_effects();
            changed
        });
        if changed {
            self.fetch(FetchMode::Replace).await;
        }
    }

    /// Stop reacting. In-flight fetches finish but their results are dropped.
    pub fn shutdown(&self) {
        if !self.inner.alive.is_cancelled() {
            debug!("Pager shut down");
        }
        self.inner.alive.cancel();
    }

    /// Whether `shutdown` has been called on any handle
    pub fn is_shut_down(&self) -> bool {
        self.inner.alive.is_cancelled()
    }

    // ------------------------------------------------------------------------
    // Projections
    // ------------------------------------------------------------------------

    /// Receive every state change
    pub fn subscribe(&self) -> watch::Receiver<PagerState<T>> {
        self.inner.state.subscribe()
    }

    /// Clone of the current state
    pub fn snapshot(&self) -> PagerState<T> {
        self.inner.state.borrow().clone()
    }

    /// Run `f` against the current state without cloning it
    pub fn with_state<R>(&self, f: impl FnOnce(&PagerState<T>) -> R) -> R {
        let state = self.inner.state.borrow();
        f(&*state)
    }

    /// Current result set
    pub fn data_source(&self) -> Vec<T> {
        self.with_state(|s| s.data_source().to_vec())
    }

    /// `None` before the first fetch, then whether one is in flight
    pub fn loading(&self) -> Option<bool> {
        self.with_state(PagerState::loading)
    }

    /// Whether pages exist beyond the current one
    pub fn has_more(&self) -> bool {
        self.with_state(PagerState::has_more)
    }

    /// Current page
    pub fn current(&self) -> u32 {
        self.with_state(PagerState::current)
    }

    /// Records per page
    pub fn page_size(&self) -> u32 {
        self.with_state(PagerState::page_size)
    }

    /// Last reported total
    pub fn total(&self) -> u64 {
        self.with_state(PagerState::total)
    }

    /// The whole pagination record
    pub fn page_info(&self) -> PageInfo {
        self.with_state(PagerState::page_info)
    }

    // ------------------------------------------------------------------------
    // Reactions
    // ------------------------------------------------------------------------

    /// Apply `update` and run the reaction for whatever it changed.
    ///
    /// Returns `false` when `update` declined to change anything.
    async fn update_pagination<F>(&self, mode: FetchMode, update: F) -> bool
    where
        F: FnOnce(&mut PagerState<T>) -> bool,
    {
        if self.is_shut_down() {
            return false;
        }

        let mut applied = false;
        let mut change = PaginationChange::Unchanged;
        self.inner.state.send_if_modified(|s| {
            let before = s.page_info;
            if !update(s) {
                return false;
            }
            applied = true;
            change = s.observe_pagination(mode);
            s.page_info != before
        });

        match change {
            PaginationChange::Unchanged => {}
            PaginationChange::PageSize => {
                debug!("Page size changed, reloading from page 1");
                self.fetch(FetchMode::Replace).await;
            }
            PaginationChange::Page { mode, fetch: true } => self.fetch(mode).await,
            PaginationChange::Page { mode, fetch: false } => {
                debug!(%mode, "Page change needs no fetch: result set already covers it");
            }
        }
        applied
    }

    async fn fetch(&self, mode: FetchMode) {
        if self.is_shut_down() {
            return;
        }

        let mut params = None;
        self.inner.state.send_if_modified(|s| {
            if s.is_loading() {
                return false;
            }
            s.loading = Some(true);
            params = Some(s.page_info.params());
            true
        });
        let Some(params) = params else {
            debug!(%mode, "Fetch skipped: another fetch is in flight");
            return;
        };
        let _loading = LoadingGuard { inner: &self.inner };

        debug!(
            current = params.current,
            page_size = params.page_size,
            %mode,
            "Fetching page"
        );
        let result = AssertUnwindSafe(self.inner.source.fetch(params))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                Err(Error::data_source(panic_message(
                    "data source",
                    panic.as_ref(),
                )))
            });

        if self.is_shut_down() {
            debug!("Dropping fetch result: pager was shut down");
            return;
        }

        match result {
            Ok(outcome) if outcome.is_success() => {
                let FetchOutcome { data, total, .. } = outcome;
                let total = total.unwrap_or(0);
                self.inner.state.send_modify(|s| {
                    match mode {
                        FetchMode::Replace => s.data.clone_from(&data),
                        FetchMode::Append => s.data.extend_from_slice(&data),
                    }
                    s.page_info.apply_total(total);
                });
                debug!(records = data.len(), total, "Page loaded");
                if let Some(on_load) = &self.inner.on_load {
                    run_callback("on_load", || on_load(&data));
                }
            }
            Ok(_) => debug!("Data source reported failure, keeping current state"),
            Err(error) => {
                warn!(%error, "Data source request failed");
                if let Some(on_request_error) = &self.inner.on_request_error {
                    run_callback("on_request_error", move || on_request_error(error));
                }
            }
        }
    }
}

/// Settles `loading` when a fetch ends, however it ends: normal completion,
/// a dropped future, or a panic unwinding through it.
struct LoadingGuard<'a, T> {
    inner: &'a Inner<T>,
}

impl<T> Drop for LoadingGuard<'_, T> {
    fn drop(&mut self) {
        // nothing touches state after shutdown
        if self.inner.alive.is_cancelled() {
            return;
        }
        self.inner.state.send_modify(|s| s.loading = Some(false));
    }
}

/// Run a user callback, logging instead of propagating a panic
fn run_callback(name: &'static str, f: impl FnOnce()) {
    if let Err(panic) = std::panic::catch_unwind(AssertUnwindSafe(f)) {
        warn!(callback = name, "{}", panic_message(name, panic.as_ref()));
    }
}

impl<T> std::fmt::Debug for Pager<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Pager")
            .field("page_info", &state.page_info)
            .field("records", &state.data.len())
            .field("loading", &state.loading)
            .field("shut_down", &self.inner.alive.is_cancelled())
            .finish_non_exhaustive()
    }
}

fn panic_message(subject: &str, payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("{subject} panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("{subject} panicked: {message}")
    } else {
        format!("{subject} panicked")
    }
}
