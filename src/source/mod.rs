//! Data source module
//!
//! The pager only ever sees a `DataSource`: an opaque async function from
//! page parameters to a page of records.
//!
//! # Overview
//!
//! - `DataSource` - the trait the pager fetches through
//! - `source_fn` - adapt an async closure into a `DataSource`
//! - `HttpSource` - JSON-over-HTTP source with retries and rate limiting

mod extract;
mod http;
mod rate_limit;

pub use extract::{extract_outcome, extract_path, OutcomePaths};
pub use http::HttpSource;
pub use rate_limit::{RateLimitConfig, RateLimiter, RatePeriod};

use crate::error::Result;
use crate::types::{FetchOutcome, PageParams};
use async_trait::async_trait;
use std::future::Future;

/// An asynchronous source of paged records
#[async_trait]
pub trait DataSource<T>: Send + Sync {
    /// Fetch the page described by `params`
    async fn fetch(&self, params: PageParams) -> Result<FetchOutcome<T>>;
}

/// `DataSource` backed by an async closure
#[derive(Clone)]
pub struct FnSource<F> {
    f: F,
}

/// Wrap `f` so it can be handed to a pager
pub fn source_fn<F>(f: F) -> FnSource<F> {
    FnSource { f }
}

#[async_trait]
impl<T, F, Fut> DataSource<T> for FnSource<F>
where
    T: Send + 'static,
    F: Fn(PageParams) -> Fut + Send + Sync,
    Fut: Future<Output = Result<FetchOutcome<T>>> + Send + 'static,
{
    async fn fetch(&self, params: PageParams) -> Result<FetchOutcome<T>> {
        (self.f)(params).await
    }
}

impl<F> std::fmt::Debug for FnSource<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnSource").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
