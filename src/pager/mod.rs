//! Pager module
//!
//! Paginated fetch controller with replace and append modes.
//!
//! # Overview
//!
//! A `Pager` owns the page info, the result set and the loading flag for one
//! data source. It fetches on `mount`, on `reload`, when the page or page
//! size changes and when the effect dependency list changes, with at most
//! one fetch in flight at a time:
//!
//! ```rust,ignore
//! use paged_fetch::pager::{Pager, PagerOptions};
//! use paged_fetch::source::source_fn;
//! use paged_fetch::FetchOutcome;
//!
//! let pager = Pager::start(
//!     source_fn(|params| async move { api.list(params).await }),
//!     PagerOptions::new().with_default_page_size(50),
//! )
//! .await?;
//!
//! while pager.has_more() {
//!     pager.fetch_more().await;
//! }
//! ```

mod controller;
mod options;
mod previous;
mod types;

pub use controller::Pager;
pub use options::{ErrorCallback, LoadCallback, PagerConfig, PagerOptions};
pub use previous::Previous;
pub use types::{PageInfo, PageInfoPatch, PagerState};
