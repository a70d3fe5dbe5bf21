// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # paged-fetch
//!
//! A reusable paginated fetch controller: it tracks page index, page size,
//! total count and loaded data for any async data source, and re-fetches
//! when pagination parameters or the caller's effect list change.
//!
//! ## Features
//!
//! - **Replace or append**: classic page-by-page tables or infinite scroll
//! - **Shallow-merge updates**: change page, page size or total in one call
//! - **Observable state**: every change is published on a `tokio::sync::watch` channel
//! - **HTTP source**: query-parameter paging over any JSON endpoint, with retry and rate limiting
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use paged_fetch::{source_fn, FetchOutcome, PageParams, Pager, PagerOptions};
//!
//! #[tokio::main]
//! async fn main() -> paged_fetch::Result<()> {
//!     let source = source_fn(|params: PageParams| async move {
//!         let start = params.offset() as u32;
//!         let rows: Vec<u32> = (start..(start + params.page_size).min(95)).collect();
//!         Ok(FetchOutcome::new(rows).with_total(95))
//!     });
//!
//!     let pager = Pager::start(source, PagerOptions::new().with_default_page_size(10)).await?;
//!     while pager.has_more() {
//!         pager.fetch_more().await;
//!     }
//!     assert_eq!(pager.with_state(|s| s.data_source().len()), 95);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                         Pager<T>                         │
//! │  mount · reload · fetch_more · go_to_page · set_page_info │
//! │  reset · set_effects · subscribe → watch::Receiver        │
//! └──────────────────────────────────────────────────────────┘
//!                              │
//!                    DataSource<T>::fetch(PageParams)
//!                              │
//!          ┌───────────────────┴───────────────────┐
//!          │ source_fn(closure)  │  HttpSource     │
//!          │                     │  Retry, Backoff │
//!          │                     │  Rate Limit     │
//!          └─────────────────────┴─────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Pagination controller
pub mod pager;

/// Data sources
pub mod source;

/// Configuration files
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use pager::{PageInfo, PageInfoPatch, Pager, PagerConfig, PagerOptions, PagerState};
pub use source::{source_fn, DataSource, HttpSource};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
