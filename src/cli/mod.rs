//! CLI module
//!
//! Command-line interface for paging through an HTTP data source.
//!
//! # Commands
//!
//! - `fetch` - Load a single page
//! - `scroll` - Load page after page until the source runs out
//! - `validate` - Check a config file

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
