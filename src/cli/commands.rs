//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Page through a JSON endpoint from the command line
#[derive(Parser, Debug)]
#[command(name = "paged-fetch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML, or JSON with a .json extension)
    #[arg(short = 'C', long, global = true, default_value = "paged-fetch.yaml")]
    pub config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load one page and print its records as JSON lines
    Fetch {
        /// Page to load (defaults to the config's default_current)
        #[arg(long)]
        page: Option<u32>,

        /// Page size (defaults to the config's default_page_size)
        #[arg(long)]
        page_size: Option<u32>,
    },

    /// Load pages until the source reports no more, printing each as it arrives
    Scroll {
        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<u32>,

        /// Page size (defaults to the config's default_page_size)
        #[arg(long)]
        page_size: Option<u32>,
    },

    /// Validate the config file
    Validate,
}
