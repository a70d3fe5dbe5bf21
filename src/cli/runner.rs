//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::AppConfig;
use crate::error::{Error, Result, ResultExt};
use crate::pager::{Pager, PagerOptions};
use crate::source::{HttpSource, RatePeriod};
use serde_json::Value;
use std::time::Instant;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Fetch { page, page_size } => self.fetch(*page, *page_size).await,
            Commands::Scroll {
                max_pages,
                page_size,
            } => self.scroll(*max_pages, *page_size).await,
            Commands::Validate => self.validate(),
        }
    }

    /// Load and validate the config file
    fn load_config(&self) -> Result<AppConfig> {
        let path = &self.cli.config;
        let config = AppConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Pager options from the config, with command-line overrides
    fn options(
        config: &AppConfig,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> PagerOptions<Value> {
        let mut options = PagerOptions::from_config(config.pager.clone());
        if let Some(page) = page {
            options = options.with_default_current(page);
        }
        if let Some(page_size) = page_size {
            options = options.with_default_page_size(page_size);
        }
        options
    }

    /// Build the HTTP source for `config`
    fn source(config: &AppConfig) -> Result<HttpSource> {
        let source = HttpSource::new(config.source.clone())?;
        debug!(
            url = %source.config().url,
            rate_limited = source.has_rate_limiter(),
            "HTTP source ready"
        );
        Ok(source)
    }

    /// Load one page
    async fn fetch(&self, page: Option<u32>, page_size: Option<u32>) -> Result<()> {
        let config = self.load_config()?;
        let source = Self::source(&config)?;
        let (tx, mut errors) = mpsc::unbounded_channel();

        let options = Self::options(&config, page, page_size).on_request_error(move |e| {
            let _ = tx.send(e);
        });
        let started = Instant::now();
        let pager = Pager::new(source, options)?;
        pager.mount().await;
        take_error(&mut errors)?;

        for record in pager.data_source() {
            println!("{record}");
        }

        let info = pager.page_info();
        info!(
            "Page {} of size {}: {} records, total {}, has_more {} ({:?})",
            info.page,
            info.page_size,
            pager.with_state(|s| s.data_source().len()),
            info.total,
            info.has_more,
            started.elapsed()
        );
        Ok(())
    }

    /// Load pages until the source runs out or `max_pages` is reached
    async fn scroll(&self, max_pages: Option<u32>, page_size: Option<u32>) -> Result<()> {
        let config = self.load_config()?;
        let source = Self::source(&config)?;
        let (tx, mut errors) = mpsc::unbounded_channel();

        let options = Self::options(&config, None, page_size)
            .on_load(|page: &[Value]| {
                for record in page {
                    println!("{record}");
                }
            })
            .on_request_error(move |e| {
                let _ = tx.send(e);
            });

        let started = Instant::now();
        let pager = Pager::new(source, options)?;
        pager.mount().await;
        take_error(&mut errors)?;

        let mut pages = 1u32;
        while pager.has_more() && !max_pages.is_some_and(|max| pages >= max) {
            let before = pager.with_state(|s| s.data_source().len());
            pager.fetch_more().await;
            take_error(&mut errors)?;

            let after = pager.with_state(|s| s.data_source().len());
            if after <= before {
                debug!("Page {} added no records, stopping", pager.current());
                break;
            }
            pages += 1;
        }

        eprintln!(
            "Loaded {} records over {} pages (total {}) in {:?}",
            pager.with_state(|s| s.data_source().len()),
            pages,
            pager.total(),
            started.elapsed()
        );
        Ok(())
    }

    /// Validate the config file
    fn validate(&self) -> Result<()> {
        let config = self.load_config()?;
        println!("Configuration is valid");
        println!("  URL: {}", config.source.url);
        println!(
            "  Params: {}={}, {}={}",
            config.source.page_param,
            config.pager.default_current,
            config.source.page_size_param,
            config.pager.default_page_size
        );
        if let Some(offset_param) = &config.source.offset_param {
            println!("  Offset param: {offset_param}");
        }
        println!("  Records path: {}", config.source.records_path);
        if let Some(limit) = &config.source.rate_limit {
            let per = match limit.per {
                RatePeriod::Second => "second",
                RatePeriod::Minute => "minute",
            };
            println!("  Rate limit: {} requests per {per}", limit.requests);
        }
        Ok(())
    }
}

/// First error reported by the pager since the last call, if any
fn take_error(errors: &mut UnboundedReceiver<Error>) -> Result<()> {
    match errors.try_recv() {
        Ok(e) => Err(e),
        Err(_) => Ok(()),
    }
}
