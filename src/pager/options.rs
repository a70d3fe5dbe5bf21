//! Pager construction options

use crate::error::{Error, Result};
use crate::types::JsonValue;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Called with the raw records of every successfully loaded page
pub type LoadCallback<T> = Arc<dyn Fn(&[T]) + Send + Sync>;

/// Called with every error a data source returns
pub type ErrorCallback = Arc<dyn Fn(Error) + Send + Sync>;

/// Serializable part of the pager options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagerConfig {
    /// First page, restored by `reset`
    #[serde(default = "default_current")]
    pub default_current: u32,

    /// Page size, restored by `reset`
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Effect dependency list; any change triggers a refetch
    #[serde(default)]
    pub effects: Vec<JsonValue>,
}

fn default_current() -> u32 {
    1
}

fn default_page_size() -> u32 {
    20
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            default_current: default_current(),
            default_page_size: default_page_size(),
            effects: Vec::new(),
        }
    }
}

impl PagerConfig {
    /// Check that both defaults are at least 1
    pub fn validate(&self) -> Result<()> {
        if self.default_current == 0 {
            return Err(Error::InvalidPageInfo { field: "page" });
        }
        if self.default_page_size == 0 {
            return Err(Error::InvalidPageInfo { field: "page_size" });
        }
        Ok(())
    }
}

/// Everything a `Pager` is constructed from besides its data source
pub struct PagerOptions<T> {
    /// Defaults and effect list
    pub config: PagerConfig,
    /// Initial result set
    pub default_data: Vec<T>,
    pub(crate) on_load: Option<LoadCallback<T>>,
    pub(crate) on_request_error: Option<ErrorCallback>,
}

impl<T> Default for PagerOptions<T> {
    fn default() -> Self {
        Self {
            config: PagerConfig::default(),
            default_data: Vec::new(),
            on_load: None,
            on_request_error: None,
        }
    }
}

impl<T> PagerOptions<T> {
    /// Create options with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create options from a loaded config
    pub fn from_config(config: PagerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Set the first page
    #[must_use]
    pub fn with_default_current(mut self, current: u32) -> Self {
        self.config.default_current = current;
        self
    }

    /// Set the page size
    #[must_use]
    pub fn with_default_page_size(mut self, page_size: u32) -> Self {
        self.config.default_page_size = page_size;
        self
    }

    /// Set the effect dependency list
    #[must_use]
    pub fn with_effects(mut self, effects: Vec<JsonValue>) -> Self {
        self.config.effects = effects;
        self
    }

    /// Set the initial result set
    #[must_use]
    pub fn with_default_data(mut self, data: Vec<T>) -> Self {
        self.default_data = data;
        self
    }

    /// Set the load callback
    #[must_use]
    pub fn on_load<F>(mut self, f: F) -> Self
    where
        F: Fn(&[T]) + Send + Sync + 'static,
    {
        self.on_load = Some(Arc::new(f));
        self
    }

    /// Set the request error callback
    #[must_use]
    pub fn on_request_error<F>(mut self, f: F) -> Self
    where
        F: Fn(Error) + Send + Sync + 'static,
    {
        self.on_request_error = Some(Arc::new(f));
        self
    }
}

impl<T> std::fmt::Debug for PagerOptions<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagerOptions")
            .field("config", &self.config)
            .field("default_data_len", &self.default_data.len())
            .field("has_on_load", &self.on_load.is_some())
            .field("has_on_request_error", &self.on_request_error.is_some())
            .finish()
    }
}
