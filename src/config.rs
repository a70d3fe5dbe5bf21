//! Configuration files
//!
//! A config file describes one HTTP data source and the pager defaults used
//! with it. YAML is the default format; files ending in `.json` are read as
//! JSON.
//!
//! ```yaml
//! source:
//!   url: https://api.example.com/users
//!   records_path: result.items
//!   total_path: result.total
//!   rate_limit:
//!     requests: 5
//! pager:
//!   default_page_size: 50
//! ```

use crate::error::{Error, Result};
use crate::pager::PagerConfig;
use crate::source::{OutcomePaths, RateLimitConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete configuration loaded from a file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP data source
    pub source: HttpSourceConfig,

    /// Pager defaults
    #[serde(default)]
    pub pager: PagerConfig,
}

impl AppConfig {
    /// Load a config file, choosing the format by extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        }
    }

    /// Parse a YAML config
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse a JSON config
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check the source and pager sections
    pub fn validate(&self) -> Result<()> {
        self.source.validate()?;
        self.pager.validate()
    }
}

// ============================================================================
// HTTP Source Config
// ============================================================================

/// Backoff strategy between transport retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Same delay every attempt
    Constant,
    /// Delay grows linearly
    Linear,
    /// Delay doubles every attempt
    #[default]
    Exponential,
}

/// How to reach a JSON endpoint and read pages out of it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSourceConfig {
    /// Endpoint URL
    pub url: String,

    /// Query parameter carrying the page index
    #[serde(default = "default_page_param")]
    pub page_param: String,

    /// Query parameter carrying the page size
    #[serde(default = "default_page_size_param")]
    pub page_size_param: String,

    /// Query parameter for the zero-based record offset, for endpoints
    /// paged by offset instead of page index
    #[serde(default)]
    pub offset_param: Option<String>,

    /// Path to the records array (empty = body is the array)
    #[serde(default = "default_records_path")]
    pub records_path: String,

    /// Path to the total count (empty = not reported)
    #[serde(default = "default_total_path")]
    pub total_path: String,

    /// Path to the success flag (empty = not reported)
    #[serde(default = "default_success_path")]
    pub success_path: String,

    /// Extra query parameters sent with every request
    #[serde(default)]
    pub query: HashMap<String, String>,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Transport retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff strategy
    #[serde(default)]
    pub backoff: BackoffType,

    /// First backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Backoff ceiling in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Optional token bucket limit
    #[serde(default)]
    pub rate_limit: Option<RateLimitConfig>,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_page_param() -> String {
    "current".to_string()
}

fn default_page_size_param() -> String {
    "pageSize".to_string()
}

fn default_records_path() -> String {
    "data".to_string()
}

fn default_total_path() -> String {
    "total".to_string()
}

fn default_success_path() -> String {
    "success".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    100
}

fn default_max_backoff_ms() -> u64 {
    60_000
}

impl HttpSourceConfig {
    /// Config for `url` with every other field defaulted
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            page_param: default_page_param(),
            page_size_param: default_page_size_param(),
            offset_param: None,
            records_path: default_records_path(),
            total_path: default_total_path(),
            success_path: default_success_path(),
            query: HashMap::new(),
            headers: HashMap::new(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            backoff: BackoffType::default(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            rate_limit: None,
            user_agent: None,
        }
    }

    /// Check the URL and parameter names
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(Error::missing_field("source.url"));
        }
        url::Url::parse(&self.url)?;
        if self.page_param.is_empty() {
            return Err(Error::invalid_value(
                "source.page_param",
                "must not be empty",
            ));
        }
        if self.page_size_param.is_empty() {
            return Err(Error::invalid_value(
                "source.page_size_param",
                "must not be empty",
            ));
        }
        if self.page_param == self.page_size_param {
            return Err(Error::invalid_value(
                "source.page_size_param",
                "must differ from page_param",
            ));
        }
        if let Some(offset) = &self.offset_param {
            if offset.is_empty() || *offset == self.page_param || *offset == self.page_size_param
            {
                return Err(Error::invalid_value(
                    "source.offset_param",
                    "must be non-empty and differ from the page params",
                ));
            }
        }
        Ok(())
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Where to find records, total and success in responses
    pub fn outcome_paths(&self) -> OutcomePaths {
        OutcomePaths {
            records: self.records_path.clone(),
            total: self.total_path.clone(),
            success: self.success_path.clone(),
        }
    }

    /// Delay before retry number `attempt` (0-based)
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let initial = Duration::from_millis(self.initial_backoff_ms);
        let delay = match self.backoff {
            BackoffType::Constant => initial,
            BackoffType::Linear => initial.saturating_mul(attempt.saturating_add(1)),
            BackoffType::Exponential => initial.saturating_mul(2u32.saturating_pow(attempt)),
        };
        delay.min(Duration::from_millis(self.max_backoff_ms))
    }
}
