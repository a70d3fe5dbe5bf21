//! JSON-over-HTTP data source
//!
//! Sends the page parameters as query parameters and reads records, total
//! and success flag out of the JSON body. Retries and rate limiting are
//! transport concerns handled here; the pager sees one result per fetch.

use super::extract::{extract_outcome, OutcomePaths};
use super::rate_limit::RateLimiter;
use super::DataSource;
use crate::config::HttpSourceConfig;
use crate::error::{Error, Result};
use crate::types::{FetchOutcome, PageParams};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// `DataSource` that pages through a JSON endpoint
pub struct HttpSource {
    client: Client,
    config: HttpSourceConfig,
    paths: OutcomePaths,
    rate_limiter: Option<RateLimiter>,
}

impl HttpSource {
    /// Build a source from its config
    pub fn new(config: HttpSourceConfig) -> Result<Self> {
        config.validate()?;

        let user_agent = config
            .user_agent
            .clone()
            .unwrap_or_else(|| format!("paged-fetch/{}", env!("CARGO_PKG_VERSION")));
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            paths: config.outcome_paths(),
            rate_limiter: config.rate_limit.as_ref().map(RateLimiter::new),
            config,
        })
    }

    /// The config this source was built from
    pub fn config(&self) -> &HttpSourceConfig {
        &self.config
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Fetch and decode one page body, retrying transient failures
    async fn get_page(&self, params: PageParams) -> Result<Value> {
        let max_retries = self.config.max_retries;
        let mut last_error = None;

        for attempt in 0..=max_retries {
            if let Some(limiter) = &self.rate_limiter {
                limiter.acquire(params.current).await;
            }

            let error = match self.send(params).await {
                Ok(response) => {
                    let body = response.text().await?;
                    return serde_json::from_str(&body)
                        .map_err(|e| Error::decode(format!("response is not JSON: {e}")));
                }
                Err(error) => error,
            };

            if !error.is_retryable() || attempt == max_retries {
                return Err(error);
            }

            let delay = match &error {
                Error::RateLimited {
                    retry_after_seconds,
                } => Duration::from_secs(*retry_after_seconds),
                _ => self.config.backoff_delay(attempt),
            };
            warn!(
                "Request for page {} failed ({}), attempt {}/{}, retrying in {:?}",
                params.current,
                error,
                attempt + 1,
                max_retries + 1,
                delay
            );
            tokio::time::sleep(delay).await;
            last_error = Some(error);
        }

        Err(last_error.unwrap_or(Error::MaxRetriesExceeded { max_retries }))
    }

    async fn send(&self, params: PageParams) -> Result<Response> {
        let mut req = self.client.get(&self.config.url);

        for (key, value) in &self.config.headers {
            req = req.header(key.as_str(), value.as_str());
        }
        if !self.config.query.is_empty() {
            req = req.query(&self.config.query);
        }
        req = req.query(&[
            (self.config.page_param.as_str(), params.current.to_string()),
            (
                self.config.page_size_param.as_str(),
                params.page_size.to_string(),
            ),
        ]);
        if let Some(offset_param) = &self.config.offset_param {
            req = req.query(&[(offset_param.as_str(), params.offset().to_string())]);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    timeout_ms: self.config.timeout().as_millis() as u64,
                }
            } else {
                Error::Http(e)
            }
        })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited {
                retry_after_seconds: retry_after(&response),
            });
        }
        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), body));
        }

        debug!(
            "Request succeeded: GET {} page {}",
            self.config.url, params.current
        );
        Ok(response)
    }
}

#[async_trait]
impl DataSource<Value> for HttpSource {
    async fn fetch(&self, params: PageParams) -> Result<FetchOutcome<Value>> {
        let body = self.get_page(params).await?;
        extract_outcome(&body, &self.paths)
    }
}

impl std::fmt::Debug for HttpSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSource")
            .field("url", &self.config.url)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Seconds from the `retry-after` header, 1 when absent or unparseable
fn retry_after(response: &Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(1)
}
