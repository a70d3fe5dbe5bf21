//! Common types used throughout paged-fetch
//!
//! This module contains the values that cross the boundary between the
//! controller and its data source.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

// ============================================================================
// Request Types
// ============================================================================

/// Pagination parameters handed to a data source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    /// Page index, 1-based
    pub current: u32,
    /// Records per page
    pub page_size: u32,
}

impl PageParams {
    /// Create page parameters
    pub fn new(current: u32, page_size: u32) -> Self {
        Self { current, page_size }
    }

    /// Zero-based offset of the first record on this page
    pub fn offset(&self) -> u64 {
        u64::from(self.current.saturating_sub(1)) * u64::from(self.page_size)
    }
}

// ============================================================================
// Response Types
// ============================================================================

/// A page of records as reported by a data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchOutcome<T> {
    /// Records on the requested page
    pub data: Vec<T>,
    /// `Some(false)` marks an application-level failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    /// Total record count across all pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

impl<T> FetchOutcome<T> {
    /// Create a successful outcome without a total
    pub fn new(data: Vec<T>) -> Self {
        Self {
            data,
            success: None,
            total: None,
        }
    }

    /// Create an application-level failure
    pub fn failed(data: Vec<T>) -> Self {
        Self {
            data,
            success: Some(false),
            total: None,
        }
    }

    /// Set the reported total
    #[must_use]
    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    /// Set the success flag explicitly
    #[must_use]
    pub fn with_success(mut self, success: bool) -> Self {
        self.success = Some(success);
        self
    }

    /// Anything but an explicit `success: false` counts as success
    pub fn is_success(&self) -> bool {
        self.success != Some(false)
    }
}

// ============================================================================
// Fetch Mode
// ============================================================================

/// How a fetched page is merged into the result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    /// Overwrite the result set with the fetched page
    #[default]
    Replace,
    /// Concatenate the fetched page after the current result set
    Append,
}

impl std::fmt::Display for FetchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchMode::Replace => write!(f, "replace"),
            FetchMode::Append => write!(f, "append"),
        }
    }
}
