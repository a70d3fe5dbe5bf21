//! Pull a `FetchOutcome` out of a JSON response body

use crate::error::{Error, Result};
use crate::types::FetchOutcome;
use serde_json::Value;

/// Where the parts of an outcome live in a response body
///
/// Paths are dotted (`result.items`), with an optional `$.` prefix.
/// An empty records path means the body itself is the array; an empty
/// total or success path means the body does not report it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomePaths {
    /// Path to the records array
    pub records: String,
    /// Path to the total count
    pub total: String,
    /// Path to the success flag
    pub success: String,
}

impl Default for OutcomePaths {
    fn default() -> Self {
        Self {
            records: "data".to_string(),
            total: "total".to_string(),
            success: "success".to_string(),
        }
    }
}

/// Follow a dotted path through nested objects
pub fn extract_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() || path == "$" {
        return Some(value);
    }

    path.split('.').try_fold(value, |current, part| match current {
        Value::Object(map) => map.get(part),
        Value::Array(items) => part.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Build an outcome from a decoded body
pub fn extract_outcome(body: &Value, paths: &OutcomePaths) -> Result<FetchOutcome<Value>> {
    let records = extract_path(body, &paths.records)
        .ok_or_else(|| Error::extraction(&paths.records, "path not found in response"))?;
    let data = records
        .as_array()
        .cloned()
        .ok_or_else(|| Error::extraction(&paths.records, "value is not an array"))?;

    let total = optional_path(body, &paths.total).and_then(as_u64);
    let success = optional_path(body, &paths.success).and_then(as_bool);

    Ok(FetchOutcome {
        data,
        success,
        total,
    })
}

fn optional_path<'a>(body: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        None
    } else {
        extract_path(body, path)
    }
}

fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
