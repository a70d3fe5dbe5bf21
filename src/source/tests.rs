//! Tests for the data source module

use super::*;
use crate::config::HttpSourceConfig;
use crate::error::Error;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source_config(server: &MockServer) -> HttpSourceConfig {
    let mut config = HttpSourceConfig::new(format!("{}/api/users", server.uri()));
    config.initial_backoff_ms = 1;
    config.max_backoff_ms = 5;
    config
}

// ============================================================================
// Path Extraction Tests
// ============================================================================

#[test]
fn test_extract_path_nested() {
    let body = json!({"result": {"items": [1, 2], "meta": {"total": 9}}});
    assert_eq!(extract_path(&body, "result.items"), Some(&json!([1, 2])));
    assert_eq!(extract_path(&body, "$.result.meta.total"), Some(&json!(9)));
    assert_eq!(extract_path(&body, "result.items.1"), Some(&json!(2)));
    assert_eq!(extract_path(&body, "result.missing"), None);
    assert_eq!(extract_path(&body, ""), Some(&body));
}

#[test]
fn test_extract_outcome_defaults() {
    let body = json!({"data": [{"id": 1}], "total": 41, "success": true});
    let outcome = extract_outcome(&body, &OutcomePaths::default()).unwrap();
    assert_eq!(outcome.data, vec![json!({"id": 1})]);
    assert_eq!(outcome.total, Some(41));
    assert_eq!(outcome.success, Some(true));
}

#[test]
fn test_extract_outcome_string_values_and_missing_fields() {
    let body = json!({"data": [], "total": "12", "success": "false"});
    let outcome = extract_outcome(&body, &OutcomePaths::default()).unwrap();
    assert_eq!(outcome.total, Some(12));
    assert!(!outcome.is_success());

    let body = json!({"data": [1]});
    let outcome = extract_outcome(&body, &OutcomePaths::default()).unwrap();
    assert_eq!(outcome.total, None);
    assert_eq!(outcome.success, None);
}

#[test]
fn test_extract_outcome_bare_array_body() {
    let paths = OutcomePaths {
        records: String::new(),
        total: String::new(),
        success: String::new(),
    };
    let outcome = extract_outcome(&json!([1, 2, 3]), &paths).unwrap();
    assert_eq!(outcome.data.len(), 3);
    assert_eq!(outcome.total, None);
}

#[test]
fn test_extract_outcome_errors() {
    let err = extract_outcome(&json!({"items": []}), &OutcomePaths::default()).unwrap_err();
    assert!(matches!(err, Error::RecordExtraction { ref path, .. } if path == "data"));

    let err = extract_outcome(&json!({"data": {"id": 1}}), &OutcomePaths::default()).unwrap_err();
    assert!(err.to_string().contains("not an array"));
}

// ============================================================================
// Closure Source Tests
// ============================================================================

#[tokio::test]
async fn test_source_fn_passes_params_through() {
    let source = source_fn(|params: PageParams| async move {
        Ok(FetchOutcome::new(vec![params.current, params.page_size]).with_total(2))
    });

    let outcome = source.fetch(PageParams::new(3, 25)).await.unwrap();
    assert_eq!(outcome.data, vec![3, 25]);
    assert_eq!(outcome.total, Some(2));
}

// ============================================================================
// HTTP Source Tests
// ============================================================================

#[tokio::test]
async fn test_http_source_sends_page_params() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(query_param("current", "2"))
        .and(query_param("pageSize", "10"))
        .and(query_param("status", "active"))
        .and(header("X-Api-Key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 11}, {"id": 12}],
            "total": 12
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = source_config(&server);
    config
        .query
        .insert("status".to_string(), "active".to_string());
    config
        .headers
        .insert("X-Api-Key".to_string(), "secret".to_string());
    let source = HttpSource::new(config).unwrap();

    let outcome = source.fetch(PageParams::new(2, 10)).await.unwrap();
    assert_eq!(outcome.data, vec![json!({"id": 11}), json!({"id": 12})]);
    assert_eq!(outcome.total, Some(12));
    assert_eq!(outcome.success, None);
}

#[tokio::test]
async fn test_http_source_custom_param_names_and_paths() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {"items": [1, 2, 3], "count": 3, "ok": false}
        })))
        .mount(&server)
        .await;

    let mut config = source_config(&server);
    config.page_param = "page".to_string();
    config.page_size_param = "per_page".to_string();
    config.records_path = "result.items".to_string();
    config.total_path = "result.count".to_string();
    config.success_path = "result.ok".to_string();
    let source = HttpSource::new(config).unwrap();

    let outcome = source.fetch(PageParams::new(1, 5)).await.unwrap();
    assert_eq!(outcome.data.len(), 3);
    assert_eq!(outcome.total, Some(3));
    assert_eq!(outcome.success, Some(false));
}

#[tokio::test]
async fn test_http_source_client_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such list"))
        .expect(1)
        .mount(&server)
        .await;

    let source = HttpSource::new(source_config(&server)).unwrap();
    let err = source.fetch(PageParams::new(1, 20)).await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 404, ref body } if body == "no such list"));
}

#[tokio::test]
async fn test_http_source_retries_server_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [7]})))
        .expect(1)
        .mount(&server)
        .await;

    let source = HttpSource::new(source_config(&server)).unwrap();
    let outcome = source.fetch(PageParams::new(1, 20)).await.unwrap();
    assert_eq!(outcome.data, vec![json!(7)]);
}

#[tokio::test]
async fn test_http_source_gives_up_after_max_retries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .expect(2)
        .mount(&server)
        .await;

    let mut config = source_config(&server);
    config.max_retries = 1;
    let source = HttpSource::new(config).unwrap();

    let err = source.fetch(PageParams::new(1, 20)).await.unwrap_err();
    assert!(matches!(
        err,
        Error::RateLimited {
            retry_after_seconds: 0
        }
    ));
}

#[tokio::test]
async fn test_http_source_rejects_non_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let source = HttpSource::new(source_config(&server)).unwrap();
    let err = source.fetch(PageParams::new(1, 20)).await.unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}

#[test]
fn test_http_source_new_validates_config() {
    let err = HttpSource::new(HttpSourceConfig::new("not a url")).unwrap_err();
    assert!(matches!(err, Error::InvalidUrl(_)));

    let mut config = HttpSourceConfig::new("https://api.example.com/items");
    config.rate_limit = Some(RateLimitConfig::per_second(5));
    let source = HttpSource::new(config).unwrap();
    assert!(source.has_rate_limiter());
    assert_eq!(source.config().url, "https://api.example.com/items");
}

#[tokio::test]
async fn test_http_source_sends_offset_when_configured() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(query_param("current", "3"))
        .and(query_param("pageSize", "20"))
        .and(query_param("offset", "40"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [41]})))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = source_config(&server);
    config.offset_param = Some("offset".to_string());
    let source = HttpSource::new(config).unwrap();

    let outcome = source.fetch(PageParams::new(3, 20)).await.unwrap();
    assert_eq!(outcome.data, vec![json!(41)]);
}

#[tokio::test]
async fn test_http_source_waits_for_rate_limit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [], "total": 0})))
        .expect(2)
        .mount(&server)
        .await;

    let mut config = source_config(&server);
    config.rate_limit = Some(RateLimitConfig::per_second(2).with_burst(1));
    let source = HttpSource::new(config).unwrap();

    let started = Instant::now();
    source.fetch(PageParams::new(1, 20)).await.unwrap();
    source.fetch(PageParams::new(2, 20)).await.unwrap();
    // one token per 500ms after the first
    assert!(started.elapsed() >= Duration::from_millis(400));
}
