//! Tests for the HTTP client module

use super::*;
use crate::error::Error;
use chrono::NaiveDate;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn client_for(server: &MockServer, max_attempts: u32) -> HttpClient {
    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .access_key("secret123")
        .retry(RetryPolicy::immediate(max_attempts))
        .build();
    HttpClient::with_config(config).unwrap()
}

fn rates_body(date: &str) -> serde_json::Value {
    json!({
        "success": true,
        "base": "USD",
        "date": date,
        "rates": {"EUR": 0.9}
    })
}

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.retry, RetryPolicy::default());
    assert!(config.user_agent.starts_with("tap-exchangerates/"));
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .base_url("https://api.example.com/v1")
        .access_key("k")
        .timeout(Duration::from_secs(5))
        .retry(RetryPolicy::immediate(2))
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(config.base_url, "https://api.example.com/v1");
    assert_eq!(config.access_key, "k");
    assert_eq!(config.timeout, Duration::from_secs(5));
    assert_eq!(config.retry.max_attempts, 2);
    assert_eq!(config.user_agent, "test-agent/1.0");
}

#[test]
fn test_day_url() {
    let client = HttpClient::with_config(HttpClientConfig::default()).unwrap();
    assert_eq!(
        client.day_url(day("2024-01-02")).unwrap().as_str(),
        "http://api.apilayer.com/exchangerates_data/2024-01-02"
    );

    // Missing trailing slash keeps the last path segment
    let config = HttpClientConfig::builder()
        .base_url("https://api.example.com/v1")
        .build();
    let client = HttpClient::with_config(config).unwrap();
    assert_eq!(
        client.day_url(day("2024-01-02")).unwrap().as_str(),
        "https://api.example.com/v1/2024-01-02"
    );
}

#[test]
fn test_invalid_base_url() {
    let config = HttpClientConfig::builder().base_url("not a url").build();
    let err = HttpClient::with_config(config).unwrap_err();
    assert!(matches!(err, Error::InvalidUrl(_)));
}

#[tokio::test]
async fn test_fetch_sends_apikey_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/2024-01-01"))
        .and(header("apikey", "secret123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rates_body("2024-01-01")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 5);
    let payload = client.fetch(day("2024-01-01")).await.unwrap();

    assert_eq!(payload.base, "USD");
    assert_eq!(payload.date, "2024-01-01");
    assert_eq!(payload.rates.get("EUR"), Some(&Some(0.9)));
}

#[tokio::test]
async fn test_fetch_retries_503_until_budget_exhausted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/2024-01-02"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(5)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 5);
    let err = client.fetch(day("2024-01-02")).await.unwrap_err();

    match err {
        Error::HttpStatus { status, body, url } => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
            assert!(url.ends_with("/2024-01-02"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_fetch_retries_429_until_budget_exhausted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .expect(5)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 5);
    let err = client.fetch(day("2024-01-02")).await.unwrap_err();
    assert_eq!(err.status(), Some(429));
}

#[tokio::test]
async fn test_fetch_gives_up_on_404_immediately() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such day"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 5);
    let err = client.fetch(day("2024-01-02")).await.unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert!(!err.is_retryable());
    assert!(err.to_string().contains("no such day"));
}

#[tokio::test]
async fn test_fetch_recovers_after_transient_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rates_body("2024-01-03")))
        .with_priority(2)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 5);
    let payload = client.fetch(day("2024-01-03")).await.unwrap();
    assert_eq!(payload.date, "2024-01-03");

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_fetch_malformed_payload_is_fatal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": false, "error": "x"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 5);
    let err = client.fetch(day("2024-01-01")).await.unwrap_err();
    assert!(matches!(err, Error::MalformedPayload { .. }));
    assert!(err.to_string().contains("\"error\":\"x\""));
}

#[tokio::test]
async fn test_fetch_connection_error_is_retried() {
    // Bind then drop a listener so the port refuses connections
    let uri = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };

    let config = HttpClientConfig::builder()
        .base_url(uri)
        .retry(RetryPolicy::immediate(2))
        .timeout(Duration::from_secs(2))
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let err = client.fetch(day("2024-01-01")).await.unwrap_err();
    assert!(matches!(err, Error::Http(_)));
    assert!(err.is_retryable());
}
