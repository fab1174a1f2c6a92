//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: HTTP requests → sync engine → message stream

use chrono::{NaiveDate, Utc};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tap_exchangerates::cli::{Cli, Commands, Runner};
use tap_exchangerates::http::{HttpClient, RetryPolicy};
use tap_exchangerates::output::{JsonLinesWriter, MemorySink, OutputFormat};
use tap_exchangerates::state::StateManager;
use tap_exchangerates::{format_day, Error, FixedClock, Message, SyncEngine, TapConfig};
use tempfile::tempdir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn body(date: &str, rates: Value) -> Value {
    json!({"success": true, "timestamp": 0, "base": "USD", "date": date, "rates": rates})
}

async fn mount_day(server: &MockServer, requested: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/{requested}")))
        .and(header("apikey", "test-key"))
        .respond_with(response)
        .mount(server)
        .await;
}

fn engine_for(server: &MockServer, today: &str) -> SyncEngine {
    let config = TapConfig::new("test-key").with_base_url(server.uri());
    let client = HttpClient::with_config(config.http_config(RetryPolicy::immediate(5))).unwrap();
    SyncEngine::new(client).with_clock(FixedClock(day(today)))
}

fn kinds(messages: &[Message]) -> Vec<&'static str> {
    messages
        .iter()
        .map(|m| match m {
            Message::Schema { .. } => "SCHEMA",
            Message::Record { .. } => "RECORD",
            Message::State { .. } => "STATE",
        })
        .collect()
}

// ============================================================================
// Engine over HTTP
// ============================================================================

#[tokio::test]
async fn test_three_consistent_days() {
    let server = MockServer::start().await;
    for d in ["2024-01-01", "2024-01-02", "2024-01-03"] {
        mount_day(
            &server,
            d,
            ResponseTemplate::new(200).set_body_json(body(d, json!({"EUR": 0.9}))),
        )
        .await;
    }

    let mut engine = engine_for(&server, "2024-01-03");
    let mut sink = MemorySink::new();
    let (state, result) = engine.run(day("2024-01-01"), &mut sink).await;

    assert_eq!(result.unwrap().records_emitted, 3);
    assert_eq!(format_day(state.start_date), "2024-01-04");
    assert_eq!(
        kinds(sink.messages()),
        vec!["SCHEMA", "RECORD", "RECORD", "RECORD", "STATE"]
    );

    match &sink.messages()[0] {
        Message::Schema {
            stream,
            schema,
            key_properties,
        } => {
            assert_eq!(stream, "exchange_rate");
            assert_eq!(key_properties, &vec!["date".to_string()]);
            assert_eq!(
                schema,
                &json!({
                    "type": "object",
                    "properties": {
                        "date": {"type": "string", "format": "date-time"},
                        "base": {"type": "string"},
                        "EUR": {"type": ["null", "number"]},
                        "USD": {"type": ["null", "number"]}
                    }
                })
            );
        }
        other => panic!("expected schema, got {other:?}"),
    }
}

#[tokio::test]
async fn test_holiday_returns_previous_day() {
    let server = MockServer::start().await;
    mount_day(
        &server,
        "2024-01-01",
        ResponseTemplate::new(200).set_body_json(body("2024-01-01", json!({"EUR": 0.9}))),
    )
    .await;
    mount_day(
        &server,
        "2024-01-02",
        ResponseTemplate::new(200).set_body_json(body("2024-01-01", json!({"EUR": 0.9}))),
    )
    .await;
    mount_day(
        &server,
        "2024-01-03",
        ResponseTemplate::new(200).set_body_json(body("2024-01-03", json!({"EUR": 0.92}))),
    )
    .await;

    let mut engine = engine_for(&server, "2024-01-03");
    let mut sink = MemorySink::new();
    let (state, result) = engine.run(day("2024-01-01"), &mut sink).await;

    let stats = result.unwrap();
    assert_eq!(stats.days_processed, 3);
    assert_eq!(stats.days_skipped, 1);
    assert_eq!(state.start_date, day("2024-01-04"));
    assert_eq!(kinds(sink.messages()), vec!["SCHEMA", "RECORD", "RECORD", "STATE"]);
}

#[tokio::test]
async fn test_persistent_503_ends_run_with_last_good_cursor() {
    let server = MockServer::start().await;
    mount_day(
        &server,
        "2024-01-01",
        ResponseTemplate::new(200).set_body_json(body("2024-01-01", json!({"EUR": 0.9}))),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/2024-01-02"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .expect(5)
        .mount(&server)
        .await;

    let mut engine = engine_for(&server, "2024-01-03");
    let mut sink = MemorySink::new();
    let (state, result) = engine.run(day("2024-01-01"), &mut sink).await;

    match result.unwrap_err() {
        Error::HttpStatus { status, body, url } => {
            assert_eq!(status, 503);
            assert_eq!(body, "down");
            assert!(url.ends_with("/2024-01-02"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(format_day(state.start_date), "2024-01-02");
    assert_eq!(
        sink.messages().last().unwrap().to_json(),
        json!({"type": "STATE", "value": {"start_date": "2024-01-02"}})
    );
}

#[tokio::test]
async fn test_404_fails_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("unknown date"))
        .expect(1)
        .mount(&server)
        .await;

    let mut engine = engine_for(&server, "2024-01-01");
    let mut sink = MemorySink::new();
    let (state, result) = engine.run(day("2024-01-01"), &mut sink).await;

    assert_eq!(result.unwrap_err().status(), Some(404));
    assert_eq!(state.start_date, day("2024-01-01"));
    assert_eq!(kinds(sink.messages()), vec!["STATE"]);
}

#[tokio::test]
async fn test_resume_from_saved_state() {
    let server = MockServer::start().await;
    for d in ["2024-01-03", "2024-01-04"] {
        mount_day(
            &server,
            d,
            ResponseTemplate::new(200).set_body_json(body(d, json!({"EUR": 0.9}))),
        )
        .await;
    }

    let state = StateManager::from_json(r#"{"start_date": "2024-01-03"}"#).unwrap();
    let config = TapConfig::new("test-key")
        .with_start_date("2023-01-01")
        .with_base_url(server.uri());
    let start = config
        .resolve_start_date(state.cursor(), day("2024-01-04"))
        .unwrap();

    let mut engine = engine_for(&server, "2024-01-04");
    let mut out = JsonLinesWriter::new(Vec::new(), OutputFormat::Json);
    let (final_state, result) = engine.run(start, &mut out).await;
    result.unwrap();

    let lines: Vec<Value> = String::from_utf8(out.into_inner())
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1]["record"]["date"], "2024-01-03T00:00:00Z");
    assert_eq!(lines[2]["record"]["date"], "2024-01-04T00:00:00Z");
    assert_eq!(lines[3], json!({"type": "STATE", "value": {"start_date": "2024-01-05"}}));
    assert_eq!(final_state.start_date, day("2024-01-05"));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

// ============================================================================
// CLI Runner
// ============================================================================

#[tokio::test]
async fn test_runner_writes_state_output() {
    let server = MockServer::start().await;
    let today = format_day(Utc::now().date_naive());
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body(&today, json!({"EUR": 0.9}))))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let state_path = dir.path().join("state.json");

    let cli = Cli {
        config: None,
        config_json: Some(
            json!({"access_key": "test-key", "start_date": today, "base_url": server.uri()})
                .to_string(),
        ),
        state: None,
        state_json: None,
        format: OutputFormat::Json,
        verbose: false,
        command: Some(Commands::Read {
            state_output: Some(state_path.clone()),
        }),
    };

    Runner::new(cli)
        .with_retry(RetryPolicy::immediate(1))
        .run()
        .await
        .unwrap();

    let saved = StateManager::from_file(&state_path).unwrap();
    assert!(saved.cursor().unwrap() > day(&today));
}

#[tokio::test]
async fn test_runner_requires_config() {
    let cli = Cli {
        config: None,
        config_json: None,
        state: None,
        state_json: None,
        format: OutputFormat::Json,
        verbose: false,
        command: None,
    };

    let err = Runner::new(cli).run().await.unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}

#[tokio::test]
async fn test_runner_check_reports_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
        .expect(1)
        .mount(&server)
        .await;

    let cli = Cli {
        config: None,
        config_json: Some(json!({"access_key": "bad", "base_url": server.uri()}).to_string()),
        state: None,
        state_json: None,
        format: OutputFormat::Json,
        verbose: false,
        command: Some(Commands::Check),
    };

    let err = Runner::new(cli).run().await.unwrap_err();
    assert_eq!(err.status(), Some(401));
}
