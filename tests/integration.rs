//! Integration tests for pulse-gateway using wiremock.
//!
//! These tests mock the remote API and exercise the complete flow: exchange,
//! classification, broadcast channels, and SSE streaming.

use futures::StreamExt;
use serde::Deserialize;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pulse_gateway::{Error, LogEntry, PulseClient, StatusEvent};

/// Helper to create a client pointed at the mock server.
fn test_client(mock_uri: &str) -> PulseClient {
    PulseClient::builder()
        .base_url(mock_uri)
        .bearer_token("test-token")
        .build()
        .expect("client builds")
}

/// Build an SSE body in the upstream service's framing: one `event` line and
/// one `data` line per event, no blank-line separators.
fn sse_body(events: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (event, data) in events {
        body.push_str("event: ");
        body.push_str(event);
        body.push('\n');
        body.push_str("data: ");
        body.push_str(data);
        body.push('\n');
    }
    body
}

#[derive(Debug, Deserialize, PartialEq)]
struct Progress {
    p: f64,
}

// ============================================================================
// Plain exchanges
// ============================================================================

#[tokio::test]
async fn test_success_exchange_returns_body_and_logs() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/jobs"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let mut logs = client.logs();

    let body = client.send(client.get("/v1/jobs").unwrap()).await.unwrap();
    assert_eq!(body.as_ref(), br#"{"ok":true}"#);

    match logs.recv().await {
        Some(LogEntry::Success { status, .. }) => assert_eq!(status, 200),
        other => panic!("Expected Success log entry, got {:?}", other),
    }
}

#[tokio::test]
async fn test_401_reports_on_both_channels() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("denied"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let mut logs = client.logs();
    let mut events = client.status_events();

    let err = client
        .send(client.get("/v1/jobs").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized));

    match logs.recv().await {
        Some(LogEntry::HttpError { status, .. }) => assert_eq!(status, 401),
        other => panic!("Expected HttpError log entry, got {:?}", other),
    }
    assert!(matches!(
        events.recv().await,
        Some(StatusEvent::Unauthorized { .. })
    ));
}

#[tokio::test]
async fn test_429_carries_retry_after_over_the_wire() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "120")
                .set_body_string("slow down"),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let mut events = client.status_events();

    let err = client
        .send(client.get("/v1/jobs").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(429));

    match events.recv().await {
        Some(StatusEvent::RateLimited {
            retry_after_secs, ..
        }) => assert_eq!(retry_after_secs, Some(120.0)),
        other => panic!("Expected RateLimited event, got {:?}", other),
    }
}

#[tokio::test]
async fn test_send_as_decode_failure_is_broadcast() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let mut logs = client.logs();

    let result = client
        .send_as::<Progress>(client.get("/v1/jobs").unwrap())
        .await;
    assert!(matches!(result, Err(Error::Decoding(_))));

    // First the Success entry for the exchange itself, then the decode entry.
    assert!(matches!(logs.recv().await, Some(LogEntry::Success { .. })));
    match logs.recv().await {
        Some(LogEntry::DecodingError { target_type, .. }) => {
            assert!(target_type.contains("Progress"));
        }
        other => panic!("Expected DecodingError log entry, got {:?}", other),
    }
}

// ============================================================================
// SSE streaming
// ============================================================================

#[tokio::test]
async fn test_stream_decodes_typed_events() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/progress"))
        .and(header("accept", "text/event-stream"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                sse_body(&[("progress", r#"{"p":0.1}"#), ("progress", r#"{"p":0.5}"#)]),
                "text/event-stream",
            ),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let stream = client
        .stream_events::<Progress>(client.get("/v1/progress").unwrap())
        .await
        .unwrap();

    let events: Vec<Progress> = stream.map(|event| event.unwrap()).collect().await;
    assert_eq!(events, vec![Progress { p: 0.1 }, Progress { p: 0.5 }]);
}

#[tokio::test]
async fn test_stream_skips_undecodable_frame() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                sse_body(&[("progress", "not json"), ("progress", r#"{"p":0.9}"#)]),
                "text/event-stream",
            ),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let mut logs = client.logs();

    let stream = client
        .stream_events::<Progress>(client.get("/v1/progress").unwrap())
        .await
        .unwrap();
    let events: Vec<Progress> = stream.map(|event| event.unwrap()).collect().await;

    // The bad frame is skipped, not fatal.
    assert_eq!(events, vec![Progress { p: 0.9 }]);
    match logs.recv().await {
        Some(LogEntry::DecodingError { body, .. }) => {
            assert_eq!(body.as_ref(), b"not json");
        }
        other => panic!("Expected DecodingError log entry, got {:?}", other),
    }
}

#[tokio::test]
async fn test_stream_connect_rejection_is_classified() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let mut events = client.status_events();

    let err = client
        .stream_events::<Progress>(client.get("/v1/progress").unwrap())
        .await
        .err()
        .unwrap();
    assert_eq!(err.status(), Some(503));

    assert!(matches!(
        events.recv().await,
        Some(StatusEvent::ServiceUnavailable { .. })
    ));
}

#[tokio::test]
async fn test_stream_rejects_non_sse_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string("<html></html>"),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .stream_events::<Progress>(client.get("/v1/progress").unwrap())
        .await
        .err()
        .unwrap();
    assert!(matches!(err, Error::InvalidResponse(_)));
}

// ============================================================================
// Broadcast timing over real exchanges
// ============================================================================

#[tokio::test]
async fn test_late_subscriber_misses_earlier_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"n": 1})))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let mut early = client.logs();

    client.send(client.get("/v1/jobs").unwrap()).await.unwrap();

    let mut late = client.logs();
    client.send(client.get("/v1/jobs").unwrap()).await.unwrap();

    // The early subscriber saw both exchanges, the late one only the second.
    assert!(early.recv().await.is_some());
    assert!(early.recv().await.is_some());
    assert!(late.recv().await.is_some());
    assert!(matches!(
        tokio::time::timeout(std::time::Duration::from_millis(50), late.recv()).await,
        Err(_)
    ));
}
