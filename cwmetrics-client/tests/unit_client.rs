use chrono::{TimeZone, Utc};
use cwmetrics_client::{Client, ClientConfig, MetricsSink};
use cwmetrics_common::{CwMetricsError, MetricBatch, MetricDatum, StandardUnit, BATCH_LIMIT};
use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;

// Helper: build a ClientConfig aimed at the given mockito server URL (strips the http:// prefix).
fn backend_config(server_url: &str) -> ClientConfig {
    ClientConfig { endpoint: server_url.trim_start_matches("http://").to_string() }
}

fn latency_batch(points: usize) -> MetricBatch {
    MetricBatch {
        namespace: "load-tests".to_string(),
        data: (0..points)
            .map(|i| MetricDatum {
                name: "ResultLatency".to_string(),
                dimensions: vec![],
                timestamp: Utc.timestamp_millis_opt(i as i64).single(),
                value: 1.5,
                unit: StandardUnit::Milliseconds,
            })
            .collect(),
    }
}

#[test]
fn test_client_creation_with_config() {
    let client = Client::new(ClientConfig { endpoint: "monitoring.local:4566".to_string() });
    assert_eq!(client.config.endpoint, "monitoring.local:4566");
}

#[test]
fn test_build_metrics_url() {
    let client = Client::new(ClientConfig { endpoint: "127.0.0.1:8080".to_string() });
    assert_eq!(client.build_metrics_url(), "http://127.0.0.1:8080/metrics");
}

#[tokio::test]
async fn test_submit_posts_batch_as_json() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/metrics")
        .match_header("content-type", "application/json")
        .match_header("idempotency-key", Matcher::Any)
        .match_body(Matcher::Json(json!({
            "Namespace": "load-tests",
            "MetricData": [{
                "MetricName": "ResultLatency",
                "Dimensions": [],
                "Timestamp": "1970-01-01T00:00:00.000Z",
                "Value": 1.5,
                "Unit": "Milliseconds"
            }]
        })))
        .with_status(200)
        .create_async()
        .await;

    let client = Client::new(backend_config(&server.url()));
    client.submit_metrics(&latency_batch(1)).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_submit_accepts_full_batch() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", "/metrics").with_status(200).create_async().await;

    let client = Client::new(backend_config(&server.url()));
    assert!(client.submit_metrics(&latency_batch(BATCH_LIMIT)).await.is_ok());

    mock.assert_async().await;
}

#[tokio::test]
async fn test_submit_rejects_oversized_batch_without_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", "/metrics").expect(0).create_async().await;

    let client = Client::new(backend_config(&server.url()));
    let result = client.submit_metrics(&latency_batch(BATCH_LIMIT + 1)).await;

    assert_eq!(result, Err(CwMetricsError::BatchTooLarge(BATCH_LIMIT)));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_submit_returns_http_error_with_server_message() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/metrics")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":"The value ResultLatency for parameter MetricData is invalid"}"#)
        .create_async()
        .await;

    let client = Client::new(backend_config(&server.url()));
    let result = client.submit_metrics(&latency_batch(1)).await;

    assert_eq!(
        result,
        Err(CwMetricsError::HttpError(
            400,
            "The value ResultLatency for parameter MetricData is invalid".to_string()
        ))
    );
}

#[tokio::test]
async fn test_submit_returns_http_error_fallback_message() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/metrics")
        .with_status(503)
        .with_body("unavailable")
        .create_async()
        .await;

    let client = Client::new(backend_config(&server.url()));
    let result = client.submit_metrics(&latency_batch(1)).await;

    assert!(matches!(result, Err(CwMetricsError::HttpError(503, msg)) if msg.starts_with("Server returned status: 503")));
}

#[tokio::test]
async fn test_submit_returns_network_error_when_unreachable() {
    // Port 1 on localhost is not listening.
    let client = Client::new(ClientConfig { endpoint: "127.0.0.1:1".to_string() });
    let result = client.submit_metrics(&latency_batch(1)).await;

    assert!(matches!(result, Err(CwMetricsError::NetworkError(_))));
}

#[tokio::test]
async fn test_client_usable_as_shared_sink() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", "/metrics").with_status(200).expect(2).create_async().await;

    let sink: Arc<dyn MetricsSink> = Arc::new(Client::new(backend_config(&server.url())));
    sink.submit_metrics(&latency_batch(2)).await.unwrap();
    sink.submit_metrics(&MetricBatch::new("load-tests")).await.unwrap();

    mock.assert_async().await;
}
