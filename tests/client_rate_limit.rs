//! Rate limit and decoding behaviour of the API client.
//!
//! Uses wiremock to stand in for the Space API.

use std::time::{Duration, Instant};

use reqwest::Method;
use space_snapshots::{RetryPolicy, SnapshotError, SpaceClient};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_retries_after_server_supplied_delay() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/horizons"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "2"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    let body = serde_json::json!([{"id": "h1", "name": "Todo"}]);
    Mock::given(method("GET"))
        .and(path("/horizons"))
        .and(query_param("per_page", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SpaceClient::new("test-token", &mock_server.uri()).unwrap();

    let started = Instant::now();
    let value = client
        .call("/horizons?per_page=1000", Method::GET, None)
        .await
        .unwrap();

    assert!(started.elapsed() >= Duration::from_millis(2000));
    assert_eq!(value, body);
}

#[tokio::test]
async fn test_missing_retry_after_waits_one_second() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/instances/i1/snapshots"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/instances/i1/snapshots"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": "s1"})))
        .mount(&mock_server)
        .await;

    let client = SpaceClient::new("test-token", &mock_server.uri()).unwrap();

    let started = Instant::now();
    let value = client
        .call("/instances/i1/snapshots", Method::POST, None)
        .await
        .unwrap();

    assert!(started.elapsed() >= Duration::from_millis(1000));
    assert_eq!(value["id"], "s1");
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_gives_up_when_retries_exhausted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/collections"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .expect(3) // first try plus two retries
        .mount(&mock_server)
        .await;

    let client = SpaceClient::new("test-token", &mock_server.uri())
        .unwrap()
        .with_retry_policy(RetryPolicy::bounded(2));

    let err = client
        .call("/collections", Method::GET, None)
        .await
        .unwrap_err();

    assert!(matches!(err, SnapshotError::RateLimited { attempts: 2 }));
}

#[tokio::test]
async fn test_error_status_returned_verbatim() {
    let mock_server = MockServer::start().await;

    let body = serde_json::json!({"errors": ["instance not found"]});
    Mock::given(method("GET"))
        .and(path("/instances/missing/snapshots"))
        .respond_with(ResponseTemplate::new(404).set_body_json(&body))
        .mount(&mock_server)
        .await;

    let client = SpaceClient::new("test-token", &mock_server.uri()).unwrap();
    let value = client
        .call("/instances/missing/snapshots", Method::GET, None)
        .await
        .unwrap();

    assert_eq!(value, body);
}

#[tokio::test]
async fn test_non_json_body_is_fetch_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/horizons"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&mock_server)
        .await;

    let client = SpaceClient::new("test-token", &mock_server.uri()).unwrap();
    let err = client.call("/horizons", Method::GET, None).await.unwrap_err();

    assert!(matches!(err, SnapshotError::FetchFailed(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_fetch_failure() {
    // Nothing listens on port 1
    let client = SpaceClient::new("test-token", "http://127.0.0.1:1").unwrap();
    let err = client.call("/horizons", Method::GET, None).await.unwrap_err();

    assert!(matches!(err, SnapshotError::FetchFailed(_)));
}

#[tokio::test]
async fn test_sends_token_content_type_and_payload() {
    let mock_server = MockServer::start().await;

    let payload = serde_json::json!({"note": "nightly"});
    Mock::given(method("POST"))
        .and(path("/horizons/h1/snapshots"))
        .and(header("authorization", "Bearer test-token"))
        .and(header("content-type", "application/json"))
        .and(body_json(&payload))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SpaceClient::new("test-token", &mock_server.uri()).unwrap();
    let value = client
        .call("/horizons/h1/snapshots", Method::POST, Some(&payload))
        .await
        .unwrap();

    assert_eq!(value["ok"], true);
}
