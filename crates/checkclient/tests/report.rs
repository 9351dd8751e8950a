//! HTTP-level tests for the Kuberhealthy client against a mock collector.

use std::time::Duration;

use checkclient::{ClientConfig, ClientError, KuberhealthyClient};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> KuberhealthyClient {
    KuberhealthyClient::new(ClientConfig {
        reporting_url: Some(server.uri()),
        debug: true,
        timeout_secs: 5,
    })
    .expect("client should build")
}

#[tokio::test]
async fn success_report_posts_ok_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_json(serde_json::json!({
            "OK": true,
            "Errors": [],
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.report_success().await.expect("report should succeed");
}

#[tokio::test]
async fn failure_report_carries_reasons_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_json(serde_json::json!({
            "OK": false,
            "Errors": ["Test has failed!", "second reason"],
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .report_failure(vec![
            "Test has failed!".to_string(),
            "second reason".to_string(),
        ])
        .await
        .expect("report should succeed");
}

#[tokio::test]
async fn collector_error_status_surfaces_as_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .report_success()
        .await
        .expect_err("5xx should be an error");
    assert!(matches!(
        err,
        ClientError::UnexpectedStatus(status) if status.as_u16() == 500
    ));
}

#[tokio::test]
async fn reachability_probe_accepts_any_http_response() {
    let server = MockServer::start().await;
    // 404 still proves the endpoint is up.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .wait_until_reachable(Duration::from_secs(5))
        .await
        .expect("a responding endpoint counts as reachable");
}

#[tokio::test]
async fn reachability_probe_times_out_when_nothing_listens() {
    let client = KuberhealthyClient::new(ClientConfig {
        // Reserved port; connections are refused immediately.
        reporting_url: Some("http://127.0.0.1:1".to_string()),
        debug: false,
        timeout_secs: 5,
    })
    .expect("client should build");

    let bound = Duration::from_millis(500);
    let err = client
        .wait_until_reachable(bound)
        .await
        .expect_err("nothing listens on port 1");
    assert!(matches!(err, ClientError::NotReachable(b) if b == bound));
}
