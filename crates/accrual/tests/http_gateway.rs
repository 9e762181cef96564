//! HTTP gateway classification against a mock accrual authority.

use std::time::Duration;

use httpmock::Method::GET;
use httpmock::MockServer;
use loyalty_accrual::{HttpAccrualGateway, HttpAccrualGatewayConfig};
use loyalty_core::accrual::{AccrualGateway, AccrualOutcome, AccrualReport, UpstreamStatus};
use loyalty_core::order::OrderNumber;
use rstest::rstest;
use rust_decimal_macros::dec;
use serde_json::json;

const NUMBER: &str = "12345678903";

fn gateway(server: &MockServer) -> HttpAccrualGateway {
    HttpAccrualGateway::new(HttpAccrualGatewayConfig {
        base_url: server.base_url(),
        timeout: Duration::from_millis(500),
        default_retry_after: Duration::from_secs(60),
    })
    .unwrap()
}

fn number() -> OrderNumber {
    OrderNumber::parse(NUMBER).unwrap()
}

#[tokio::test]
async fn test_processed_order_is_found() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/orders/12345678903");
            then.status(200)
                .json_body(json!({"order": NUMBER, "status": "PROCESSED", "accrual": 500}));
        })
        .await;

    let outcome = gateway(&server).fetch(&number()).await;

    mock.assert_async().await;
    assert_eq!(
        outcome,
        AccrualOutcome::Found(AccrualReport {
            status: UpstreamStatus::Processed,
            accrual: Some(dec!(500)),
        })
    );
}

#[rstest]
#[case("REGISTERED", UpstreamStatus::Registered)]
#[case("PROCESSING", UpstreamStatus::Processing)]
#[case("INVALID", UpstreamStatus::Invalid)]
#[tokio::test]
async fn test_statuses_without_accrual(#[case] wire: &str, #[case] expected: UpstreamStatus) {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/orders/12345678903");
            then.status(200).json_body(json!({"order": NUMBER, "status": wire}));
        })
        .await;

    let outcome = gateway(&server).fetch(&number()).await;

    assert_eq!(
        outcome,
        AccrualOutcome::Found(AccrualReport {
            status: expected,
            accrual: None,
        })
    );
}

#[tokio::test]
async fn test_no_content_is_not_found() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/orders/12345678903");
            then.status(204);
        })
        .await;

    assert_eq!(gateway(&server).fetch(&number()).await, AccrualOutcome::NotFound);
}

#[tokio::test]
async fn test_too_many_requests_uses_retry_after() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/orders/12345678903");
            then.status(429)
                .header("Retry-After", "120")
                .body("No more than 5 requests per minute allowed");
        })
        .await;

    assert_eq!(
        gateway(&server).fetch(&number()).await,
        AccrualOutcome::RateLimited {
            retry_after: Duration::from_secs(120)
        }
    );
}

#[tokio::test]
async fn test_too_many_requests_without_header_uses_default() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/orders/12345678903");
            then.status(429).header("Retry-After", "soon");
        })
        .await;

    assert_eq!(
        gateway(&server).fetch(&number()).await,
        AccrualOutcome::RateLimited {
            retry_after: Duration::from_secs(60)
        }
    );
}

#[rstest]
#[case(500)]
#[case(503)]
#[case(404)]
#[tokio::test]
async fn test_unexpected_status_is_transient(#[case] status: u16) {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/orders/12345678903");
            then.status(status);
        })
        .await;

    let outcome = gateway(&server).fetch(&number()).await;

    assert!(
        matches!(outcome, AccrualOutcome::TransientFailure { ref reason } if reason.contains(&status.to_string())),
        "{outcome:?}"
    );
}

#[tokio::test]
async fn test_garbage_body_is_transient() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/orders/12345678903");
            then.status(200).body("not json");
        })
        .await;

    assert!(matches!(
        gateway(&server).fetch(&number()).await,
        AccrualOutcome::TransientFailure { .. }
    ));
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/orders/12345678903");
            then.status(204).delay(Duration::from_secs(2));
        })
        .await;

    assert!(matches!(
        gateway(&server).fetch(&number()).await,
        AccrualOutcome::TransientFailure { .. }
    ));
}

#[tokio::test]
async fn test_unreachable_upstream_is_transient() {
    let gateway = HttpAccrualGateway::new(HttpAccrualGatewayConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        timeout: Duration::from_millis(500),
        default_retry_after: Duration::from_secs(60),
    })
    .unwrap();

    assert!(matches!(
        gateway.fetch(&number()).await,
        AccrualOutcome::TransientFailure { .. }
    ));
}
