use std::time::Duration;
use reposcribe::rate_limiter::BackoffPolicy;
use reposcribe::utils::RetryingFetcher;
use reposcribe::ScribeError;
use test_case::test_case;
use tokio_util::sync::CancellationToken;

mod common;
use common::test_helpers::*;

fn fast_fetcher() -> RetryingFetcher {
    RetryingFetcher::new(
        reqwest::Client::new(),
        BackoffPolicy::new(Duration::ZERO, Duration::from_millis(1), Duration::from_millis(5)),
    )
}

#[tokio::test]
async fn test_throttled_request_is_retried_until_budget_runs_out() {
    setup_test_logger();
    let mut server = setup_test_server().await;
    let mock = server
        .mock("GET", "/limited")
        .with_status(429)
        .with_header("retry-after", "0")
        .with_body("slow down")
        .expect(4)
        .create_async()
        .await;

    let response = fast_fetcher()
        .get(&format!("{}/limited", server.url()), 3, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 429);
    assert_eq!(response.text().await.unwrap(), "slow down");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_exhausted_quota_is_retried() {
    let mut server = setup_test_server().await;
    let mock = server
        .mock("GET", "/quota")
        .with_status(403)
        .with_header("x-ratelimit-remaining", "0")
        .expect(3)
        .create_async()
        .await;

    let response = fast_fetcher()
        .get(&format!("{}/quota", server.url()), 2, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 403);
    mock.assert_async().await;
}

#[test_case(200 ; "success")]
#[test_case(404 ; "not found")]
#[test_case(500 ; "server error")]
#[test_case(403 ; "forbidden without quota header")]
#[test_case(401 ; "unauthorized")]
#[tokio::test]
async fn test_other_statuses_are_returned_at_once(status: usize) {
    let mut server = setup_test_server().await;
    let mock = server
        .mock("GET", "/once")
        .with_status(status)
        .expect(1)
        .create_async()
        .await;

    let response = fast_fetcher()
        .get(&format!("{}/once", server.url()), 3, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(response.status().as_u16() as usize, status);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_zero_retries_means_single_attempt() {
    let mut server = setup_test_server().await;
    let mock = server
        .mock("GET", "/limited")
        .with_status(429)
        .expect(1)
        .create_async()
        .await;

    let response = fast_fetcher()
        .get(&format!("{}/limited", server.url()), 0, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 429);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_transport_errors_are_not_retried() {
    // Nothing listens on port 9 locally
    let result = fast_fetcher().get("http://127.0.0.1:9/unreachable", 3, &CancellationToken::new()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_cancellation_interrupts_backoff() {
    let mut server = setup_test_server().await;
    let mock = server
        .mock("GET", "/limited")
        .with_status(429)
        .with_header("retry-after", "60")
        .expect(1)
        .create_async()
        .await;

    let fetcher = RetryingFetcher::new(
        reqwest::Client::new(),
        BackoffPolicy::new(Duration::from_secs(60), Duration::from_secs(30), Duration::from_secs(300)),
    );
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let result = fetcher
        .get(&format!("{}/limited", server.url()), 3, &cancel)
        .await;

    assert!(matches!(result, Err(ScribeError::Cancelled)));
    assert!(started.elapsed() < Duration::from_secs(10));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_cancelled_token_sends_nothing() {
    let mut server = setup_test_server().await;
    let mock = server
        .mock("GET", "/never")
        .expect(0)
        .create_async()
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = fast_fetcher()
        .get(&format!("{}/never", server.url()), 3, &cancel)
        .await;

    assert!(matches!(result, Err(ScribeError::Cancelled)));
    mock.assert_async().await;
}
