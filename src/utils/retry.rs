use log::{debug, warn};
use reqwest::{Client, Request, Response};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use crate::error::{Result, ScribeError};
use crate::rate_limiter::{retry_after, BackoffPolicy, Throttle};

/// Issues GET requests and retries them while the upstream API throttles us
///
/// Only throttling signals are retried. Any other status, successful or not,
/// is handed back untouched so the caller can interpret it.
#[derive(Debug, Clone)]
pub struct RetryingFetcher {
    client: Client,
    backoff: BackoffPolicy,
}

impl RetryingFetcher {
    /// Wraps a shared client with a backoff policy
    pub fn new(client: Client, backoff: BackoffPolicy) -> Self {
        Self { client, backoff }
    }

    /// Builds and sends a GET for `url`, retrying up to `max_retries` times
    pub async fn get(&self, url: &str, max_retries: u32, cancel: &CancellationToken) -> Result<Response> {
        let request = self.client.get(url).build()?;
        self.send(request, max_retries, cancel).await
    }

    /// Sends `request`, retrying up to `max_retries` times on throttling
    ///
    /// When the budget runs out while still throttled, the last throttled
    /// response is returned as `Ok`. Transport errors are never retried.
    /// Fails with [`ScribeError::Cancelled`] as soon as `cancel` fires,
    /// including in the middle of a backoff wait.
    pub async fn send(&self, mut request: Request, max_retries: u32, cancel: &CancellationToken) -> Result<Response> {
        let mut attempt = 0;
        loop {
            if cancel.is_cancelled() {
                return Err(ScribeError::Cancelled);
            }
            let retry_request = rebuild(&request);
            let response = tokio::select! {
                _ = cancel.cancelled() => return Err(ScribeError::Cancelled),
                sent = self.client.execute(request) => sent?,
            };

            let throttle = Throttle::classify(response.status(), response.headers());
            if !throttle.is_retryable() {
                return Ok(response);
            }
            if attempt >= max_retries {
                warn!(
                    "Rate limit retries exhausted for {} after {} attempts",
                    response.url(),
                    attempt + 1
                );
                return Ok(response);
            }

            let wait = self.backoff.delay(attempt, retry_after(response.headers()));
            warn!(
                "Rate limited ({}) on {}. Retrying in {:.1}s...",
                response.status(),
                response.url(),
                wait.as_secs_f64()
            );
            drop(response);

            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Backoff interrupted by cancellation");
                    return Err(ScribeError::Cancelled);
                }
                _ = sleep(wait) => {}
            }
            attempt += 1;
            debug!("Retry attempt {} of {}", attempt, max_retries);
            request = retry_request;
        }
    }
}

/// Rebuilds an equivalent bodiless request: same method, URL, headers and timeout
fn rebuild(request: &Request) -> Request {
    let mut fresh = Request::new(request.method().clone(), request.url().clone());
    *fresh.headers_mut() = request.headers().clone();
    *fresh.timeout_mut() = request.timeout().copied();
    fresh
}
