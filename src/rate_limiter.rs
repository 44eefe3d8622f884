use std::time::Duration;
use rand::Rng;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use crate::config::BackoffConfig;

/// Header GitHub uses to report the remaining request quota
pub const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// How an upstream response relates to rate limiting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Throttle {
    /// Not a throttling signal
    Clear,
    /// 429, or 403 with zero remaining quota
    RateLimited,
    /// 401, or 403 without a quota explanation
    AuthRequired,
}

impl Throttle {
    /// Classifies a response by status and headers
    pub fn classify(status: StatusCode, headers: &HeaderMap) -> Self {
        match status {
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited,
            StatusCode::FORBIDDEN if quota_exhausted(headers) => Self::RateLimited,
            StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => Self::AuthRequired,
            _ => Self::Clear,
        }
    }

    /// Whether the retrying fetcher should back off and try again
    pub fn is_retryable(self) -> bool {
        self == Self::RateLimited
    }
}

fn quota_exhausted(headers: &HeaderMap) -> bool {
    headers
        .get(RATE_LIMIT_REMAINING)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim() == "0")
        .unwrap_or(false)
}

/// Reads a `Retry-After` hint expressed in (possibly fractional) seconds
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let raw = headers.get(RETRY_AFTER)?.to_str().ok()?;
    let secs: f64 = raw.trim().parse().ok()?;
    if secs.is_nan() || secs < 0.0 {
        return None;
    }
    // Out-of-range hints saturate; the policy clamps them to its ceiling.
    Some(Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX))
}

/// Exponential backoff with halving jitter, clamped to a window
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    default_wait: Duration,
    min_wait: Duration,
    max_wait: Duration,
}

impl BackoffPolicy {
    /// Creates a policy from explicit bounds
    pub fn new(default_wait: Duration, min_wait: Duration, max_wait: Duration) -> Self {
        Self {
            default_wait,
            min_wait,
            max_wait,
        }
    }

    /// Wait before retry number `attempt` (zero-based) with a random jitter
    pub fn delay(&self, attempt: u32, hint: Option<Duration>) -> Duration {
        let jitter = rand::thread_rng().gen_range(0.5..=1.0);
        self.delay_with_jitter(attempt, hint, jitter)
    }

    /// Wait before retry number `attempt` for a given jitter factor in `[0.5, 1.0]`
    ///
    /// The hint, or the default baseline, is scaled by `2^attempt`, multiplied
    /// by the jitter factor and clamped to `[min_wait, max_wait]`.
    pub fn delay_with_jitter(&self, attempt: u32, hint: Option<Duration>, jitter: f64) -> Duration {
        let base = hint.unwrap_or(self.default_wait).as_secs_f64();
        let scaled = base * 2f64.powi(attempt.min(16) as i32) * jitter.clamp(0.5, 1.0);
        let wait = Duration::from_secs_f64(scaled.min(self.max_wait.as_secs_f64()));
        wait.clamp(self.min_wait, self.max_wait)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from(&BackoffConfig::default())
    }
}

impl From<&BackoffConfig> for BackoffPolicy {
    fn from(config: &BackoffConfig) -> Self {
        Self::new(
            Duration::from_secs(config.default_wait_secs),
            Duration::from_millis(config.min_wait_ms),
            Duration::from_secs(config.max_wait_secs),
        )
    }
}
