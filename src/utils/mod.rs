/// Throttle-aware request retries
pub mod retry;

pub use retry::RetryingFetcher;
