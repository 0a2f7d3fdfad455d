//! Counter storage behind the rate limiter.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::rate_limit::limit::RateLimitParseError;

#[derive(Error, Debug)]
pub enum RateLimitError {
    #[error(transparent)]
    InvalidLimit(#[from] RateLimitParseError),

    #[error("Rate limit store connection failed: {0}")]
    Connection(String),

    #[error("Rate limit store operation failed: {0}")]
    Operation(String),
}

/// Fixed-window counter storage.
///
/// Keys already encode the window, so `ttl` only bounds how long a stale
/// counter may linger.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Increments `key` and returns the new count.
    async fn hit(&self, key: &str, ttl: Duration) -> Result<u64, RateLimitError>;

    /// Liveness probe used by the health endpoint.
    async fn ping(&self) -> Result<(), RateLimitError>;

    fn backend_name(&self) -> &'static str;
}
