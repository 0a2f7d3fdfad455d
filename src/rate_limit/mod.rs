//! Fixed-window request rate limiting.
//!
//! Limits are written as `"<count>/<unit>"` strings:
//!
//! ```toml
//! [rate_limit]
//! enabled = true
//! backend = "memory"  # or "redis"
//! default_limits = ["100/minute", "1000/hour"]
//!
//! [rate_limit.routes]
//! "/api/auth/login" = "10/minute"
//! ```
//!
//! Counters are keyed by identity (user id when authenticated, client IP
//! otherwise), route template, limit and window number.

mod limit;
mod limiter;
mod memory;
mod redis;
mod store;

pub use limit::{Period, RateLimit, RateLimitParseError};
pub use limiter::{RateLimitDecision, RateLimiter};
pub use memory::MemoryRateLimitStore;
pub use redis::RedisRateLimitStore;
pub use store::{RateLimitError, RateLimitStore};
