//! Applies configured limits to `(identity, route)` pairs.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{RateLimitBackend, RateLimitConfig, RedisConfig};
use crate::rate_limit::limit::RateLimit;
use crate::rate_limit::memory::MemoryRateLimitStore;
use crate::rate_limit::redis::RedisRateLimitStore;
use crate::rate_limit::store::{RateLimitError, RateLimitStore};

/// Outcome of a single check, used for the `X-RateLimit-*` headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// The limit that decided the outcome: the exceeded one, or the one
    /// with the fewest requests left.
    pub limit: RateLimit,
    pub remaining: u64,
    pub reset_after: u64,
}

#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    defaults: Vec<RateLimit>,
    routes: HashMap<String, RateLimit>,
}

impl RateLimiter {
    pub fn new(
        store: Arc<dyn RateLimitStore>,
        defaults: Vec<RateLimit>,
        routes: HashMap<String, RateLimit>,
    ) -> Self {
        Self {
            store,
            defaults,
            routes,
        }
    }

    /// Build the limiter and its backing store from configuration.
    pub async fn from_config(
        config: &RateLimitConfig,
        redis: &RedisConfig,
    ) -> Result<Self, RateLimitError> {
        let defaults = config
            .default_limits
            .iter()
            .map(|s| s.parse())
            .collect::<Result<Vec<RateLimit>, _>>()?;
        let routes = config
            .routes
            .iter()
            .map(|(route, s)| Ok((route.clone(), s.parse()?)))
            .collect::<Result<HashMap<_, _>, RateLimitError>>()?;

        let store: Arc<dyn RateLimitStore> = match config.backend {
            RateLimitBackend::Memory => Arc::new(MemoryRateLimitStore::new()),
            RateLimitBackend::Redis => Arc::new(RedisRateLimitStore::new(redis).await?),
        };

        tracing::info!(
            backend = store.backend_name(),
            defaults = defaults.len(),
            routes = routes.len(),
            "Rate limiter initialized"
        );

        Ok(Self::new(store, defaults, routes))
    }

    pub fn store(&self) -> &Arc<dyn RateLimitStore> {
        &self.store
    }

    /// Limits that apply to `route`: the route-specific one first, then the defaults.
    pub fn limits_for(&self, route: &str) -> Vec<RateLimit> {
        self.routes
            .get(route)
            .into_iter()
            .copied()
            .chain(self.defaults.iter().copied())
            .collect()
    }

    pub async fn check(
        &self,
        identity: &str,
        route: &str,
    ) -> Result<Option<RateLimitDecision>, RateLimitError> {
        let now = u64::try_from(jiff::Timestamp::now().as_second()).unwrap_or_default();
        self.check_at(identity, route, now).await
    }

    /// Count one request against every limit for `route` at unix time `now`.
    ///
    /// Returns `None` when no limit applies.
    pub async fn check_at(
        &self,
        identity: &str,
        route: &str,
        now: u64,
    ) -> Result<Option<RateLimitDecision>, RateLimitError> {
        let mut decision: Option<RateLimitDecision> = None;

        for limit in self.limits_for(route) {
            let window = limit.window_index(now);
            let key = format!("{identity}|{route}|{limit}|{window}");
            let reset_after = limit.reset_after(now);

            let count = self
                .store
                .hit(&key, Duration::from_secs(reset_after))
                .await?;

            let current = RateLimitDecision {
                allowed: count <= limit.count,
                limit,
                remaining: limit.count.saturating_sub(count),
                reset_after,
            };

            decision = Some(match decision {
                None => current,
                Some(prev) => pick_binding(prev, current),
            });
        }

        Ok(decision)
    }
}

/// A rejection beats an allowance; among rejections the longest wait wins,
/// among allowances the fewest remaining requests.
fn pick_binding(a: RateLimitDecision, b: RateLimitDecision) -> RateLimitDecision {
    match (a.allowed, b.allowed) {
        (true, false) => b,
        (false, true) => a,
        (false, false) if b.reset_after > a.reset_after => b,
        (false, false) => a,
        (true, true) if b.remaining < a.remaining => b,
        (true, true) => a,
    }
}
