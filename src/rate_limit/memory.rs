//! In-process counter store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::rate_limit::store::{RateLimitError, RateLimitStore};

/// Expired windows are swept after this many hits.
const SWEEP_INTERVAL: u64 = 1024;

struct Counter {
    count: u64,
    expires_at: Instant,
}

/// Counters held in a `DashMap`. Limits are per process, so several
/// instances behind a load balancer each enforce their own quota.
#[derive(Default)]
pub struct MemoryRateLimitStore {
    counters: DashMap<String, Counter>,
    hits: AtomicU64,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    fn sweep(&self, now: Instant) {
        self.counters.retain(|_, counter| counter.expires_at > now);
    }
}

#[async_trait]
impl RateLimitStore for MemoryRateLimitStore {
    async fn hit(&self, key: &str, ttl: Duration) -> Result<u64, RateLimitError> {
        let now = Instant::now();

        if self.hits.fetch_add(1, Ordering::Relaxed) % SWEEP_INTERVAL == SWEEP_INTERVAL - 1 {
            self.sweep(now);
        }

        let mut entry = self.counters.entry(key.to_string()).or_insert(Counter {
            count: 0,
            expires_at: now + ttl,
        });
        if entry.expires_at <= now {
            entry.count = 0;
            entry.expires_at = now + ttl;
        }
        entry.count += 1;
        Ok(entry.count)
    }

    async fn ping(&self) -> Result<(), RateLimitError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
