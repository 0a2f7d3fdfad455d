//! Redis counter store, shared by every instance pointing at the same server.

use std::time::Duration;

use async_trait::async_trait;
use bb8::{Pool, PooledConnection};
use redis::aio::MultiplexedConnection;
use redis::{Client, RedisError};

use crate::config::RedisConfig;
use crate::rate_limit::store::{RateLimitError, RateLimitStore};

type RedisPool = Pool<Client>;

pub struct RedisRateLimitStore {
    pool: RedisPool,
    key_prefix: String,
}

impl RedisRateLimitStore {
    pub async fn new(config: &RedisConfig) -> Result<Self, RateLimitError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| RateLimitError::Connection(e.to_string()))?;

        let pool = Pool::builder()
            .max_size(config.pool_size)
            .connection_timeout(Duration::from_secs(config.connection_timeout))
            .build(client)
            .await
            .map_err(|e| RateLimitError::Connection(e.to_string()))?;

        Ok(Self {
            pool,
            key_prefix: format!("{}:ratelimit", config.key_prefix),
        })
    }

    fn prefixed_key(&self, key: &str) -> String {
        format!("{}:{}", self.key_prefix, key)
    }

    async fn get_conn(&self) -> Result<PooledConnection<'_, Client>, RateLimitError> {
        self.pool
            .get()
            .await
            .map_err(|e| RateLimitError::Connection(e.to_string()))
    }
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    /// INCR and EXPIRE in one MULTI so a crash cannot leave a counter
    /// without a TTL.
    async fn hit(&self, key: &str, ttl: Duration) -> Result<u64, RateLimitError> {
        let mut conn = self.get_conn().await?;
        let prefixed = self.prefixed_key(key);
        let ttl_secs = i64::try_from(ttl.as_secs().max(1)).unwrap_or(i64::MAX);

        let conn_ref: &mut MultiplexedConnection = &mut conn;
        let (count,): (u64,) = redis::pipe()
            .atomic()
            .incr(&prefixed, 1u64)
            .expire(&prefixed, ttl_secs)
            .ignore()
            .query_async(conn_ref)
            .await
            .map_err(|e: RedisError| RateLimitError::Operation(e.to_string()))?;
        Ok(count)
    }

    async fn ping(&self) -> Result<(), RateLimitError> {
        let mut conn = self.get_conn().await?;
        let conn_ref: &mut MultiplexedConnection = &mut conn;
        redis::cmd("PING")
            .query_async::<String>(conn_ref)
            .await
            .map(|_| ())
            .map_err(|e| RateLimitError::Operation(e.to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
