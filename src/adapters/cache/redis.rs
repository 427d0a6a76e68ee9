//! Redis-backed cache for production multi-process deployments.
//!
//! Every key is stored as `<namespace>:<key>` so that all entries owned by
//! one deployment can be flushed with a prefix scan.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, IntoConnectionInfo};
use secrecy::ExposeSecret;
use std::time::Duration;

use crate::config::RedisConfig;
use crate::ports::{Cache, CacheError};

/// Redis-backed cache.
///
/// Uses a multiplexed connection, so clones are cheap and share it.
#[derive(Clone)]
pub struct RedisCache {
    conn: MultiplexedConnection,
    namespace: String,
}

fn unavailable(e: redis::RedisError) -> CacheError {
    CacheError::Unavailable(e.to_string())
}

impl RedisCache {
    /// Create a cache over an existing connection.
    pub fn new(conn: MultiplexedConnection, namespace: impl Into<String>) -> Self {
        Self {
            conn,
            namespace: namespace.into(),
        }
    }

    /// Connect using configuration, applying the configured password.
    pub async fn connect(config: &RedisConfig) -> Result<Self, CacheError> {
        let mut info = config
            .url
            .as_str()
            .into_connection_info()
            .map_err(|e| CacheError::Configuration(e.to_string()))?;
        if let Some(password) = &config.password {
            info.redis.password = Some(password.expose_secret().clone());
        }

        let client = redis::Client::open(info).map_err(unavailable)?;
        let conn = tokio::time::timeout(config.timeout(), client.get_multiplexed_tokio_connection())
            .await
            .map_err(|_| CacheError::Unavailable("connection timed out".to_string()))?
            .map_err(unavailable)?;

        tracing::debug!(namespace = %config.namespace, "Connected to Redis cache");
        Ok(Self::new(conn, config.namespace.clone()))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the namespaced Redis key for a cache key.
    fn redis_key(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), CacheError> {
        let redis_key = self.redis_key(key);
        let mut conn = self.conn.clone();

        let mut cmd = redis::cmd("SET");
        cmd.arg(&redis_key).arg(value);
        if let Some(ttl) = ttl {
            // Redis expiry granularity is one second
            cmd.arg("EX").arg(ttl.as_secs().max(1));
        }
        cmd.query_async::<_, ()>(&mut conn)
            .await
            .map_err(unavailable)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        conn.get(self.redis_key(key)).await.map_err(unavailable)
    }

    async fn has(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        conn.exists(self.redis_key(key)).await.map_err(unavailable)
    }

    async fn pull(&self, key: &str) -> Result<Option<String>, CacheError> {
        let redis_key = self.redis_key(key);
        let mut conn = self.conn.clone();

        let (value, _removed): (Option<String>, i64) = redis::pipe()
            .atomic()
            .get(&redis_key)
            .del(&redis_key)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(value)
    }

    async fn forget(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.del(self.redis_key(key)).await.map_err(unavailable)?;
        Ok(removed > 0)
    }

    async fn flush(&self) -> Result<(), CacheError> {
        let pattern = format!("{}:*", self.namespace);

        let mut keys: Vec<String> = Vec::new();
        {
            let mut scan_conn = self.conn.clone();
            let mut iter = scan_conn
                .scan_match::<_, String>(&pattern)
                .await
                .map_err(unavailable)?;
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
        }

        if keys.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn.clone();
        let removed: i64 = conn.del(&keys).await.map_err(unavailable)?;
        tracing::debug!(namespace = %self.namespace, removed, "Flushed Redis cache namespace");
        Ok(())
    }
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}
