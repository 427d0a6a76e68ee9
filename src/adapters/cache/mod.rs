//! Cache adapters.
//!
//! Implementations of the Cache port for different backends.
//!
//! ## Available Adapters
//!
//! - `InMemoryCache` - In-memory for testing and single-process use
//! - `RedisCache` - Redis-backed for production multi-process use
//!
//! ## Usage
//!
//! ```ignore
//! use question_flow::adapters::cache::{connect, InMemoryCache};
//!
//! // For testing
//! let cache = InMemoryCache::new();
//!
//! // From configuration
//! let cache = connect(&config).await?;
//! ```

mod in_memory;
mod redis;

pub use in_memory::InMemoryCache;
pub use redis::RedisCache;

use std::sync::Arc;

use crate::config::{AppConfig, CacheBackend};
use crate::ports::{Cache, CacheError};

/// Build the cache backend selected by configuration.
pub async fn connect(config: &AppConfig) -> Result<Arc<dyn Cache>, CacheError> {
    match config.cache.backend {
        CacheBackend::Memory => {
            tracing::info!("Using in-memory cache for pending questions");
            Ok(Arc::new(InMemoryCache::new()))
        }
        CacheBackend::Redis => {
            let redis = config.redis.as_ref().ok_or_else(|| {
                CacheError::Configuration("redis backend selected without redis settings".into())
            })?;
            tracing::info!(namespace = %redis.namespace, "Using Redis cache for pending questions");
            Ok(Arc::new(RedisCache::connect(redis).await?))
        }
    }
}
