//! Cache Port - Key/value storage with optional expiry.
//!
//! Backs pending question state. Two interchangeable adapters exist: an
//! in-memory map for tests and single-process use, and a Redis store whose keys
//! live under a namespace so they can be flushed in bulk.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    #[error("Cache configuration invalid: {0}")]
    Configuration(String),
}

/// Port for a namespaced key/value cache.
///
/// Writes are last-write-wins. A `ttl` of `None` keeps the entry until it is
/// removed.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Fetch the value under `key`, if present and not expired.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Check whether a live value exists under `key`.
    async fn has(&self, key: &str) -> Result<bool, CacheError>;

    /// Fetch and remove the value under `key`.
    async fn pull(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Fetch and remove the value under `key`, falling back to `default`.
    async fn pull_or(&self, key: &str, default: String) -> Result<String, CacheError> {
        Ok(self.pull(key).await?.unwrap_or(default))
    }

    /// Remove the value under `key`. Returns whether something was removed.
    async fn forget(&self, key: &str) -> Result<bool, CacheError>;

    /// Remove every entry owned by this cache.
    async fn flush(&self) -> Result<(), CacheError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_error_unavailable_display() {
        let err = CacheError::Unavailable("connection refused".to_string());
        assert_eq!(err.to_string(), "Cache unavailable: connection refused");
    }
}
