//! In-Memory Cache Adapter
//!
//! Stores entries in a process-local map with per-entry expiry.
//! Useful for testing and single-process deployments; nothing survives a
//! restart.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::domain::foundation::Timestamp;
use crate::ports::{Cache, CacheError};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Timestamp>,
}

impl Entry {
    fn is_live(&self, now: &Timestamp) -> bool {
        match &self.expires_at {
            Some(expires_at) => expires_at.is_after(now),
            None => true,
        }
    }
}

/// In-memory cache for pending question state
#[derive(Debug, Clone, Default)]
pub struct InMemoryCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl InMemoryCache {
    /// Create a new, empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries (useful for tests)
    pub async fn len(&self) -> usize {
        let now = Timestamp::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.is_live(&now))
            .count()
    }

    /// Whether the cache holds no live entries
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), CacheError> {
        let expires_at = ttl.map(|ttl| Timestamp::now().plus(ttl));
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Timestamp::now();
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|e| e.is_live(&now))
            .map(|e| e.value.clone()))
    }

    async fn has(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.get(key).await?.is_some())
    }

    async fn pull(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Timestamp::now();
        let mut entries = self.entries.write().await;
        Ok(entries
            .remove(key)
            .filter(|e| e.is_live(&now))
            .map(|e| e.value))
    }

    async fn forget(&self, key: &str) -> Result<bool, CacheError> {
        let now = Timestamp::now();
        let mut entries = self.entries.write().await;
        Ok(entries.remove(key).is_some_and(|e| e.is_live(&now)))
    }

    async fn flush(&self) -> Result<(), CacheError> {
        self.entries.write().await.clear();
        Ok(())
    }
}
