//! Cache-backed Pending State Store Adapter
//!
//! Stores each session's pending question as JSON in a [`Cache`] under
//! `<prefix>:<session>`, with an optional time-to-live.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::conversation::PendingState;
use crate::domain::foundation::SessionKey;
use crate::ports::{Cache, PendingStateStore, PendingStoreError};

/// Default key prefix for pending question entries
pub const DEFAULT_PENDING_PREFIX: &str = "pending";

/// Pending question storage on top of any cache backend
#[derive(Clone)]
pub struct CachePendingStore {
    cache: Arc<dyn Cache>,
    prefix: String,
    ttl: Option<Duration>,
}

impl CachePendingStore {
    /// Create a store with the default prefix and no expiry
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self {
            cache,
            prefix: DEFAULT_PENDING_PREFIX.to_string(),
            ttl: None,
        }
    }

    /// Set the key prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Expire pending questions after `ttl`
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    fn key(&self, session: &SessionKey) -> String {
        format!("{}:{}", self.prefix, session)
    }

    fn decode(
        session: &SessionKey,
        raw: Option<String>,
    ) -> Result<Option<PendingState>, PendingStoreError> {
        raw.map(|json| {
            serde_json::from_str(&json).map_err(|e| PendingStoreError::DeserializationFailed {
                session: session.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
    }
}

#[async_trait]
impl PendingStateStore for CachePendingStore {
    async fn store(&self, state: &PendingState) -> Result<(), PendingStoreError> {
        let json = serde_json::to_string(state)
            .map_err(|e| PendingStoreError::SerializationFailed(e.to_string()))?;
        self.cache.put(&self.key(&state.session), json, self.ttl).await?;
        tracing::debug!(
            session = %state.session,
            question_id = %state.question_id,
            attempt = state.attempt,
            handlers = state.handlers.len(),
            "Stored pending question"
        );
        Ok(())
    }

    async fn load(&self, session: &SessionKey) -> Result<Option<PendingState>, PendingStoreError> {
        let raw = self.cache.get(&self.key(session)).await?;
        Self::decode(session, raw)
    }

    async fn take(&self, session: &SessionKey) -> Result<Option<PendingState>, PendingStoreError> {
        let raw = self.cache.pull(&self.key(session)).await?;
        Self::decode(session, raw)
    }

    async fn discard(&self, session: &SessionKey) -> Result<(), PendingStoreError> {
        if self.cache.forget(&self.key(session)).await? {
            tracing::debug!(session = %session, "Discarded pending question");
        }
        Ok(())
    }
}

impl std::fmt::Debug for CachePendingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachePendingStore")
            .field("prefix", &self.prefix)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
