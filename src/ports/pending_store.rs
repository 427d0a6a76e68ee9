//! Pending State Store Port - Interface for persisting pending questions.
//!
//! A pending question is written whenever a handler is queued or a re-ask
//! occurs, read once when the next reply for the session arrives, and
//! discarded when its chain has run.

use async_trait::async_trait;

use crate::domain::conversation::PendingState;
use crate::domain::foundation::SessionKey;

use super::cache::CacheError;

/// Errors that can occur during pending state storage operations
#[derive(Debug, thiserror::Error)]
pub enum PendingStoreError {
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Failed to serialize pending state: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize pending state for session {session}: {reason}")]
    DeserializationFailed { session: SessionKey, reason: String },
}

/// Port for persisting and loading pending question state
#[async_trait]
pub trait PendingStateStore: Send + Sync {
    /// Save pending state, replacing whatever is stored for its session.
    ///
    /// # Errors
    /// Returns `PendingStoreError` if the state cannot be persisted. Callers
    /// must treat this as fatal: an unpersisted question cannot be resumed.
    async fn store(&self, state: &PendingState) -> Result<(), PendingStoreError>;

    /// Load pending state without removing it.
    async fn load(&self, session: &SessionKey) -> Result<Option<PendingState>, PendingStoreError>;

    /// Load and remove pending state (read-once).
    async fn take(&self, session: &SessionKey) -> Result<Option<PendingState>, PendingStoreError>;

    /// Remove pending state for a session.
    async fn discard(&self, session: &SessionKey) -> Result<(), PendingStoreError>;
}
