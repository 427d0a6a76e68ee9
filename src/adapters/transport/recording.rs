//! Recording transport for testing and development.
//!
//! Captures every outgoing message instead of delivering it, so tests can
//! assert on what a conversation said and asked.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::conversation::{Parameters, Question};
use crate::domain::foundation::SessionKey;
use crate::ports::{MessageTransport, TransportError};

/// A message captured by [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub session: SessionKey,
    pub question: Question,
    pub parameters: Parameters,
}

/// Transport that records outgoing messages.
///
/// # Example
///
/// ```ignore
/// let transport = RecordingTransport::new();
/// host.say(&session, "Hello", Parameters::new()).await?;
///
/// assert_eq!(transport.texts().await, vec!["Hello"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<RwLock<Vec<SentMessage>>>,
    failure: Arc<RwLock<Option<String>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Helpers ===

    /// Returns all sent messages, oldest first.
    pub async fn sent(&self) -> Vec<SentMessage> {
        self.sent.read().await.clone()
    }

    /// Returns the text of every sent message, oldest first.
    pub async fn texts(&self) -> Vec<String> {
        self.sent
            .read()
            .await
            .iter()
            .map(|m| m.question.text().to_string())
            .collect()
    }

    /// Returns the most recently sent message.
    pub async fn last(&self) -> Option<SentMessage> {
        self.sent.read().await.last().cloned()
    }

    pub async fn message_count(&self) -> usize {
        self.sent.read().await.len()
    }

    /// Clears recorded messages (for test isolation).
    pub async fn clear(&self) {
        self.sent.write().await.clear();
    }

    /// Makes every subsequent send fail with `reason`.
    pub async fn fail_with(&self, reason: impl Into<String>) {
        *self.failure.write().await = Some(reason.into());
    }
}

#[async_trait]
impl MessageTransport for RecordingTransport {
    async fn send(
        &self,
        session: &SessionKey,
        question: &Question,
        parameters: &Parameters,
    ) -> Result<(), TransportError> {
        if let Some(reason) = self.failure.read().await.clone() {
            return Err(TransportError::Unavailable(reason));
        }
        self.sent.write().await.push(SentMessage {
            session: session.clone(),
            question: question.clone(),
            parameters: parameters.clone(),
        });
        Ok(())
    }
}
