//! Message Transport Port - Outgoing messages to the chat platform.
//!
//! Platform drivers implement this port. Rendering of buttons and parameters
//! is entirely the driver's concern.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::conversation::{Parameters, Question};
use crate::domain::foundation::SessionKey;

/// Errors raised by a transport
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Transport unavailable: {0}")]
    Unavailable(String),

    #[error("Message rejected by platform: {0}")]
    Rejected(String),
}

/// Port for sending messages to a conversation.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Send a question (or plain message) to the session.
    async fn send(
        &self,
        session: &SessionKey,
        question: &Question,
        parameters: &Parameters,
    ) -> Result<(), TransportError>;
}
