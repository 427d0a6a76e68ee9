//! Errors surfaced by the conversation engine.

use thiserror::Error;

use crate::domain::conversation::{HandlerError, HandlerRef};
use crate::domain::foundation::{QuestionId, SessionKey};
use crate::ports::{PendingStoreError, TransportError};

/// Errors that can occur while asking, persisting or resolving a question.
#[derive(Debug, Error)]
pub enum ConversationError {
    /// A continuation was used before a host was bound to it.
    #[error("Question {0} is not bound to a conversation host")]
    HostNotBound(QuestionId),

    /// A reply arrived for a question that was already answered or superseded.
    #[error("Question {0} has already been consumed")]
    AlreadyConsumed(QuestionId),

    /// A persisted handler name is not registered in this process.
    #[error("No {kind} registered under '{name}'")]
    UnknownHandler { kind: &'static str, name: HandlerRef },

    /// A validator or continuation handler failed.
    #[error("Handler '{name}' failed for session {session}: {source}")]
    Handler {
        name: HandlerRef,
        session: SessionKey,
        #[source]
        source: HandlerError,
    },

    /// Pending state could not be persisted or loaded.
    #[error("Pending state storage failed: {0}")]
    Storage(#[from] PendingStoreError),

    /// The transport could not deliver a message.
    #[error("Transport failed: {0}")]
    Transport(#[from] TransportError),
}

impl ConversationError {
    /// Returns true for errors caused by the engine being used out of
    /// protocol rather than by a collaborator failing.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ConversationError::HostNotBound(_) | ConversationError::AlreadyConsumed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_error_mentions_handler_and_session() {
        let err = ConversationError::Handler {
            name: HandlerRef::from("store_age"),
            session: SessionKey::new("test:1").unwrap(),
            source: HandlerError::new("database down"),
        };
        let text = err.to_string();
        assert!(text.contains("store_age"));
        assert!(text.contains("test:1"));
        assert!(text.contains("database down"));
    }

    #[test]
    fn precondition_classification() {
        assert!(ConversationError::HostNotBound(QuestionId::new()).is_precondition());
        assert!(ConversationError::AlreadyConsumed(QuestionId::new()).is_precondition());
        let unknown = ConversationError::UnknownHandler {
            kind: "handler",
            name: HandlerRef::from("x"),
        };
        assert!(!unknown.is_precondition());
    }
}
