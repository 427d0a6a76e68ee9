//! Conversation host.
//!
//! The host is the façade a chat integration talks to. It sends questions
//! through the transport, hands out continuations bound to itself and
//! resumes the pending question for a session when a reply arrives.

use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use crate::adapters::cache;
use crate::adapters::CachePendingStore;
use crate::config::AppConfig;
use crate::domain::conversation::{
    ContinuationHandler, FollowUp, HandlerRef, HandlerRegistry, MediaKind, Parameters, PendingState, Question, Reply,
    EXPECTS_PARAMETER,
};
use crate::domain::foundation::SessionKey;
use crate::ports::{MessageTransport, PendingStateStore, PendingStoreError};

use super::continuation::{QuestionContinuation, Resolution};
use super::errors::ConversationError;
use super::policy::ValidationPolicy;

/// Sends questions and resumes pending ones.
///
/// Cheap to clone; every continuation it hands out holds a clone.
#[derive(Clone)]
pub struct ConversationHost {
    transport: Arc<dyn MessageTransport>,
    store: Arc<dyn PendingStateStore>,
    registry: Arc<HandlerRegistry>,
    policy: ValidationPolicy,
}

impl ConversationHost {
    pub fn new(
        transport: Arc<dyn MessageTransport>,
        store: Arc<dyn PendingStateStore>,
        registry: Arc<HandlerRegistry>,
        policy: ValidationPolicy,
    ) -> Self {
        Self {
            transport,
            store,
            registry,
            policy,
        }
    }

    /// Builds a host whose pending questions live in the configured cache.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the cache backend cannot be reached.
    pub async fn from_config(
        config: &AppConfig,
        transport: Arc<dyn MessageTransport>,
        registry: Arc<HandlerRegistry>,
    ) -> Result<Self, ConversationError> {
        let backend = cache::connect(config).await.map_err(PendingStoreError::from)?;
        let mut store = CachePendingStore::new(backend).with_prefix(config.cache.key_prefix.clone());
        if let Some(ttl) = config.cache.pending_ttl() {
            store = store.with_ttl(ttl);
        }
        Ok(Self::new(
            transport,
            Arc::new(store),
            registry,
            ValidationPolicy::from_config(&config.conversation),
        ))
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    pub(crate) fn transport(&self) -> &dyn MessageTransport {
        self.transport.as_ref()
    }

    pub(crate) fn store(&self) -> &dyn PendingStateStore {
        self.store.as_ref()
    }

    /// Sends a message that expects no reply.
    pub async fn say(
        &self,
        session: &SessionKey,
        question: impl Into<Question>,
        parameters: Parameters,
    ) -> Result<(), ConversationError> {
        self.transport
            .send(session, &question.into(), &parameters)
            .await?;
        Ok(())
    }

    /// Sends a question and returns its continuation (attempt 1, no
    /// suggestion). Nothing is persisted until a handler is attached.
    pub async fn ask(
        &self,
        session: &SessionKey,
        question: impl Into<Question>,
    ) -> Result<QuestionContinuation, ConversationError> {
        self.ask_with(session, question, Parameters::new()).await
    }

    pub async fn ask_with(
        &self,
        session: &SessionKey,
        question: impl Into<Question>,
        parameters: Parameters,
    ) -> Result<QuestionContinuation, ConversationError> {
        let question = question.into();
        self.transport.send(session, &question, &parameters).await?;
        tracing::debug!(session = %session, "Question asked");

        let state = PendingState::new(session.clone(), question, parameters);
        Ok(QuestionContinuation::from_state(state).with_host(self.clone()))
    }

    pub async fn ask_for_images(
        &self,
        session: &SessionKey,
        question: impl Into<Question>,
    ) -> Result<QuestionContinuation, ConversationError> {
        self.ask_for_media(session, question, MediaKind::Image).await
    }

    pub async fn ask_for_videos(
        &self,
        session: &SessionKey,
        question: impl Into<Question>,
    ) -> Result<QuestionContinuation, ConversationError> {
        self.ask_for_media(session, question, MediaKind::Video).await
    }

    pub async fn ask_for_audio(
        &self,
        session: &SessionKey,
        question: impl Into<Question>,
    ) -> Result<QuestionContinuation, ConversationError> {
        self.ask_for_media(session, question, MediaKind::Audio).await
    }

    pub async fn ask_for_location(
        &self,
        session: &SessionKey,
        question: impl Into<Question>,
    ) -> Result<QuestionContinuation, ConversationError> {
        self.ask_for_media(session, question, MediaKind::Location).await
    }

    pub async fn ask_for_files(
        &self,
        session: &SessionKey,
        question: impl Into<Question>,
    ) -> Result<QuestionContinuation, ConversationError> {
        self.ask_for_media(session, question, MediaKind::File).await
    }

    /// Asks for attachments of one kind, marking the parameters and
    /// installing the built-in media validator.
    async fn ask_for_media(
        &self,
        session: &SessionKey,
        question: impl Into<Question>,
        kind: MediaKind,
    ) -> Result<QuestionContinuation, ConversationError> {
        let mut parameters = Parameters::new();
        parameters.insert(EXPECTS_PARAMETER.to_string(), Value::from(kind.as_str()));
        let continuation = self.ask_with(session, question, parameters).await?;
        Ok(continuation.validate(HandlerRef::media(kind)))
    }

    /// Loads the pending question for a session without consuming it.
    pub async fn load(
        &self,
        session: &SessionKey,
    ) -> Result<Option<QuestionContinuation>, ConversationError> {
        let state = self.store.load(session).await?;
        Ok(state.map(|state| QuestionContinuation::from_state(state).with_host(self.clone())))
    }

    /// Handles a reply for a session.
    ///
    /// The pending question is taken from storage, so a second delivery of
    /// the same reply finds nothing. Returns `Ok(None)` when no question is
    /// pending. A question naming an unregistered validator or handler is
    /// left in storage and `UnknownHandler` is returned.
    pub async fn receive(
        &self,
        session: &SessionKey,
        reply: impl Into<Reply>,
    ) -> Result<Option<Resolution>, ConversationError> {
        let Some(pending) = self.store.load(session).await? else {
            tracing::debug!(session = %session, "No pending question for reply");
            return Ok(None);
        };
        if let Err(err) = self.lookup_chain(&pending) {
            tracing::warn!(session = %session, error = %err, "Pending question cannot be resolved here, leaving it in place");
            return Err(err);
        }

        let Some(state) = self.store.take(session).await? else {
            return Ok(None);
        };

        let mut continuation = QuestionContinuation::from_state(state).with_host(self.clone());
        continuation.resolve(reply).await.map(Some)
    }

    /// Drops the pending question for a session.
    pub async fn discard(&self, session: &SessionKey) -> Result<(), ConversationError> {
        self.store.discard(session).await?;
        Ok(())
    }

    /// Resolves the validator and every handler named by `state`, in chain
    /// order.
    pub(crate) fn lookup_chain(
        &self,
        state: &PendingState,
    ) -> Result<Vec<(HandlerRef, Arc<dyn ContinuationHandler>)>, ConversationError> {
        if let Some(name) = &state.validator {
            if !self.registry.has_validator(name) {
                return Err(ConversationError::UnknownHandler {
                    kind: "validator",
                    name: name.clone(),
                });
            }
        }
        state
            .handlers
            .iter()
            .map(|name| {
                self.registry
                    .handler(name.clone())
                    .map(|handler| (name.clone(), handler))
                    .ok_or_else(|| ConversationError::UnknownHandler {
                        kind: "handler",
                        name: name.clone(),
                    })
            })
            .collect()
    }

    /// Sends a follow-up question queued by a handler and persists it as the
    /// session's pending question.
    pub(crate) async fn send_follow_up(
        &self,
        session: &SessionKey,
        follow_up: FollowUp,
        memory: Map<String, Value>,
    ) -> Result<PendingState, ConversationError> {
        let FollowUp {
            question,
            parameters,
            validator,
            handlers,
        } = follow_up;

        self.transport.send(session, &question, &parameters).await?;
        let mut state = PendingState::new(session.clone(), question, parameters);
        state.validator = validator;
        state.handlers = handlers;
        state.memory = memory;
        self.store.store(&state).await?;
        Ok(state)
    }
}

impl fmt::Debug for ConversationHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversationHost")
            .field("registry", &self.registry)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryCache, RecordingTransport};
    use serde_json::json;

    fn host() -> (ConversationHost, RecordingTransport) {
        let transport = RecordingTransport::new();
        let store = CachePendingStore::new(Arc::new(InMemoryCache::new()));
        let host = ConversationHost::new(
            Arc::new(transport.clone()),
            Arc::new(store),
            Arc::new(HandlerRegistry::new()),
            ValidationPolicy::default(),
        );
        (host, transport)
    }

    fn session() -> SessionKey {
        SessionKey::new("test:1").unwrap()
    }

    #[tokio::test]
    async fn ask_sends_and_returns_bound_first_attempt() {
        let (host, transport) = host();
        let continuation = host.ask(&session(), "Name?").await.unwrap();

        assert!(continuation.is_bound());
        assert_eq!(continuation.attempt(), 1);
        assert!(continuation.suggested().is_none());
        assert_eq!(transport.texts().await, vec!["Name?"]);
    }

    #[tokio::test]
    async fn ask_alone_does_not_persist() {
        let (host, _) = host();
        host.ask(&session(), "Name?").await.unwrap();
        assert!(host.load(&session()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn media_asks_mark_parameters_and_install_validator() {
        let (host, transport) = host();
        let cases = [
            (MediaKind::Image, "image"),
            (MediaKind::Video, "video"),
            (MediaKind::Audio, "audio"),
            (MediaKind::Location, "location"),
            (MediaKind::File, "file"),
        ];
        for (kind, marker) in cases {
            let continuation = match kind {
                MediaKind::Image => host.ask_for_images(&session(), "Send it").await,
                MediaKind::Video => host.ask_for_videos(&session(), "Send it").await,
                MediaKind::Audio => host.ask_for_audio(&session(), "Send it").await,
                MediaKind::Location => host.ask_for_location(&session(), "Send it").await,
                MediaKind::File => host.ask_for_files(&session(), "Send it").await,
            }
            .unwrap();

            assert_eq!(continuation.parameters()[EXPECTS_PARAMETER], json!(marker));
            assert_eq!(continuation.validator(), Some(&HandlerRef::media(kind)));
            let sent = transport.last().await.unwrap();
            assert_eq!(sent.parameters[EXPECTS_PARAMETER], json!(marker));
        }
    }

    #[tokio::test]
    async fn receive_without_pending_question_is_none() {
        let (host, _) = host();
        assert!(host.receive(&session(), "hello").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn say_goes_through_transport() {
        let (host, transport) = host();
        host.say(&session(), "Hello", Parameters::new()).await.unwrap();
        let sent = transport.last().await.unwrap();
        assert_eq!(sent.session, session());
        assert_eq!(sent.question.text(), "Hello");
    }

    #[tokio::test]
    async fn from_config_uses_memory_backend_by_default() {
        let transport = RecordingTransport::new();
        let host = ConversationHost::from_config(
            &AppConfig::default(),
            Arc::new(transport),
            Arc::new(HandlerRegistry::new()),
        )
        .await
        .unwrap();

        host.ask(&session(), "Name?").await.unwrap().save().await.unwrap();
        assert!(host.load(&session()).await.unwrap().is_some());
    }
}
