//! Question continuation.
//!
//! A continuation is one pending question for one session: what was asked,
//! how to validate the reply and which handlers run on the accepted value.
//! It survives between turns as a [`PendingState`]; the host it talks to is
//! bound at runtime and never persisted.
//!
//! # Example
//!
//! ```ignore
//! host.ask(&session, "How old are you?")
//!     .await?
//!     .validate("age")
//!     .then("store_age")
//!     .await?
//!     .then("thank_user")
//!     .await?;
//!
//! // Next turn, in whatever process receives the reply:
//! let resolution = host.receive(&session, Reply::text("42")).await?;
//! ```

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::domain::conversation::{
    ContinuationHandler, ConversationContext, FollowUp, HandlerRef, Outgoing, Parameters,
    PendingState, Question, Reply, Step,
};
use crate::domain::foundation::{QuestionId, SessionKey};

use super::errors::ConversationError;
use super::host::ConversationHost;
use super::validation::{ValidationCoordinator, Verdict};

/// Result of resolving a continuation against a reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Every handler ran; this is the last handler's value.
    Completed(Value),
    /// A handler halted the chain.
    Halted,
    /// The reply was rejected and the question was asked again.
    Reasked {
        attempt: u32,
        suggested: Option<Value>,
    },
    /// The reply asked for a human; nothing ran.
    HandedOver,
}

impl Resolution {
    /// The final value, if the chain ran to completion.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Resolution::Completed(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Resolution::Completed(value) => Some(value),
            _ => None,
        }
    }

    /// True when the reply produced no value this turn.
    pub fn is_empty(&self) -> bool {
        matches!(self, Resolution::Reasked { .. } | Resolution::HandedOver)
    }
}

/// A pending question together with its runtime host binding.
pub struct QuestionContinuation {
    host: Option<ConversationHost>,
    state: PendingState,
    consumed: bool,
}

impl QuestionContinuation {
    /// Wraps persisted state. The continuation must be bound to a host before
    /// it can be saved or resolved.
    pub fn from_state(state: PendingState) -> Self {
        Self {
            host: None,
            state,
            consumed: false,
        }
    }

    pub fn bind_host(&mut self, host: ConversationHost) -> &mut Self {
        self.host = Some(host);
        self
    }

    pub fn with_host(mut self, host: ConversationHost) -> Self {
        self.host = Some(host);
        self
    }

    pub fn is_bound(&self) -> bool {
        self.host.is_some()
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    pub fn id(&self) -> QuestionId {
        self.state.question_id
    }

    pub fn session(&self) -> &SessionKey {
        &self.state.session
    }

    pub fn question(&self) -> &Question {
        &self.state.question
    }

    pub fn parameters(&self) -> &Parameters {
        &self.state.parameters
    }

    pub fn attempt(&self) -> u32 {
        self.state.attempt
    }

    pub fn suggested(&self) -> Option<&Value> {
        self.state.suggested.as_ref()
    }

    pub fn validator(&self) -> Option<&HandlerRef> {
        self.state.validator.as_ref()
    }

    pub fn handlers(&self) -> &[HandlerRef] {
        &self.state.handlers
    }

    /// The record that is persisted for this question.
    pub fn state(&self) -> &PendingState {
        &self.state
    }

    pub fn into_state(self) -> PendingState {
        self.state
    }

    pub fn set_attempt(&mut self, attempt: u32) -> &mut Self {
        self.state.attempt = attempt.max(1);
        self
    }

    pub fn set_suggested(&mut self, suggested: Option<Value>) -> &mut Self {
        self.state.suggested = suggested;
        self
    }

    /// Records what is being asked. Nothing is sent.
    pub fn set_question(&mut self, question: impl Into<Question>, parameters: Parameters) -> &mut Self {
        self.state.question = question.into();
        self.state.parameters = parameters;
        self
    }

    /// Installs the validator, replacing any previous one.
    ///
    /// This does not persist; the next [`then`](Self::then) or
    /// [`save`](Self::save) does.
    pub fn validate(mut self, validator: impl Into<HandlerRef>) -> Self {
        self.state.validator = Some(validator.into());
        self
    }

    /// Appends a handler to the chain and persists the continuation.
    ///
    /// # Errors
    ///
    /// - `HostNotBound` if no host is bound
    /// - `AlreadyConsumed` if this continuation was already resolved
    /// - `Storage` if the pending state cannot be written
    pub async fn then(mut self, handler: impl Into<HandlerRef>) -> Result<Self, ConversationError> {
        if self.consumed {
            return Err(ConversationError::AlreadyConsumed(self.state.question_id));
        }
        self.state.handlers.push(handler.into());
        self.save().await?;
        Ok(self)
    }

    /// Persists the continuation as the session's pending question.
    ///
    /// # Errors
    ///
    /// - `HostNotBound` if no host is bound
    /// - `AlreadyConsumed` if this continuation was already resolved
    /// - `Storage` if the pending state cannot be written
    pub async fn save(&self) -> Result<(), ConversationError> {
        let host = self.bound_host()?;
        if self.consumed {
            return Err(ConversationError::AlreadyConsumed(self.state.question_id));
        }
        host.store().store(&self.state).await?;
        Ok(())
    }

    /// Resolves the question with the user's reply.
    ///
    /// Validates the reply, then folds the handlers left to right over the
    /// accepted value, stopping at the first [`Step::Halt`]. Messages queued
    /// by validators and handlers are sent in order once the turn is decided.
    /// The last follow-up question queued by a handler becomes the session's
    /// pending question; without one the pending state is discarded.
    ///
    /// # Errors
    ///
    /// - `HostNotBound` if no host is bound
    /// - `AlreadyConsumed` if this continuation was already resolved
    /// - `UnknownHandler` if a persisted name is not registered; nothing runs
    ///   and the continuation stays unconsumed
    /// - `Handler` if a validator or handler fails; earlier handlers' effects
    ///   are not rolled back
    /// - `Storage` / `Transport` if a collaborator fails
    pub async fn resolve(&mut self, reply: impl Into<Reply>) -> Result<Resolution, ConversationError> {
        let host = self.bound_host()?.clone();
        if self.consumed {
            return Err(ConversationError::AlreadyConsumed(self.state.question_id));
        }
        let chain = host.lookup_chain(&self.state)?;
        self.consumed = true;

        let reply = reply.into();
        let session = self.state.session.clone();
        let mut ctx = ConversationContext::new(
            session.clone(),
            self.state.attempt,
            self.state.memory.clone(),
        );

        let verdict = ValidationCoordinator::new(host.registry(), host.policy()).validate(
            &mut ctx,
            &self.state,
            &reply,
        )?;

        match verdict {
            Verdict::HandedOver => {
                tracing::info!(
                    session = %session,
                    question_id = %self.state.question_id,
                    attempt = self.state.attempt,
                    "Reply requested a human, abandoning question"
                );
                host.store().discard(&session).await?;
                Ok(Resolution::HandedOver)
            }
            Verdict::Reask { prompt, suggested } => {
                let (memory, outbox) = ctx.into_parts();
                if deliver(&host, &session, outbox).await?.is_some() {
                    tracing::warn!(
                        session = %session,
                        "Validator queued a follow-up question during a re-ask, ignoring it"
                    );
                }

                host.transport()
                    .send(&session, &prompt, &self.state.parameters)
                    .await?;
                let mut next = self.state.reasked(prompt, suggested);
                next.memory = memory;
                host.store().store(&next).await?;

                tracing::info!(
                    session = %session,
                    question_id = %next.question_id,
                    attempt = next.attempt,
                    "Reply rejected, question asked again"
                );
                Ok(Resolution::Reasked {
                    attempt: next.attempt,
                    suggested: next.suggested,
                })
            }
            Verdict::Accepted(value) => {
                let outcome = self.run_chain(chain, &mut ctx, value);
                let (memory, outbox) = ctx.into_parts();
                let follow_up = deliver(&host, &session, outbox).await?;
                let resolution = outcome?;

                match follow_up {
                    Some(follow_up) => {
                        let next = host.send_follow_up(&session, follow_up, memory).await?;
                        tracing::debug!(
                            session = %session,
                            question_id = %next.question_id,
                            "Follow-up question is now pending"
                        );
                    }
                    None => host.store().discard(&session).await?,
                }

                tracing::info!(
                    session = %session,
                    question_id = %self.state.question_id,
                    halted = matches!(resolution, Resolution::Halted),
                    "Question resolved"
                );
                Ok(resolution)
            }
        }
    }

    fn run_chain(
        &self,
        chain: Vec<(HandlerRef, Arc<dyn ContinuationHandler>)>,
        ctx: &mut ConversationContext,
        value: Value,
    ) -> Result<Resolution, ConversationError> {
        let mut current = value;
        for (name, handler) in chain {
            let step = handler
                .handle(ctx, current)
                .map_err(|source| ConversationError::Handler {
                    name,
                    session: self.state.session.clone(),
                    source,
                })?;
            match step {
                Step::Continue(next) => current = next,
                Step::Halt => return Ok(Resolution::Halted),
            }
        }
        Ok(Resolution::Completed(current))
    }

    fn bound_host(&self) -> Result<&ConversationHost, ConversationError> {
        self.host
            .as_ref()
            .ok_or(ConversationError::HostNotBound(self.state.question_id))
    }
}

/// Sends queued plain messages in order and returns the last queued
/// follow-up question.
async fn deliver(
    host: &ConversationHost,
    session: &SessionKey,
    outbox: Vec<Outgoing>,
) -> Result<Option<FollowUp>, ConversationError> {
    let mut follow_up = None;
    for message in outbox {
        match message {
            Outgoing::Say {
                question,
                parameters,
            } => host.transport().send(session, &question, &parameters).await?,
            Outgoing::Ask(next) => {
                if follow_up.is_some() {
                    tracing::warn!(session = %session, "Several follow-up questions queued, keeping the last");
                }
                follow_up = Some(next);
            }
        }
    }
    Ok(follow_up)
}

impl fmt::Debug for QuestionContinuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuestionContinuation")
            .field("state", &self.state)
            .field("bound", &self.host.is_some())
            .field("consumed", &self.consumed)
            .finish()
    }
}
