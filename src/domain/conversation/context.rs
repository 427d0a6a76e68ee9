//! Conversation context handed to validators and continuation handlers.
//!
//! Handlers never run "as" the conversation. They receive this context
//! explicitly and use it to read the session, keep memory across turns and
//! queue outgoing messages or a follow-up question.

use serde_json::{Map, Value};

use crate::domain::foundation::SessionKey;

use super::handler::HandlerRef;
use super::question::{Parameters, Question};

/// A follow-up question queued by a handler.
///
/// Once the current chain finishes, the host sends it and persists it as the
/// new pending question for the session.
#[derive(Debug, Clone, PartialEq)]
pub struct FollowUp {
    pub question: Question,
    pub parameters: Parameters,
    pub validator: Option<HandlerRef>,
    pub handlers: Vec<HandlerRef>,
}

impl FollowUp {
    pub fn new(question: impl Into<Question>) -> Self {
        Self {
            question: question.into(),
            parameters: Parameters::new(),
            validator: None,
            handlers: Vec::new(),
        }
    }

    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Installs the validator, replacing any previous one.
    pub fn validate(mut self, validator: impl Into<HandlerRef>) -> Self {
        self.validator = Some(validator.into());
        self
    }

    /// Appends a continuation handler.
    pub fn then(mut self, handler: impl Into<HandlerRef>) -> Self {
        self.handlers.push(handler.into());
        self
    }
}

/// Message queued by a handler during one turn.
#[derive(Debug, Clone, PartialEq)]
pub enum Outgoing {
    Say {
        question: Question,
        parameters: Parameters,
    },
    Ask(FollowUp),
}

/// Explicit receiver for validators and handlers.
#[derive(Debug, Clone)]
pub struct ConversationContext {
    session: SessionKey,
    attempt: u32,
    memory: Map<String, Value>,
    outbox: Vec<Outgoing>,
}

impl ConversationContext {
    pub fn new(session: SessionKey, attempt: u32, memory: Map<String, Value>) -> Self {
        Self {
            session,
            attempt,
            memory,
            outbox: Vec::new(),
        }
    }

    pub fn session(&self) -> &SessionKey {
        &self.session
    }

    /// Attempt number of the question being answered (starts at 1).
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Stores a value in conversation memory. Memory survives re-asks and
    /// follow-up questions.
    pub fn remember(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.memory.insert(key.into(), value.into());
    }

    pub fn recall(&self, key: &str) -> Option<&Value> {
        self.memory.get(key)
    }

    pub fn forget(&mut self, key: &str) -> Option<Value> {
        self.memory.remove(key)
    }

    pub fn memory(&self) -> &Map<String, Value> {
        &self.memory
    }

    /// Queues a plain message.
    pub fn say(&mut self, question: impl Into<Question>) {
        self.say_with(question, Parameters::new());
    }

    pub fn say_with(&mut self, question: impl Into<Question>, parameters: Parameters) {
        self.outbox.push(Outgoing::Say {
            question: question.into(),
            parameters,
        });
    }

    /// Queues a follow-up question.
    pub fn ask(&mut self, follow_up: FollowUp) {
        self.outbox.push(Outgoing::Ask(follow_up));
    }

    pub fn outbox(&self) -> &[Outgoing] {
        &self.outbox
    }

    /// Splits the context into its memory and the queued messages.
    pub fn into_parts(self) -> (Map<String, Value>, Vec<Outgoing>) {
        (self.memory, self.outbox)
    }
}
