//! Validators, continuation handlers and the registry that resolves them by name.
//!
//! Pending questions outlive the process that asked them, so they never hold
//! closures. They hold [`HandlerRef`] names which are looked up in a
//! [`HandlerRegistry`] when the reply arrives.
//!
//! # Example
//!
//! ```
//! use question_flow::domain::conversation::{
//!     ConversationContext, HandlerError, HandlerRegistry, InvalidAnswer, Reply, Step, Validation,
//! };
//! use serde_json::Value;
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register_validator("age", |_: &mut ConversationContext, reply: &Reply| -> Result<Validation, HandlerError> {
//!     match reply.as_text().and_then(|t| t.trim().parse::<u8>().ok()) {
//!         Some(age) => Ok(Validation::Accept(age.into())),
//!         None => Ok(Validation::Reject(InvalidAnswer::new("Please type a number."))),
//!     }
//! });
//! registry.register_handler("store_age", |ctx: &mut ConversationContext, value: Value| -> Result<Step, HandlerError> {
//!     ctx.remember("age", value.clone());
//!     Ok(Step::Continue(value))
//! });
//!
//! assert!(registry.validator("age").is_some());
//! assert!(registry.handler("store_age").is_some());
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use super::context::ConversationContext;
use super::invalid_answer::InvalidAnswer;
use super::reply::{MediaKind, Reply};

/// Stable name of a registered validator or handler.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandlerRef(String);

impl HandlerRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the built-in validator for a media kind.
    pub fn media(kind: MediaKind) -> Self {
        Self(format!("expect:{}", kind.as_str()))
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for HandlerRef {
    fn from(name: &str) -> Self {
        HandlerRef::new(name)
    }
}

impl From<String> for HandlerRef {
    fn from(name: String) -> Self {
        HandlerRef(name)
    }
}

/// Failure raised by a validator or handler.
///
/// These are never retried and never swallowed by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Outcome of running a validator.
#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    /// The reply is acceptable; this value enters the continuation chain.
    Accept(Value),
    /// The reply is rejected; re-ask as described.
    Reject(InvalidAnswer),
}

/// Outcome of one continuation handler.
///
/// `Halt` stops the chain. It is distinct from `Continue(Value::Null)` so
/// that null stays a legitimate value.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Continue(Value),
    Halt,
}

/// Decides whether a reply is acceptable.
pub trait Validator: Send + Sync {
    fn validate(
        &self,
        ctx: &mut ConversationContext,
        reply: &Reply,
    ) -> Result<Validation, HandlerError>;
}

impl<F> Validator for F
where
    F: Fn(&mut ConversationContext, &Reply) -> Result<Validation, HandlerError> + Send + Sync,
{
    fn validate(
        &self,
        ctx: &mut ConversationContext,
        reply: &Reply,
    ) -> Result<Validation, HandlerError> {
        self(ctx, reply)
    }
}

/// One link of the continuation chain.
pub trait ContinuationHandler: Send + Sync {
    fn handle(&self, ctx: &mut ConversationContext, value: Value) -> Result<Step, HandlerError>;
}

impl<F> ContinuationHandler for F
where
    F: Fn(&mut ConversationContext, Value) -> Result<Step, HandlerError> + Send + Sync,
{
    fn handle(&self, ctx: &mut ConversationContext, value: Value) -> Result<Step, HandlerError> {
        self(ctx, value)
    }
}

/// Built-in validator behind the specialized media ask variants.
///
/// Accepts attachments of the expected kind and yields their URLs.
#[derive(Debug, Clone)]
pub struct MediaValidator {
    kind: MediaKind,
    reask: String,
}

impl MediaValidator {
    pub fn new(kind: MediaKind) -> Self {
        let reask = match kind {
            MediaKind::Image => "Please send an image.",
            MediaKind::Video => "Please send a video.",
            MediaKind::Audio => "Please send an audio message.",
            MediaKind::Location => "Please share a location.",
            MediaKind::File => "Please send a file.",
        };
        Self {
            kind,
            reask: reask.to_string(),
        }
    }

    pub fn with_reask(mut self, reask: impl Into<String>) -> Self {
        self.reask = reask.into();
        self
    }
}

impl Validator for MediaValidator {
    fn validate(
        &self,
        _ctx: &mut ConversationContext,
        reply: &Reply,
    ) -> Result<Validation, HandlerError> {
        match reply {
            Reply::Attachments { kind, urls } if *kind == self.kind && !urls.is_empty() => Ok(
                Validation::Accept(Value::Array(urls.iter().cloned().map(Value::String).collect())),
            ),
            _ => Ok(Validation::Reject(InvalidAnswer::new(self.reask.clone()))),
        }
    }
}

/// Name-to-implementation lookup for validators and handlers.
///
/// A new registry already contains the media validators for every
/// [`MediaKind`].
#[derive(Clone)]
pub struct HandlerRegistry {
    validators: HashMap<HandlerRef, Arc<dyn Validator>>,
    handlers: HashMap<HandlerRef, Arc<dyn ContinuationHandler>>,
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            validators: HashMap::new(),
            handlers: HashMap::new(),
        };
        for kind in MediaKind::ALL {
            registry.register_validator(HandlerRef::media(kind), MediaValidator::new(kind));
        }
        registry
    }

    /// Registers a validator, replacing any previous one with the same name.
    pub fn register_validator(
        &mut self,
        name: impl Into<HandlerRef>,
        validator: impl Validator + 'static,
    ) -> &mut Self {
        self.validators.insert(name.into(), Arc::new(validator));
        self
    }

    /// Registers a continuation handler, replacing any previous one with the
    /// same name.
    pub fn register_handler(
        &mut self,
        name: impl Into<HandlerRef>,
        handler: impl ContinuationHandler + 'static,
    ) -> &mut Self {
        self.handlers.insert(name.into(), Arc::new(handler));
        self
    }

    pub fn validator(&self, name: impl Into<HandlerRef>) -> Option<Arc<dyn Validator>> {
        self.validators.get(&name.into()).cloned()
    }

    pub fn handler(&self, name: impl Into<HandlerRef>) -> Option<Arc<dyn ContinuationHandler>> {
        self.handlers.get(&name.into()).cloned()
    }

    pub fn has_validator(&self, name: &HandlerRef) -> bool {
        self.validators.contains_key(name)
    }

    pub fn has_handler(&self, name: &HandlerRef) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut validators: Vec<&str> = self.validators.keys().map(HandlerRef::as_str).collect();
        let mut handlers: Vec<&str> = self.handlers.keys().map(HandlerRef::as_str).collect();
        validators.sort_unstable();
        handlers.sort_unstable();
        f.debug_struct("HandlerRegistry")
            .field("validators", &validators)
            .field("handlers", &handlers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SessionKey;
    use serde_json::{json, Map};

    fn ctx() -> ConversationContext {
        ConversationContext::new(SessionKey::new("test:1").unwrap(), 1, Map::new())
    }

    #[test]
    fn closures_register_as_handlers() {
        let mut registry = HandlerRegistry::new();
        registry.register_handler("double", |_: &mut ConversationContext, v: Value| -> Result<Step, HandlerError> {
            Ok(Step::Continue(json!(v.as_i64().unwrap_or(0) * 2)))
        });

        let handler = registry.handler("double").unwrap();
        assert_eq!(handler.handle(&mut ctx(), json!(4)).unwrap(), Step::Continue(json!(8)));
    }

    #[test]
    fn registering_twice_replaces() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_handler("h", |_: &mut ConversationContext, _: Value| -> Result<Step, HandlerError> {
                Ok(Step::Halt)
            })
            .register_handler("h", |_: &mut ConversationContext, v: Value| -> Result<Step, HandlerError> {
                Ok(Step::Continue(v))
            });

        assert_eq!(registry.handler_count(), 1);
        let step = registry.handler("h").unwrap().handle(&mut ctx(), json!(1)).unwrap();
        assert_eq!(step, Step::Continue(json!(1)));
    }

    #[test]
    fn unknown_names_resolve_to_none() {
        let registry = HandlerRegistry::new();
        assert!(registry.handler("missing").is_none());
        assert!(registry.validator("missing").is_none());
    }

    #[test]
    fn media_validators_are_builtin() {
        let registry = HandlerRegistry::new();
        for kind in MediaKind::ALL {
            assert!(registry.has_validator(&HandlerRef::media(kind)), "{kind}");
        }
        assert_eq!(HandlerRef::media(MediaKind::Image).as_str(), "expect:image");
    }

    #[test]
    fn media_validator_accepts_matching_attachments() {
        let validator = MediaValidator::new(MediaKind::Image);
        let reply = Reply::Attachments {
            kind: MediaKind::Image,
            urls: vec!["https://cdn/a.png".into(), "https://cdn/b.png".into()],
        };
        assert_eq!(
            validator.validate(&mut ctx(), &reply).unwrap(),
            Validation::Accept(json!(["https://cdn/a.png", "https://cdn/b.png"]))
        );
    }

    #[test]
    fn media_validator_rejects_other_replies() {
        let validator = MediaValidator::new(MediaKind::Video).with_reask("Video please");
        let wrong_kind = Reply::Attachments {
            kind: MediaKind::Image,
            urls: vec!["https://cdn/a.png".into()],
        };
        for reply in [Reply::text("here"), wrong_kind] {
            match validator.validate(&mut ctx(), &reply).unwrap() {
                Validation::Reject(invalid) => assert_eq!(invalid.ask_text(), "Video please"),
                other => panic!("expected rejection, got {other:?}"),
            }
        }
    }

    #[test]
    fn handler_ref_serializes_as_name() {
        let json = serde_json::to_value(HandlerRef::from("store_age")).unwrap();
        assert_eq!(json, json!("store_age"));
    }

    #[test]
    fn handler_error_displays_message() {
        assert_eq!(HandlerError::new("boom").to_string(), "boom");
    }
}
