//! Validation coordinator.
//!
//! Decides what a reply means for a pending question: a value for the
//! continuation chain, a re-ask, or a request for a human. It performs no I/O;
//! the continuation acts on the verdict.

use serde_json::Value;

use crate::domain::conversation::{
    ConversationContext, HandlerRegistry, PendingState, Question, Reply, Validation,
};

use super::errors::ConversationError;
use super::policy::ValidationPolicy;

/// What the coordinator decided about a reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Run the continuation chain with this value.
    Accepted(Value),
    /// Ask again with this prompt, offering `suggested` as the shortcut.
    Reask {
        prompt: Question,
        suggested: Option<Value>,
    },
    /// The user asked for a human; stop without running anything.
    HandedOver,
}

pub struct ValidationCoordinator<'a> {
    registry: &'a HandlerRegistry,
    policy: &'a ValidationPolicy,
}

impl<'a> ValidationCoordinator<'a> {
    pub fn new(registry: &'a HandlerRegistry, policy: &'a ValidationPolicy) -> Self {
        Self { registry, policy }
    }

    /// Judges `reply` against the validator and suggestion recorded in `state`.
    ///
    /// A question without a validator accepts the reply as is. Validator
    /// failures propagate unchanged.
    pub fn validate(
        &self,
        ctx: &mut ConversationContext,
        state: &PendingState,
        reply: &Reply,
    ) -> Result<Verdict, ConversationError> {
        if self.policy.is_handover_request(reply) {
            return Ok(Verdict::HandedOver);
        }

        let Some(name) = &state.validator else {
            return Ok(Verdict::Accepted(reply.clone().into_value()));
        };
        let validator =
            self.registry
                .validator(name.clone())
                .ok_or_else(|| ConversationError::UnknownHandler {
                    kind: "validator",
                    name: name.clone(),
                })?;

        let validation =
            validator
                .validate(ctx, reply)
                .map_err(|source| ConversationError::Handler {
                    name: name.clone(),
                    session: state.session.clone(),
                    source,
                })?;

        match validation {
            Validation::Accept(value) => Ok(Verdict::Accepted(value)),
            Validation::Reject(invalid) => {
                if let Some(suggested) = &state.suggested {
                    let clicked = matches!(reply, Reply::Payload(value) if value == suggested);
                    if clicked || self.policy.is_affirmative(reply) {
                        tracing::debug!(
                            session = %state.session,
                            "Affirmative reply accepted the offered suggestion"
                        );
                        return Ok(Verdict::Accepted(suggested.clone()));
                    }
                }

                let prompt = self
                    .policy
                    .offer_handover(invalid.to_question(), state.attempt);
                Ok(Verdict::Reask {
                    prompt,
                    suggested: invalid.suggestion_value().cloned(),
                })
            }
        }
    }
}
