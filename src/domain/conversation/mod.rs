//! Conversation domain module.
//!
//! Questions and replies, the invalid-answer descriptor, the affirmative
//! matcher, validator/handler traits with their registry, and the persisted
//! pending-question record.

mod affirmative;
mod context;
mod handler;
mod invalid_answer;
mod pending;
mod question;
mod reply;

pub use affirmative::{AffirmativeMatcher, DEFAULT_AFFIRMATIVE_WORDS};
pub use context::{ConversationContext, FollowUp, Outgoing};
pub use handler::{
    ContinuationHandler, HandlerError, HandlerRef, HandlerRegistry, MediaValidator, Step,
    Validation, Validator,
};
pub use invalid_answer::{InvalidAnswer, Suggestion};
pub use pending::PendingState;
pub use question::{Button, Parameters, Question, EXPECTS_PARAMETER};
pub use reply::{MediaKind, Reply};
