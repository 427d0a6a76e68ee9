//! Application layer - the conversation engine.
//!
//! Orchestrates the domain and the ports: the host asks questions and
//! resumes pending ones, continuations validate replies and run their
//! handler chains.

mod continuation;
mod errors;
mod host;
mod policy;
mod validation;

pub use continuation::{QuestionContinuation, Resolution};
pub use errors::ConversationError;
pub use host::ConversationHost;
pub use policy::{HandoverOffer, NoHandover, ThresholdHandover, ValidationPolicy};
pub use validation::{ValidationCoordinator, Verdict};
