//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types shared by the
//! conversation domain.

mod errors;
mod ids;
mod timestamp;

pub use errors::ValidationError;
pub use ids::{QuestionId, SessionKey};
pub use timestamp::Timestamp;
