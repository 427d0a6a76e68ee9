//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `conversation` - Questions, replies, validators, handlers and the
//!   persisted pending-question record

pub mod conversation;
pub mod foundation;
