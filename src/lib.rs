//! Question Flow - persistable question continuations for chat conversations.
//!
//! A conversation asks a question, suspends until the reply arrives (usually in
//! a later process invocation), validates the reply with retry-and-suggestion
//! semantics and then runs a chain of named follow-up handlers on the accepted
//! value.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
