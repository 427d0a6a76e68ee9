//! Transport adapters.
//!
//! Platform drivers live outside this crate; the recording transport here is
//! for tests and local development.

mod recording;

pub use recording::{RecordingTransport, SentMessage};
