//! Incoming replies.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Kind of media a reply carries or a question expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Location,
    File,
}

impl MediaKind {
    /// All media kinds, in declaration order.
    pub const ALL: [MediaKind; 5] = [
        MediaKind::Image,
        MediaKind::Video,
        MediaKind::Audio,
        MediaKind::Location,
        MediaKind::File,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Location => "location",
            MediaKind::File => "file",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A reply delivered by the transport for a pending question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Reply {
    /// Free text typed by the user.
    Text(String),
    /// Structured yes/no, e.g. a confirmation button.
    Confirmed(bool),
    /// Structured payload, e.g. the value of a pressed button.
    Payload(Value),
    /// One or more media attachments.
    Attachments { kind: MediaKind, urls: Vec<String> },
    /// Explicit request to be handed over to a human.
    Handover,
}

impl Reply {
    /// Creates a text reply.
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text(text.into())
    }

    /// Returns the textual content, if the reply carries any.
    ///
    /// String payloads count as text so that button values round-trip.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Reply::Text(text) => Some(text),
            Reply::Payload(Value::String(text)) => Some(text),
            _ => None,
        }
    }

    /// Converts the reply into the value handed to the continuation chain
    /// when no validator is installed.
    pub fn into_value(self) -> Value {
        match self {
            Reply::Text(text) => Value::String(text),
            Reply::Confirmed(flag) => Value::Bool(flag),
            Reply::Payload(value) => value,
            Reply::Attachments { kind, urls } => json!({ "kind": kind, "urls": urls }),
            Reply::Handover => Value::Null,
        }
    }
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Reply::text(text)
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Reply::Text(text)
    }
}

impl From<bool> for Reply {
    fn from(flag: bool) -> Self {
        Reply::Confirmed(flag)
    }
}
