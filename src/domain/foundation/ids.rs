//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Identity of a chat conversation (platform + channel + user, as the
/// transport chooses to encode it).
///
/// Pending question state is keyed by this value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionKey(String);

impl SessionKey {
    /// Creates a session key, rejecting blank input.
    pub fn new(key: impl Into<String>) -> Result<Self, ValidationError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ValidationError::empty_field("session_key"));
        }
        Ok(Self(key))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Unique identifier for one asked question.
///
/// Every ask, re-ask and follow-up gets a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(Uuid);

impl QuestionId {
    /// Creates a new random QuestionId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a QuestionId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for QuestionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for QuestionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_key_accepts_platform_identity() {
        let key = SessionKey::new("telegram:42").unwrap();
        assert_eq!(key.as_str(), "telegram:42");
        assert_eq!(key.to_string(), "telegram:42");
    }

    #[test]
    fn session_key_rejects_blank() {
        assert!(SessionKey::new("").is_err());
        assert!(SessionKey::new("   ").is_err());
        assert!("".parse::<SessionKey>().is_err());
    }

    #[test]
    fn session_key_serializes_transparently() {
        let key = SessionKey::new("slack:C1:U2").unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"slack:C1:U2\"");
    }

    #[test]
    fn question_ids_are_unique() {
        assert_ne!(QuestionId::new(), QuestionId::new());
    }

    #[test]
    fn question_id_round_trips_through_string() {
        let id = QuestionId::new();
        let parsed: QuestionId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }
}
