//! Persisted pending-question record.
//!
//! This is everything a later turn needs to resume a question: what was asked,
//! which validator and handlers to run, the attempt counter and the offered
//! suggestion. It never carries a reference to a live host.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::foundation::{QuestionId, SessionKey, Timestamp};

use super::handler::HandlerRef;
use super::question::{Parameters, Question};

/// Durable state of a question awaiting its reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingState {
    pub question_id: QuestionId,
    pub session: SessionKey,
    pub question: Question,
    #[serde(default)]
    pub parameters: Parameters,
    #[serde(default)]
    pub validator: Option<HandlerRef>,
    #[serde(default)]
    pub handlers: Vec<HandlerRef>,
    pub attempt: u32,
    #[serde(default)]
    pub suggested: Option<Value>,
    #[serde(default)]
    pub memory: Map<String, Value>,
    pub asked_at: Timestamp,
}

impl PendingState {
    /// Creates the state of a freshly asked question (attempt 1, no suggestion).
    pub fn new(session: SessionKey, question: Question, parameters: Parameters) -> Self {
        Self {
            question_id: QuestionId::new(),
            session,
            question,
            parameters,
            validator: None,
            handlers: Vec::new(),
            attempt: 1,
            suggested: None,
            memory: Map::new(),
            asked_at: Timestamp::now(),
        }
    }

    /// State for a re-ask of this question with an amended prompt.
    ///
    /// Keeps the validator, handlers, parameters and memory; bumps the attempt
    /// and records the new suggestion.
    pub fn reasked(&self, question: Question, suggested: Option<Value>) -> Self {
        Self {
            question_id: QuestionId::new(),
            session: self.session.clone(),
            question,
            parameters: self.parameters.clone(),
            validator: self.validator.clone(),
            handlers: self.handlers.clone(),
            attempt: self.attempt.saturating_add(1),
            suggested,
            memory: self.memory.clone(),
            asked_at: Timestamp::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state() -> PendingState {
        let mut state = PendingState::new(
            SessionKey::new("test:1").unwrap(),
            Question::new("How old are you?"),
            Parameters::new(),
        );
        state.validator = Some(HandlerRef::from("age"));
        state.handlers = vec![HandlerRef::from("store"), HandlerRef::from("thank")];
        state.memory.insert("name".into(), json!("Ada"));
        state
    }

    #[test]
    fn new_state_starts_at_first_attempt() {
        let state = state();
        assert_eq!(state.attempt, 1);
        assert!(state.suggested.is_none());
    }

    #[test]
    fn reask_carries_chain_forward() {
        let original = state();
        let reasked = original.reasked(Question::new("Try 21"), Some(json!(21)));

        assert_eq!(reasked.attempt, 2);
        assert_eq!(reasked.suggested, Some(json!(21)));
        assert_eq!(reasked.validator, original.validator);
        assert_eq!(reasked.handlers, original.handlers);
        assert_eq!(reasked.memory, original.memory);
        assert_eq!(reasked.question.text(), "Try 21");
        assert_ne!(reasked.question_id, original.question_id);
    }

    #[test]
    fn serde_round_trip_preserves_state() {
        let mut original = state();
        original.suggested = Some(json!({"value": 21}));
        original.parameters.insert("parse_mode".into(), json!("markdown"));

        let json = serde_json::to_string(&original).unwrap();
        let restored: PendingState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn optional_fields_default_when_missing() {
        let json = json!({
            "question_id": QuestionId::new(),
            "session": "test:1",
            "question": {"text": "Hi?"},
            "attempt": 3,
            "asked_at": Timestamp::now(),
        });
        let state: PendingState = serde_json::from_value(json).unwrap();
        assert_eq!(state.attempt, 3);
        assert!(state.handlers.is_empty());
        assert!(state.validator.is_none());
        assert!(state.memory.is_empty());
    }
}
