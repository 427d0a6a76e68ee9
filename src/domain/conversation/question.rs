//! Question content sent to the user.
//!
//! A question is either plain text or text with one-click buttons. How buttons
//! are rendered is up to the transport; this type only carries the content.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque parameters handed to the transport alongside a question.
///
/// Used for platform formatting hints and for internal markers set by the
/// specialized ask variants (see [`EXPECTS_PARAMETER`]).
pub type Parameters = Map<String, Value>;

/// Parameter key marking which media kind a question expects as its reply.
pub const EXPECTS_PARAMETER: &str = "expects";

/// A one-click control attached to a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Button {
    /// Label shown to the user.
    pub text: String,
    /// Value delivered back when the button is pressed.
    pub value: Value,
}

impl Button {
    /// Creates a button with an explicit value.
    pub fn new(text: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            text: text.into(),
            value: value.into(),
        }
    }
}

/// Prompt content: text plus zero or more buttons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    buttons: Vec<Button>,
}

impl Question {
    /// Creates a plain-text question.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            buttons: Vec::new(),
        }
    }

    /// Appends a button.
    pub fn with_button(mut self, button: Button) -> Self {
        self.buttons.push(button);
        self
    }

    /// Appends several buttons, preserving order.
    pub fn with_buttons(mut self, buttons: impl IntoIterator<Item = Button>) -> Self {
        self.buttons.extend(buttons);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    /// Returns true when the question has no buttons.
    pub fn is_plain(&self) -> bool {
        self.buttons.is_empty()
    }
}

impl From<&str> for Question {
    fn from(text: &str) -> Self {
        Question::new(text)
    }
}

impl From<String> for Question {
    fn from(text: String) -> Self {
        Question::new(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_question_has_no_buttons() {
        let q = Question::new("How old are you?");
        assert!(q.is_plain());
        assert_eq!(q.text(), "How old are you?");
    }

    #[test]
    fn buttons_keep_insertion_order() {
        let q = Question::new("Pick one")
            .with_button(Button::new("Red", "red"))
            .with_buttons([Button::new("Green", "green"), Button::new("Blue", "blue")]);

        let labels: Vec<&str> = q.buttons().iter().map(|b| b.text.as_str()).collect();
        assert_eq!(labels, vec!["Red", "Green", "Blue"]);
        assert!(!q.is_plain());
    }

    #[test]
    fn plain_question_omits_buttons_when_serialized() {
        let q = Question::new("Hi");
        assert_eq!(serde_json::to_value(&q).unwrap(), json!({"text": "Hi"}));
    }

    #[test]
    fn question_without_buttons_field_deserializes() {
        let q: Question = serde_json::from_value(json!({"text": "Hi"})).unwrap();
        assert!(q.is_plain());
    }

    #[test]
    fn button_value_can_be_structured() {
        let b = Button::new("21", 21);
        assert_eq!(b.value, json!(21));
    }
}
