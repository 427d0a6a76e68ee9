//! Invalid-answer descriptor returned by validators that reject a reply.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::question::{Button, Question};

/// A one-click correction offered with a re-ask.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Label shown on the affirmative control.
    pub text: String,
    /// Value substituted when the user affirms.
    pub value: Value,
}

/// Describes how to re-ask after a rejected reply.
///
/// # Example
///
/// ```
/// use question_flow::domain::conversation::InvalidAnswer;
/// use serde_json::json;
///
/// let invalid = InvalidAnswer::new("That is not a valid age. Did you mean 21?")
///     .suggest_value("21", 21);
///
/// assert_eq!(invalid.suggestion_value(), Some(&json!(21)));
/// assert_eq!(invalid.to_question().buttons().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvalidAnswer {
    ask: String,
    suggestion: Option<Suggestion>,
}

impl InvalidAnswer {
    /// Creates a descriptor with the given re-ask prompt.
    pub fn new(ask: impl Into<String>) -> Self {
        Self {
            ask: ask.into(),
            suggestion: None,
        }
    }

    /// Replaces the re-ask prompt.
    pub fn ask(mut self, text: impl Into<String>) -> Self {
        self.ask = text.into();
        self
    }

    /// Offers a one-click suggestion whose value is its own text.
    pub fn suggest(self, text: impl Into<String>) -> Self {
        let text = text.into();
        let value = Value::String(text.clone());
        self.suggest_value(text, value)
    }

    /// Offers a one-click suggestion with an explicit value.
    pub fn suggest_value(mut self, text: impl Into<String>, value: impl Into<Value>) -> Self {
        self.suggestion = Some(Suggestion {
            text: text.into(),
            value: value.into(),
        });
        self
    }

    pub fn ask_text(&self) -> &str {
        &self.ask
    }

    pub fn suggestion(&self) -> Option<&Suggestion> {
        self.suggestion.as_ref()
    }

    pub fn suggestion_text(&self) -> Option<&str> {
        self.suggestion.as_ref().map(|s| s.text.as_str())
    }

    pub fn suggestion_value(&self) -> Option<&Value> {
        self.suggestion.as_ref().map(|s| &s.value)
    }

    /// Renders the re-ask prompt: bare text, or text plus a single
    /// affirmative button carrying the suggestion.
    pub fn to_question(&self) -> Question {
        let question = Question::new(self.ask.clone());
        match &self.suggestion {
            Some(suggestion) => {
                question.with_button(Button::new(suggestion.text.clone(), suggestion.value.clone()))
            }
            None => question,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn bare_prompt_renders_plain_question() {
        let q = InvalidAnswer::new("Try again").to_question();
        assert!(q.is_plain());
        assert_eq!(q.text(), "Try again");
    }

    #[test]
    fn suggestion_renders_single_button() {
        let q = InvalidAnswer::new("Try 21").suggest_value("21", 21).to_question();
        assert_eq!(q.buttons().len(), 1);
        assert_eq!(q.buttons()[0].text, "21");
        assert_eq!(q.buttons()[0].value, json!(21));
    }

    #[test]
    fn ask_overwrites_prompt() {
        let invalid = InvalidAnswer::new("first").ask("second");
        assert_eq!(invalid.ask_text(), "second");
    }

    #[test]
    fn later_suggestion_replaces_earlier() {
        let invalid = InvalidAnswer::new("?").suggest("a").suggest_value("b", 2);
        assert_eq!(invalid.suggestion_text(), Some("b"));
        assert_eq!(invalid.suggestion_value(), Some(&json!(2)));
    }

    #[test]
    fn default_has_no_suggestion() {
        let invalid = InvalidAnswer::default();
        assert_eq!(invalid.ask_text(), "");
        assert!(invalid.suggestion().is_none());
    }

    proptest! {
        #[test]
        fn suggestion_value_defaults_to_text(text in "\\PC{1,24}") {
            let invalid = InvalidAnswer::new("Did you mean?").suggest(text.clone());
            prop_assert_eq!(invalid.suggestion_value(), Some(&Value::String(text.clone())));
            prop_assert_eq!(invalid.suggestion_text(), Some(text.as_str()));
        }
    }
}
