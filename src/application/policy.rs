//! Validation policy: affirmative matching and the handover extension point.

use std::fmt;
use std::sync::Arc;

use crate::config::ConversationConfig;
use crate::domain::conversation::{AffirmativeMatcher, Button, Question, Reply};

/// Extension point that may add a handover offer to a re-ask prompt.
pub trait HandoverOffer: Send + Sync {
    /// Returns the prompt to send for a re-ask of a question that has been
    /// rejected `attempt` times.
    fn augment(&self, prompt: Question, attempt: u32) -> Question;
}

/// Never offers a handover.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHandover;

impl HandoverOffer for NoHandover {
    fn augment(&self, prompt: Question, _attempt: u32) -> Question {
        prompt
    }
}

/// Offers a handover button once the attempt number exceeds a threshold.
///
/// Without a target the prompt is returned unchanged.
#[derive(Debug, Clone)]
pub struct ThresholdHandover {
    threshold: u32,
    target: Option<String>,
    offer_text: String,
    sentinel: String,
}

impl ThresholdHandover {
    pub fn new(
        threshold: u32,
        target: Option<String>,
        offer_text: impl Into<String>,
        sentinel: impl Into<String>,
    ) -> Self {
        Self {
            threshold,
            target,
            offer_text: offer_text.into(),
            sentinel: sentinel.into(),
        }
    }

    pub fn from_config(config: &ConversationConfig) -> Self {
        Self::new(
            config.handover_threshold,
            config.handover_target.clone(),
            config.handover_offer_text.clone(),
            config.handover_sentinel.clone(),
        )
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }
}

impl HandoverOffer for ThresholdHandover {
    fn augment(&self, prompt: Question, attempt: u32) -> Question {
        match &self.target {
            Some(target) if attempt > self.threshold => {
                tracing::debug!(attempt, target = %target, "Offering handover on re-ask");
                prompt.with_button(Button::new(self.offer_text.clone(), self.sentinel.clone()))
            }
            _ => prompt,
        }
    }
}

/// Everything the validation coordinator needs besides the validator itself.
#[derive(Clone)]
pub struct ValidationPolicy {
    matcher: AffirmativeMatcher,
    handover_sentinel: String,
    handover: Arc<dyn HandoverOffer>,
}

impl ValidationPolicy {
    pub fn new(
        matcher: AffirmativeMatcher,
        handover_sentinel: impl Into<String>,
        handover: Arc<dyn HandoverOffer>,
    ) -> Self {
        Self {
            matcher,
            handover_sentinel: handover_sentinel.into(),
            handover,
        }
    }

    /// Builds the policy from configuration, using [`ThresholdHandover`].
    pub fn from_config(config: &ConversationConfig) -> Self {
        Self::new(
            AffirmativeMatcher::new(&config.affirmative_words),
            config.handover_sentinel.clone(),
            Arc::new(ThresholdHandover::from_config(config)),
        )
    }

    /// Replaces the handover extension.
    pub fn with_handover(mut self, handover: Arc<dyn HandoverOffer>) -> Self {
        self.handover = handover;
        self
    }

    pub fn matcher(&self) -> &AffirmativeMatcher {
        &self.matcher
    }

    pub fn is_affirmative(&self, reply: &Reply) -> bool {
        self.matcher.is_affirmative(reply)
    }

    /// Returns true when the reply asks for a human.
    pub fn is_handover_request(&self, reply: &Reply) -> bool {
        match reply {
            Reply::Handover => true,
            other => other.as_text() == Some(self.handover_sentinel.as_str()),
        }
    }

    pub fn offer_handover(&self, prompt: Question, attempt: u32) -> Question {
        self.handover.augment(prompt, attempt)
    }
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self::from_config(&ConversationConfig::default())
    }
}

impl fmt::Debug for ValidationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationPolicy")
            .field("matcher", &self.matcher)
            .field("handover_sentinel", &self.handover_sentinel)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config_with_target() -> ConversationConfig {
        ConversationConfig {
            handover_target: Some("support".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn handover_request_by_variant_or_sentinel() {
        let policy = ValidationPolicy::default();
        assert!(policy.is_handover_request(&Reply::Handover));
        assert!(policy.is_handover_request(&Reply::text("__handover__")));
        assert!(policy.is_handover_request(&Reply::Payload(json!("__handover__"))));
        assert!(!policy.is_handover_request(&Reply::text("human please")));
    }

    #[test]
    fn no_target_leaves_prompt_unchanged() {
        let policy = ValidationPolicy::default();
        let prompt = policy.offer_handover(Question::new("Try again"), 10);
        assert!(prompt.is_plain());
    }

    #[test]
    fn target_adds_offer_only_past_threshold() {
        let handover = ThresholdHandover::from_config(&config_with_target());

        assert!(handover.augment(Question::new("?"), 2).is_plain());

        let offered = handover.augment(Question::new("?"), 3);
        assert_eq!(offered.buttons().len(), 1);
        assert_eq!(offered.buttons()[0].text, "Talk to a person");
        assert_eq!(offered.buttons()[0].value, json!("__handover__"));
    }

    #[test]
    fn configured_words_drive_matching() {
        let config = ConversationConfig {
            affirmative_words: vec!["ja".to_string()],
            ..Default::default()
        };
        let policy = ValidationPolicy::from_config(&config);
        assert!(policy.is_affirmative(&Reply::text("Ja")));
        assert!(!policy.is_affirmative(&Reply::text("yes")));
    }

    #[test]
    fn handover_extension_can_be_replaced() {
        struct Always;
        impl HandoverOffer for Always {
            fn augment(&self, prompt: Question, _attempt: u32) -> Question {
                prompt.with_button(Button::new("Human", "__handover__"))
            }
        }

        let policy = ValidationPolicy::default().with_handover(Arc::new(Always));
        assert!(!policy.offer_handover(Question::new("?"), 1).is_plain());
        let policy = policy.with_handover(Arc::new(NoHandover));
        assert!(policy.offer_handover(Question::new("?"), 9).is_plain());
    }
}
