//! Conversation behaviour configuration
//!
//! Affirmative words and the handover policy are configuration, so they can
//! be localized or tuned without touching the engine.

use serde::Deserialize;

use crate::domain::conversation::DEFAULT_AFFIRMATIVE_WORDS;

use super::error::ValidationError;

/// Conversation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationConfig {
    /// Words accepted as "yes" to an offered suggestion
    #[serde(default = "default_affirmative_words")]
    pub affirmative_words: Vec<String>,

    /// Reply text reserved for "hand me over to a human"
    #[serde(default = "default_handover_sentinel")]
    pub handover_sentinel: String,

    /// Re-asks beyond this attempt number offer a handover
    #[serde(default = "default_handover_threshold")]
    pub handover_threshold: u32,

    /// Where handovers are routed; no target means no handover offer
    #[serde(default)]
    pub handover_target: Option<String>,

    /// Label of the handover button
    #[serde(default = "default_handover_offer_text")]
    pub handover_offer_text: String,
}

impl ConversationConfig {
    /// Validate conversation configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.affirmative_words.iter().all(|w| w.trim().is_empty()) {
            return Err(ValidationError::NoAffirmativeWords);
        }
        if self.handover_sentinel.trim().is_empty() {
            return Err(ValidationError::MissingRequired("HANDOVER_SENTINEL"));
        }
        if self.handover_target.is_some() && self.handover_offer_text.trim().is_empty() {
            return Err(ValidationError::MissingRequired("HANDOVER_OFFER_TEXT"));
        }
        Ok(())
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            affirmative_words: default_affirmative_words(),
            handover_sentinel: default_handover_sentinel(),
            handover_threshold: default_handover_threshold(),
            handover_target: None,
            handover_offer_text: default_handover_offer_text(),
        }
    }
}

fn default_affirmative_words() -> Vec<String> {
    DEFAULT_AFFIRMATIVE_WORDS.iter().map(|w| w.to_string()).collect()
}

fn default_handover_sentinel() -> String {
    "__handover__".to_string()
}

fn default_handover_threshold() -> u32 {
    2
}

fn default_handover_offer_text() -> String {
    "Talk to a person".to_string()
}
