//! Affirmative-answer matcher.
//!
//! Decides whether a reply counts as "yes" to a previously offered suggestion.

use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashSet;

use super::reply::Reply;

/// Words accepted as affirmative when no configuration overrides them.
pub const DEFAULT_AFFIRMATIVE_WORDS: [&str; 5] = ["yes", "y", "yep", "yup", "ok"];

static DEFAULT_MATCHER: Lazy<AffirmativeMatcher> =
    Lazy::new(|| AffirmativeMatcher::new(DEFAULT_AFFIRMATIVE_WORDS));

/// Matches the first whitespace-delimited token of a reply against a fixed set
/// of case-folded words. A structured `true` is always affirmative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffirmativeMatcher {
    words: HashSet<String>,
}

impl AffirmativeMatcher {
    /// Creates a matcher for the given words. Words are case-folded and
    /// blank entries are ignored.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// Returns a shared matcher using [`DEFAULT_AFFIRMATIVE_WORDS`].
    pub fn default_words() -> &'static AffirmativeMatcher {
        &DEFAULT_MATCHER
    }

    /// Returns a new matcher that also accepts `extra` words.
    pub fn extended_with<I, S>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words = self.words.clone();
        words.extend(
            extra
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty()),
        );
        Self { words }
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    /// Returns true when the reply affirms.
    pub fn is_affirmative(&self, reply: &Reply) -> bool {
        match reply {
            Reply::Confirmed(flag) => *flag,
            Reply::Payload(Value::Bool(flag)) => *flag,
            other => other
                .as_text()
                .map(|text| self.matches_text(text))
                .unwrap_or(false),
        }
    }

    /// Returns true when the first token of `text` is an accepted word.
    pub fn matches_text(&self, text: &str) -> bool {
        match text.split_whitespace().next() {
            Some(token) => self.words.contains(&token.to_lowercase()),
            None => false,
        }
    }
}

impl Default for AffirmativeMatcher {
    fn default() -> Self {
        DEFAULT_MATCHER.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn accepts_default_words_case_insensitively() {
        let matcher = AffirmativeMatcher::default();
        for reply in ["yes", "YES", "Yep", "y", "yup", "Ok"] {
            assert!(matcher.is_affirmative(&Reply::text(reply)), "{reply}");
        }
    }

    #[test]
    fn only_first_token_counts() {
        let matcher = AffirmativeMatcher::default();
        assert!(matcher.is_affirmative(&Reply::text("  yes please")));
        assert!(!matcher.is_affirmative(&Reply::text("well, yes")));
        assert!(!matcher.is_affirmative(&Reply::text("yesterday")));
    }

    #[test]
    fn blank_and_non_text_replies_are_not_affirmative() {
        let matcher = AffirmativeMatcher::default();
        assert!(!matcher.is_affirmative(&Reply::text("")));
        assert!(!matcher.is_affirmative(&Reply::text("   \t\n")));
        assert!(!matcher.is_affirmative(&Reply::Payload(json!(1))));
        assert!(!matcher.is_affirmative(&Reply::Handover));
    }

    #[test]
    fn structured_true_is_affirmative() {
        let matcher = AffirmativeMatcher::default();
        assert!(matcher.is_affirmative(&Reply::Confirmed(true)));
        assert!(matcher.is_affirmative(&Reply::Payload(json!(true))));
        assert!(!matcher.is_affirmative(&Reply::Confirmed(false)));
    }

    #[test]
    fn custom_words_replace_defaults() {
        let matcher = AffirmativeMatcher::new(["ja", "oui", " "]);
        assert!(matcher.is_affirmative(&Reply::text("Oui")));
        assert!(!matcher.is_affirmative(&Reply::text("yes")));
        assert_eq!(matcher.words().count(), 2);
    }

    #[test]
    fn extended_matcher_keeps_base_words() {
        let matcher = AffirmativeMatcher::default().extended_with(["si"]);
        assert!(matcher.is_affirmative(&Reply::text("si")));
        assert!(matcher.is_affirmative(&Reply::text("yes")));
    }

    proptest! {
        #[test]
        fn affirmative_word_with_any_tail_matches(
            word in prop::sample::select(DEFAULT_AFFIRMATIVE_WORDS.to_vec()),
            upper in any::<bool>(),
            tail in "( [a-z]{0,8}){0,3}",
        ) {
            let token = if upper { word.to_uppercase() } else { word.to_string() };
            let reply = Reply::text(format!("{token}{tail}"));
            prop_assert!(AffirmativeMatcher::default().is_affirmative(&reply));
        }

        #[test]
        fn first_token_outside_set_never_matches(token in "[a-z]{2,10}") {
            prop_assume!(!DEFAULT_AFFIRMATIVE_WORDS.contains(&token.as_str()));
            let reply = Reply::text(format!("{token} yes"));
            prop_assert!(!AffirmativeMatcher::default().is_affirmative(&reply));
        }
    }
}
