use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{GREETING_PHRASES, GREETING_RESPONSE, IDENTITY_PHRASES, IDENTITY_RESPONSE};

/// Conversational intents answered locally without a provider round trip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalIntent {
    Greeting,
    Identity,
}

impl LocalIntent {
    /// Fixed answer for this intent
    pub fn response(&self) -> &'static str {
        match self {
            Self::Greeting => GREETING_RESPONSE,
            Self::Identity => IDENTITY_RESPONSE,
        }
    }
}

// Any greeting phrase standing as whole words ("hi" never matches inside "this")
static GREETING: Lazy<Regex> = Lazy::new(|| {
    let alternatives = GREETING_PHRASES
        .iter()
        .map(|phrase| regex::escape(phrase))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives))
        .expect("greeting pattern is built from escaped literals")
});

/// Match a prompt against the local intents
///
/// Both intents match by case-insensitive containment; greetings must stand
/// as whole words. Identity wins when a prompt carries both.
pub fn detect(prompt: &str) -> Option<LocalIntent> {
    let lower = prompt.to_lowercase();
    if IDENTITY_PHRASES.iter().any(|phrase| lower.contains(phrase)) {
        return Some(LocalIntent::Identity);
    }
    if GREETING.is_match(prompt) {
        return Some(LocalIntent::Greeting);
    }
    None
}
