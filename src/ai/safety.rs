//! Pre-emptive disinterest override.
//!
//! Looks at the most recent messages from the other person and, when any of
//! them reads like a refusal, downgrades the request to a polite close. The
//! override only applies to the request being built; stored preferences are
//! untouched.
//!
//! Matching is a plain case-insensitive substring scan, so words that merely
//! contain a keyword ("nonstop", "know") also trigger it. Known false
//! positives, kept as-is.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::chat::{GenerationSettings, Intent, Speaker, Transcript};

pub const DISINTEREST_KEYWORDS: [&str; 7] = [
    "stop",
    "no",
    "not interested",
    "leave me alone",
    "don't text",
    "dont text",
    "block",
];

/// How many of the other person's latest messages are inspected.
pub const RECENT_THEM_TURNS: usize = 3;

static DISINTEREST_RE: Lazy<Regex> = Lazy::new(|| {
    let alternation = DISINTEREST_KEYWORDS
        .iter()
        .map(|kw| regex::escape(kw))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i){alternation}")).expect("keyword pattern is valid")
});

/// Decides whether the conversation shows the other person pulling away.
pub trait DisinterestPolicy: Send + Sync {
    fn detects_disinterest(&self, transcript: &Transcript) -> bool;

    fn evaluate(&self, transcript: &Transcript, settings: &GenerationSettings) -> GenerationSettings {
        let mut effective = settings.clone();
        if self.detects_disinterest(transcript) {
            effective.spicy_mode = false;
            effective.intent = Intent::ClosePolitely;
        }
        effective
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordPolicy;

impl DisinterestPolicy for KeywordPolicy {
    fn detects_disinterest(&self, transcript: &Transcript) -> bool {
        transcript
            .iter()
            .rev()
            .filter(|t| t.speaker == Speaker::Them)
            .take(RECENT_THEM_TURNS)
            .any(|t| DISINTEREST_RE.is_match(&t.text))
    }
}

/// Effective settings for one request under the default keyword policy.
pub fn evaluate(transcript: &Transcript, settings: &GenerationSettings) -> GenerationSettings {
    KeywordPolicy.evaluate(transcript, settings)
}
