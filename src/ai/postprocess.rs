use serde::Serialize;

use super::{GenerationResult, Mode, Suggestion};
use crate::chat::GenerationSettings;

pub const SPICY_DISABLED_NOTICE: &str = "Spicy mode disabled for safety (disinterest detected).";

/// What the caller should do with a parsed generation result.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Applied {
    /// Suggestions in backend order, untouched.
    pub suggestions: Vec<Suggestion>,
    /// Settings to write back to the stored thread, if any.
    pub settings_update: Option<GenerationSettings>,
    /// One-time message to show the user alongside the update.
    pub notice: Option<&'static str>,
}

/// Interpret the backend's mode against the *stored* settings.
///
/// Closure mode while spicy mode is on means the model itself confirmed the
/// other person is not interested: spicy mode is switched off for good.
/// Only `spicy_mode` changes; `intent` stays as the user set it.
pub fn apply(result: &GenerationResult, current: &GenerationSettings) -> Applied {
    let (settings_update, notice) = if result.mode == Mode::Closure && current.spicy_mode {
        let updated = GenerationSettings {
            spicy_mode: false,
            ..current.clone()
        };
        (Some(updated), Some(SPICY_DISABLED_NOTICE))
    } else {
        (None, None)
    };

    Applied {
        suggestions: result.suggestions.clone(),
        settings_update,
        notice,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AvoidItem;
    use crate::chat::Intent;

    fn result(mode: Mode) -> GenerationResult {
        GenerationResult {
            mode,
            detected_language: "en".into(),
            safety_flags: Default::default(),
            suggestions: vec![
                Suggestion {
                    label: "Safe".into(),
                    text: "hey, how's it going?".into(),
                },
                Suggestion {
                    label: "Bold".into(),
                    text: "you owe me a drink".into(),
                },
            ],
            avoid: Some(vec![AvoidItem {
                text: "k".into(),
                reason: "dry".into(),
            }]),
        }
    }

    #[test]
    fn suggestions_pass_through_in_order() {
        let r = result(Mode::Normal);
        let applied = apply(&r, &GenerationSettings::default());
        assert_eq!(applied.suggestions, r.suggestions);
        assert!(applied.settings_update.is_none());
        assert!(applied.notice.is_none());
    }

    #[test]
    fn closure_with_spicy_turns_it_off() {
        let stored = GenerationSettings {
            spicy_mode: true,
            intent: Intent::Compliment,
            ..Default::default()
        };
        let applied = apply(&result(Mode::Closure), &stored);
        let update = applied.settings_update.unwrap();
        assert!(!update.spicy_mode);
        assert_eq!(update.intent, Intent::Compliment);
        assert_eq!(applied.notice, Some(SPICY_DISABLED_NOTICE));
    }

    #[test]
    fn no_update_when_spicy_already_off() {
        for mode in [Mode::Normal, Mode::Closure] {
            let applied = apply(&result(mode), &GenerationSettings::default());
            assert!(applied.settings_update.is_none());
            assert!(applied.notice.is_none());
        }
    }

    #[test]
    fn avoid_items_are_never_suggestions() {
        let applied = apply(&result(Mode::Normal), &GenerationSettings::default());
        assert!(applied.suggestions.iter().all(|s| s.text != "k"));
    }
}
