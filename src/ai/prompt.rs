use serde::Serialize;

use crate::chat::{GenerationSettings, Speaker, Transcript};

pub const GENERATION_SYSTEM_PROMPT: &str = "\
You are a \"Rizz AI\" assistant. Your goal is to generate reply suggestions for dating/social \
contexts that sound like a real, cool person, not a customer service bot.

CORE RULES:
1. Be Conversational: use lowercase where appropriate, minimal punctuation, and natural slang if it fits.
2. Context Matters: analyze the conversation history. If they are dry, be spicy to wake them up. \
If they are engaged, match their energy.
3. Safety First:
   - NO harassment, hate, threats, or coercion.
   - If the other person says \"no\", \"stop\", or shows clear disinterest, YOU MUST switch to \
\"polite closure\" mode immediately and report mode \"closure\".
   - No sexual content involving minors.
4. Variety: give options that range from safe/polite to bold/risky.

SPICY MODE RULES (CRITICAL):
If SPICY MODE is ENABLED:
- Turn up the heat: be boldly flirtatious, confident, and teasing.
- Banter is key: roast them lightly, challenge them, or use PG-13 double entendres.
- Avoid \"Safe\": do not generate boring \"How was your day?\" questions. Generate text that provokes a reaction.
- Constraint: still NO explicit or graphic sexual content. Keep it suggestive and flirty.
";

pub const OCR_SYSTEM_PROMPT: &str = "\
You are an expert OCR engine for chat screenshots.
Analyze the image and extract the conversation turns.
Identify the speaker:
- \"me\": usually on the right side, or a distinct color (often blue/green).
- \"them\": usually on the left side, or a distinct color (often gray).
Return a JSON object with a single key \"turns\", which is an array of objects containing \
\"speaker\" (\"me\" or \"them\") and \"text\".
Ignore timestamps, battery indicators, and UI noise. Correct common OCR errors.
";

const SPICY_DIRECTIVE: &str = "SPICY MODE is ENABLED (🔥)\n\
YOU MUST BE FLIRTY, CONFIDENT, AND TEASING. Do not be boring. \
Do not give safe or boring filler replies.";

const STANDARD_DIRECTIVE: &str = "SPICY MODE is DISABLED\nBe friendly and helpful.";

pub const SPICY_TEMPERATURE: f32 = 1.0;
pub const STANDARD_TEMPERATURE: f32 = 0.75;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PromptTurn {
    pub speaker: Speaker,
    pub text: String,
}

/// Everything the backend needs for one reply generation.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenerationRequest {
    pub system_instruction: &'static str,
    pub turns: Vec<PromptTurn>,
    pub settings: GenerationSettings,
    pub prompt: String,
    pub temperature: f32,
}

pub fn temperature_for(settings: &GenerationSettings) -> f32 {
    if settings.spicy_mode {
        SPICY_TEMPERATURE
    } else {
        STANDARD_TEMPERATURE
    }
}

pub fn spicy_directive(spicy_mode: bool) -> &'static str {
    if spicy_mode {
        SPICY_DIRECTIVE
    } else {
        STANDARD_DIRECTIVE
    }
}

/// Build the request from the transcript and the already-overridden settings.
///
/// Pure: same inputs give the same request, turns keep transcript order.
pub fn build(transcript: &Transcript, effective: &GenerationSettings) -> GenerationRequest {
    let turns: Vec<PromptTurn> = transcript
        .iter()
        .map(|t| PromptTurn {
            speaker: t.speaker,
            text: t.text.clone(),
        })
        .collect();

    // Vec of plain structs, cannot fail to serialize.
    let history = serde_json::to_string(&turns).unwrap_or_else(|_| "[]".to_string());

    let mut prompt = String::new();
    prompt.push_str("Conversation History:\n");
    prompt.push_str(&history);
    prompt.push_str("\n\nUser Settings:\n");
    prompt.push_str(&format!("- Tone: {}\n", effective.tone.label()));
    prompt.push_str(&format!("- Length: {}\n", effective.length.label()));
    prompt.push_str(&format!(
        "- Risk Level: {} (0.0 to 1.0)\n",
        effective.boldness
    ));
    prompt.push_str(&format!("- Intent: {}\n", effective.intent.label()));
    prompt.push_str(&format!("- Emoji Allowed: {}\n", effective.include_emoji));
    prompt.push_str(&format!("- Language: {}\n", effective.language));
    prompt.push_str("\nCRITICAL INSTRUCTION:\n");
    prompt.push_str(spicy_directive(effective.spicy_mode));
    prompt.push('\n');

    GenerationRequest {
        system_instruction: GENERATION_SYSTEM_PROMPT,
        turns,
        settings: effective.clone(),
        prompt,
        temperature: temperature_for(effective),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::safety;
    use crate::chat::{Intent, Length, Tone, Turn};

    fn convo() -> Transcript {
        [
            Turn::new(Speaker::Them, "so what do you do for fun"),
            Turn::new(Speaker::Me, "mostly climbing"),
            Turn::new(Speaker::Them, "so what do you do for fun"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn build_is_pure_and_keeps_order() {
        let t = convo();
        let s = GenerationSettings::default();
        let a = build(&t, &s);
        let b = build(&t, &s);
        assert_eq!(a, b);

        let texts: Vec<_> = a.turns.iter().map(|p| p.text.as_str()).collect();
        let expected: Vec<_> = t.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, expected);
        assert_eq!(a.turns[1].speaker, Speaker::Me);
        assert!(a.prompt.contains(r#"{"speaker":"them","text":"so what do you do for fun"}"#));
    }

    #[test]
    fn every_setting_is_labeled() {
        let s = GenerationSettings {
            tone: Tone::LowKey,
            length: Length::Long,
            boldness: 0.25,
            intent: Intent::ProposePlan,
            include_emoji: true,
            language: "de".into(),
            spicy_mode: false,
        };
        let req = build(&Transcript::new(), &s);
        assert!(req.turns.is_empty());
        assert!(req.prompt.contains("Conversation History:\n[]"));
        assert!(req.prompt.contains("- Tone: Low-key"));
        assert!(req.prompt.contains("- Length: Long"));
        assert!(req.prompt.contains("- Risk Level: 0.25"));
        assert!(req.prompt.contains("- Intent: Propose a plan"));
        assert!(req.prompt.contains("- Emoji Allowed: true"));
        assert!(req.prompt.contains("- Language: de"));
        assert!(req.prompt.contains("SPICY MODE is DISABLED"));
    }

    #[test]
    fn spicy_directive_and_temperature() {
        let s = GenerationSettings {
            spicy_mode: true,
            ..Default::default()
        };
        let req = build(&convo(), &s);
        assert!(req.prompt.contains("SPICY MODE is ENABLED"));
        assert!(req.prompt.contains("Do not be boring"));
        assert!(!req.prompt.contains("Be friendly and helpful"));
        assert_eq!(req.temperature, SPICY_TEMPERATURE);

        let req = build(&convo(), &GenerationSettings::default());
        assert!(req.prompt.contains("Be friendly and helpful"));
        assert_eq!(req.temperature, STANDARD_TEMPERATURE);
    }

    #[test]
    fn refusal_routes_to_friendly_branch() {
        let t: Transcript = [Turn::new(Speaker::Them, "please stop texting me")]
            .into_iter()
            .collect();
        let stored = GenerationSettings {
            spicy_mode: true,
            ..Default::default()
        };
        let req = build(&t, &safety::evaluate(&t, &stored));
        assert!(!req.settings.spicy_mode);
        assert_eq!(req.settings.intent, Intent::ClosePolitely);
        assert!(req.prompt.contains("- Intent: Close politely"));
        assert!(req.prompt.contains("Be friendly and helpful"));
        assert!(!req.prompt.contains("SPICY MODE is ENABLED"));
        assert_eq!(req.temperature, STANDARD_TEMPERATURE);
    }
}
