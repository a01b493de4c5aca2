use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Tone {
    Playful,
    Charming,
    Direct,
    Funny,
    #[serde(rename = "Low-key")]
    LowKey,
    Respectful,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Length {
    Short,
    Medium,
    Long,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Intent {
    #[serde(rename = "Keep conversation going")]
    KeepGoing,
    #[serde(rename = "Ask a question")]
    AskQuestion,
    #[serde(rename = "Propose a plan")]
    ProposePlan,
    Compliment,
    #[serde(rename = "Recover from awkwardness")]
    Recover,
    #[serde(rename = "Close politely")]
    ClosePolitely,
}

impl Tone {
    pub const ALL: [Tone; 6] = [
        Tone::Playful,
        Tone::Charming,
        Tone::Direct,
        Tone::Funny,
        Tone::LowKey,
        Tone::Respectful,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tone::Playful => "Playful",
            Tone::Charming => "Charming",
            Tone::Direct => "Direct",
            Tone::Funny => "Funny",
            Tone::LowKey => "Low-key",
            Tone::Respectful => "Respectful",
        }
    }
}

impl Length {
    pub const ALL: [Length; 3] = [Length::Short, Length::Medium, Length::Long];

    pub fn label(self) -> &'static str {
        match self {
            Length::Short => "Short",
            Length::Medium => "Medium",
            Length::Long => "Long",
        }
    }
}

impl Intent {
    pub const ALL: [Intent; 6] = [
        Intent::KeepGoing,
        Intent::AskQuestion,
        Intent::ProposePlan,
        Intent::Compliment,
        Intent::Recover,
        Intent::ClosePolitely,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Intent::KeepGoing => "Keep conversation going",
            Intent::AskQuestion => "Ask a question",
            Intent::ProposePlan => "Propose a plan",
            Intent::Compliment => "Compliment",
            Intent::Recover => "Recover from awkwardness",
            Intent::ClosePolitely => "Close politely",
        }
    }
}

/// Per-conversation generation policy as the user set it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSettings {
    pub tone: Tone,
    pub length: Length,
    /// Risk level, 0.0 (safe) to 1.0 (bold).
    pub boldness: f32,
    pub intent: Intent,
    pub include_emoji: bool,
    /// `"auto"` or a language tag.
    pub language: String,
    pub spicy_mode: bool,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            tone: Tone::Charming,
            length: Length::Short,
            boldness: 0.5,
            intent: Intent::KeepGoing,
            include_emoji: false,
            language: "auto".to_string(),
            spicy_mode: false,
        }
    }
}

impl GenerationSettings {
    /// Clamp out-of-range input from the settings panel.
    pub fn normalized(mut self) -> Self {
        self.boldness = if self.boldness.is_nan() {
            0.5
        } else {
            self.boldness.clamp(0.0, 1.0)
        };
        if self.language.trim().is_empty() {
            self.language = "auto".to_string();
        }
        self
    }
}
