pub mod gemini;
pub mod postprocess;
pub mod prompt;
pub mod replies;
pub mod safety;
pub mod schema;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::capture::ImagePayload;
use crate::chat::{Speaker, Turn};
use crate::error::Result;
use prompt::GenerationRequest;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Normal,
    Closure,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Suggestion {
    pub label: String,
    pub text: String,
}

/// Negative example returned for transparency; never offered as a reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvoidItem {
    pub text: String,
    pub reason: String,
}

/// Parsed backend answer for one generation call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationResult {
    pub mode: Mode,
    pub detected_language: String,
    #[serde(default)]
    pub safety_flags: BTreeSet<String>,
    pub suggestions: Vec<Suggestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avoid: Option<Vec<AvoidItem>>,
}

/// One message as read off a screenshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractedTurn {
    pub speaker: Speaker,
    pub text: String,
}

impl From<ExtractedTurn> for Turn {
    fn from(t: ExtractedTurn) -> Self {
        Turn::new(t.speaker, t.text)
    }
}

/// The generative model behind reply suggestions and screenshot reading.
///
/// Implementations must reject empty or schema-violating output instead of
/// guessing, reporting `GenerationFailed` / `ExtractionFailed` respectively.
#[async_trait]
pub trait ReplyBackend: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult>;

    async fn extract_transcript(&self, image: &ImagePayload) -> Result<Vec<ExtractedTurn>>;
}
