use std::sync::Arc;

use super::postprocess::{self, Applied};
use super::prompt;
use super::safety::{DisinterestPolicy, KeywordPolicy};
use super::{GenerationResult, ReplyBackend};
use crate::capture::ImagePayload;
use crate::chat::{GenerationSettings, Transcript, Turn};
use crate::error::Result;

/// Outcome of one generate action before anything is persisted.
#[derive(Debug, Clone)]
pub struct ReplyRun {
    pub result: GenerationResult,
    /// Request-scoped settings actually sent to the backend.
    pub effective: GenerationSettings,
    pub applied: Applied,
}

/// Transcript + settings in, ranked replies out.
///
/// Owns the backend handle and the disinterest policy; both are injected so
/// either can be replaced (tests use an in-memory backend).
#[derive(Clone)]
pub struct ReplyEngine {
    backend: Arc<dyn ReplyBackend>,
    policy: Arc<dyn DisinterestPolicy>,
}

impl ReplyEngine {
    pub fn new(backend: Arc<dyn ReplyBackend>) -> Self {
        Self::with_policy(backend, Arc::new(KeywordPolicy))
    }

    pub fn with_policy(backend: Arc<dyn ReplyBackend>, policy: Arc<dyn DisinterestPolicy>) -> Self {
        Self { backend, policy }
    }

    pub async fn generate(
        &self,
        transcript: &Transcript,
        settings: &GenerationSettings,
    ) -> Result<ReplyRun> {
        let effective = self.policy.evaluate(transcript, settings);
        if effective != *settings {
            log::warn!("Disinterest detected, closing politely with spicy mode off for this request");
        }

        let request = prompt::build(transcript, &effective);
        log::info!(
            "Generating replies for {} turns (spicy: {}, temperature: {})",
            request.turns.len(),
            effective.spicy_mode,
            request.temperature
        );

        let result = self.backend.generate(&request).await?;
        let applied = postprocess::apply(&result, settings);

        Ok(ReplyRun {
            result,
            effective,
            applied,
        })
    }

    /// Read a screenshot into fresh turns, in on-screen order.
    pub async fn extract(&self, image: &ImagePayload) -> Result<Vec<Turn>> {
        let extracted = self.backend.extract_transcript(image).await?;
        log::info!("Extracted {} turns from screenshot", extracted.len());
        Ok(extracted.into_iter().map(Turn::from).collect())
    }
}
