//! In-memory backend for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::Notify;

use super::prompt::GenerationRequest;
use super::{ExtractedTurn, GenerationResult, Mode, ReplyBackend, Suggestion};
use crate::capture::ImagePayload;
use crate::error::{AppError, Result};

pub struct StubBackend {
    generation: Option<GenerationResult>,
    extraction: Option<Vec<ExtractedTurn>>,
    requests: Mutex<Vec<GenerationRequest>>,
    extractions: Mutex<usize>,
    gate: Option<Arc<Notify>>,
}

impl StubBackend {
    pub fn replying(mode: Mode) -> Self {
        Self {
            generation: Some(GenerationResult {
                mode,
                detected_language: "en".into(),
                safety_flags: Default::default(),
                suggestions: vec![Suggestion {
                    label: "Safe".into(),
                    text: "hey, how's it going?".into(),
                }],
                avoid: None,
            }),
            extraction: None,
            requests: Mutex::new(Vec::new()),
            extractions: Mutex::new(0),
            gate: None,
        }
    }

    pub fn failing() -> Self {
        Self {
            generation: None,
            extraction: None,
            requests: Mutex::new(Vec::new()),
            extractions: Mutex::new(0),
            gate: None,
        }
    }

    pub fn with_extraction(mut self, turns: Vec<ExtractedTurn>) -> Self {
        self.extraction = Some(turns);
        self
    }

    /// Calls block until the returned handle is notified.
    pub fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().clone()
    }

    pub fn extraction_calls(&self) -> usize {
        *self.extractions.lock()
    }

    pub fn image() -> ImagePayload {
        ImagePayload {
            mime_type: "image/png",
            base64_data: String::new(),
            width: 1,
            height: 1,
        }
    }

    async fn wait(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl ReplyBackend for StubBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        self.requests.lock().push(request.clone());
        self.wait().await;
        self.generation
            .clone()
            .ok_or_else(|| AppError::generation(anyhow::anyhow!("stub backend failure")))
    }

    async fn extract_transcript(&self, _image: &ImagePayload) -> Result<Vec<ExtractedTurn>> {
        *self.extractions.lock() += 1;
        self.wait().await;
        self.extraction
            .clone()
            .ok_or_else(|| AppError::extraction(anyhow::anyhow!("stub backend failure")))
    }
}
