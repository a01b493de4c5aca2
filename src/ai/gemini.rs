use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::prompt::{GenerationRequest, OCR_SYSTEM_PROMPT};
use super::{schema, ExtractedTurn, GenerationResult, ReplyBackend};
use crate::capture::ImagePayload;
use crate::config::AppConfig;
use crate::error::{AppError, Result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

fn text_part(text: &str) -> Part<'_> {
    Part {
        text: Some(text),
        inline_data: None,
    }
}

/// Gemini `generateContent` client with JSON-schema constrained output.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
            &config.gemini_base_url,
        )
    }

    fn require_key(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(AppError::ConfigurationMissing(
                "Gemini API key not configured. Go to Settings to add your key.".to_string(),
            ));
        }
        Ok(())
    }

    /// Send one request and return the concatenated text of the first candidate.
    async fn call(&self, request: &GenerateContentRequest<'_>) -> anyhow::Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .context("Gemini request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Gemini API error ({}): {}", status, body));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .context("Failed to parse Gemini response")?;

        let text: String = body
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(anyhow!("No response from Gemini"));
        }
        Ok(text)
    }
}

#[async_trait]
impl ReplyBackend for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        self.require_key()?;

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![text_part(&request.prompt)],
            }],
            system_instruction: Some(Content {
                role: None,
                parts: vec![text_part(request.system_instruction)],
            }),
            generation_config: GenerationConfig {
                temperature: Some(request.temperature),
                response_mime_type: "application/json",
                response_schema: schema::generation_schema(),
            },
        };

        let outcome = match self.call(&body).await {
            Ok(text) => schema::parse_generation(&text),
            Err(e) => Err(e),
        };

        outcome.map_err(|e| {
            log::error!("Generation failed: {:#}", e);
            AppError::generation(e)
        })
    }

    async fn extract_transcript(&self, image: &ImagePayload) -> Result<Vec<ExtractedTurn>> {
        self.require_key()?;

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: image.mime_type,
                            data: &image.base64_data,
                        }),
                    },
                    text_part(OCR_SYSTEM_PROMPT),
                ],
            }],
            system_instruction: None,
            generation_config: GenerationConfig {
                temperature: None,
                response_mime_type: "application/json",
                response_schema: schema::extraction_schema(),
            },
        };

        let outcome = match self.call(&body).await {
            Ok(text) => schema::parse_extraction(&text),
            Err(e) => Err(e),
        };

        outcome.map_err(|e| {
            log::error!("OCR extraction failed: {:#}", e);
            AppError::extraction(e)
        })
    }
}
