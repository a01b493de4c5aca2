use anyhow::{bail, Context};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ExtractedTurn, GenerationResult};

/// Output contract declared to the backend for reply generation.
pub fn generation_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "mode": { "type": "STRING", "enum": ["normal", "closure"] },
            "detected_language": { "type": "STRING" },
            "safety_flags": { "type": "ARRAY", "items": { "type": "STRING" } },
            "suggestions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "label": { "type": "STRING" },
                        "text": { "type": "STRING" }
                    },
                    "required": ["label", "text"]
                }
            },
            "avoid": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "text": { "type": "STRING" },
                        "reason": { "type": "STRING" }
                    },
                    "required": ["text", "reason"]
                }
            }
        },
        "required": ["mode", "suggestions", "detected_language"]
    })
}

/// Output contract declared to the backend for screenshot extraction.
pub fn extraction_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "turns": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "speaker": { "type": "STRING", "enum": ["me", "them"] },
                        "text": { "type": "STRING" }
                    },
                    "required": ["speaker", "text"]
                }
            }
        },
        "required": ["turns"]
    })
}

#[derive(Debug, Deserialize)]
struct ExtractionEnvelope {
    turns: Vec<ExtractedTurn>,
}

/// Strictly parse a generation response. Missing required fields, unknown
/// enum values and wrong types are all errors.
pub fn parse_generation(text: &str) -> anyhow::Result<GenerationResult> {
    if text.trim().is_empty() {
        bail!("empty response from model");
    }
    serde_json::from_str(text).context("response does not match generation schema")
}

pub fn parse_extraction(text: &str) -> anyhow::Result<Vec<ExtractedTurn>> {
    if text.trim().is_empty() {
        bail!("empty response from model");
    }
    let envelope: ExtractionEnvelope =
        serde_json::from_str(text).context("response does not match extraction schema")?;
    Ok(envelope.turns)
}
