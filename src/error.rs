use serde::{Serialize, Serializer};
use thiserror::Error;

/// Errors surfaced to the user, one readable message per failed action.
///
/// Backend and parsing causes are kept as `source` for logging; callers only
/// decide on the variant.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to extract text. Try cropping the image or typing manually.")]
    ExtractionFailed {
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to generate replies. Please try again.")]
    GenerationFailed {
        #[source]
        source: anyhow::Error,
    },

    #[error("Storage error: {0}")]
    PersistenceFailed(String),

    #[error("Missing configuration: {0}")]
    ConfigurationMissing(String),

    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error("Message not found: {0}")]
    TurnNotFound(String),

    #[error("This action is already running for the conversation")]
    Busy,
}

impl AppError {
    pub fn extraction(source: impl Into<anyhow::Error>) -> Self {
        Self::ExtractionFailed {
            source: source.into(),
        }
    }

    pub fn generation(source: impl Into<anyhow::Error>) -> Self {
        Self::GenerationFailed {
            source: source.into(),
        }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        Self::PersistenceFailed(e.to_string())
    }
}

impl Serialize for AppError {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
