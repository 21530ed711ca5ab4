use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("no API key configured for the generative service")]
    MissingApiKey,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("service error ({status}): {message}")]
    Service { status: u16, message: String },

    #[error("decode error: {0}")]
    Decode(String),
}

/// One prompt for one model. The whole exchange is a single round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub prompt: String,
    pub model: String,
}

impl ServiceRequest {
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
        }
    }
}

/// Abstraction over a text-generation backend.
///
/// `GeminiService` talks to the Gemini HTTP API.
/// `MockService` returns canned answers for tests.
#[async_trait]
pub trait GenerativeService: Send + Sync {
    /// Human-readable backend name for logging.
    fn name(&self) -> &str;

    /// Send the prompt and return the raw text of the answer.
    async fn generate(&self, request: &ServiceRequest) -> Result<String, ServiceError>;
}
