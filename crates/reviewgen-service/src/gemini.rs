use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{GenerativeService, ServiceError, ServiceRequest};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-pro";

/// Async HTTP client for the Gemini `generateContent` endpoint.
pub struct GeminiService {
    base_url: String,
    client: Client,
    api_key: Option<String>,
}

impl GeminiService {
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::new(),
            api_key: None,
        }
    }

    pub fn with_api_key(base_url: &str, key: String) -> Self {
        let mut service = Self::new(base_url);
        // An empty key is as good as none; fail at call time either way.
        service.api_key = Some(key).filter(|k| !k.trim().is_empty());
        service
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenate the text parts of the first candidate.
    fn into_text(self) -> Result<String, ServiceError> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            let reason = self
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "none given".into());
            return Err(ServiceError::Decode(format!(
                "response has no candidates (block reason: {reason})"
            )));
        };
        let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
        Ok(parts.into_iter().filter_map(|p| p.text).collect())
    }
}

#[async_trait]
impl GenerativeService for GeminiService {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: &ServiceRequest) -> Result<String, ServiceError> {
        let key = self.api_key.as_deref().ok_or(ServiceError::MissingApiKey)?;

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![RequestPart {
                    text: &request.prompt,
                }],
            }],
        };

        debug!(model = %request.model, prompt_len = request.prompt.len(), "gemini: sending request");
        let resp = self
            .client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(parse_error_with_status(status, resp).await);
        }

        let parsed = resp
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| ServiceError::Decode(format!("json decode: {e}")))?;
        parsed.into_text()
    }
}

async fn parse_error_with_status(status: StatusCode, resp: reqwest::Response) -> ServiceError {
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or(body);

    ServiceError::Service {
        status: status.as_u16(),
        message,
    }
}
