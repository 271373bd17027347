/// LLM Client — the single point of entry for generate-content calls.
///
/// ARCHITECTURAL RULE: No other module may call the model provider directly.
/// Handlers go through `ModelInvoker`, which owns retry and model fallback;
/// `ModelProvider` implementations only perform one HTTP exchange.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::resilience::Classify;

pub mod invoker;
pub mod prompts;

pub use invoker::ModelInvoker;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Candidate models, most capable first. The last entry is the most broadly available.
pub const DEFAULT_MODELS: &[&str] = &["gemini-1.5-flash", "gemini-pro"];
const TEMPERATURE: f32 = 0.7;
const MAX_OUTPUT_TOKENS: u32 = 8192;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("API quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("No content generated ({reason})")]
    EmptyContent { reason: String },

    #[error("Model provider is not configured: {0}")]
    NotConfigured(String),
}

/// The request URL is dropped so transport errors never carry it into logs.
impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        LlmError::Http(e.without_url())
    }
}

impl LlmError {
    /// True when the provider does not know the requested model identifier.
    pub fn is_model_unavailable(&self) -> bool {
        match self {
            LlmError::Api { status, message } => {
                *status == 404 || message.to_lowercase().contains("not found")
            }
            _ => false,
        }
    }
}

impl Classify for LlmError {
    fn is_network_failure(&self) -> bool {
        match self {
            LlmError::Http(e) => e.is_connect() || e.is_request(),
            _ => false,
        }
    }

    fn is_timeout(&self) -> bool {
        matches!(self, LlmError::Http(e) if e.is_timeout())
    }

    fn status_code(&self) -> Option<u16> {
        match self {
            LlmError::Http(e) => e.status().map(|s| s.as_u16()),
            LlmError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// One outbound generate call against a named model.
///
/// Implementations must not retry; `ModelInvoker` does.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default, rename = "promptFeedback")]
    pub prompt_feedback: Option<PromptFeedback>,
    pub error: Option<ProviderErrorBody>,
}

/// Present when the prompt itself was rejected and no candidates were produced.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorEnvelope {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ProviderErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    pub message: String,
}

impl GenerateContentResponse {
    /// Joins the text parts of the first candidate, or explains why there are none.
    pub fn into_text(self) -> Result<String, LlmError> {
        if let Some(err) = self.error {
            return Err(LlmError::Api {
                status: err.code.unwrap_or(500),
                message: err.message,
            });
        }

        let block_reason = self.prompt_feedback.and_then(|f| f.block_reason);
        let candidate = self.candidates.into_iter().next().ok_or_else(|| {
            let reason = match block_reason {
                Some(reason) => format!("prompt blocked: {reason}"),
                None => "empty candidates".to_string(),
            };
            LlmError::EmptyContent { reason }
        })?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            let reason = match candidate.finish_reason {
                Some(reason) => format!("finish reason: {reason}"),
                None => "empty response".to_string(),
            };
            return Err(LlmError::EmptyContent { reason });
        }

        Ok(text)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini client
// ────────────────────────────────────────────────────────────────────────────

/// Generate-content client for the Gemini REST API.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_base: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(api_base: String, api_key: Option<String>) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl ModelProvider for GeminiClient {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| LlmError::NotConfigured("GEMINI_API_KEY is not set".to_string()))?;

        let request_body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let url = format!("{}/models/{}:generateContent", self.api_base, model);
        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProviderErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            if status.as_u16() == 429 && message.to_lowercase().contains("quota") {
                return Err(LlmError::QuotaExceeded(message));
            }
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let text = parsed.into_text()?;
        debug!("Model {} returned {} characters", model, text.len());
        Ok(text)
    }
}
