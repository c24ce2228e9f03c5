//! Chat completion seam used by the answer pipeline.

use guide_core::AppResult;
use serde::{Deserialize, Serialize};

/// A single-turn chat completion.
///
/// `prompt` becomes the user message. Unset sampling options are left to
/// the provider's defaults, so callers that need deterministic output set
/// `temperature` explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    pub prompt: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl LlmRequest {
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            system: None,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(self, temperature: f32) -> Self {
        Self {
            temperature: Some(temperature),
            ..self
        }
    }

    pub fn with_max_tokens(self, max_tokens: u32) -> Self {
        Self {
            max_tokens: Some(max_tokens),
            ..self
        }
    }

    /// Prepend a system message to the conversation.
    pub fn with_system(self, system: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            ..self
        }
    }
}

/// The model's reply, unmodified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,

    /// Model name as reported by the service
    pub model: String,

    pub usage: LlmUsage,
}

/// Token accounting reported by the service. Missing counts read as zero.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct LlmUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl LlmUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// A chat model backend.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Short identifier such as "openai".
    fn provider_name(&self) -> &str;

    /// Send the request and wait for the full answer.
    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse>;
}
