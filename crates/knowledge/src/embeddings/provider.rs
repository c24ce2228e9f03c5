//! Embedding provider trait and factory.

use guide_core::config::EmbeddingSettings;
use guide_core::{AppError, AppResult};
use std::sync::Arc;

use super::providers::{MockProvider, OpenAiEmbeddingProvider};

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "mock", "openai")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in one request.
    ///
    /// The result has one vector per input, in input order.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Embedding("No embedding returned".to_string()))
    }
}

/// Create an embedding provider based on configuration.
///
/// # Arguments
/// * `settings` - Provider, model and dimensions
/// * `endpoint` - API base URL used by HTTP providers
/// * `api_key` - Secret for providers that need one
pub fn create_provider(
    settings: &EmbeddingSettings,
    endpoint: &str,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match settings.provider.as_str() {
        "openai" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("OpenAI embedding provider requires API key".to_string())
            })?;
            let provider = OpenAiEmbeddingProvider::new(
                endpoint,
                api_key,
                &settings.model,
                settings.dimensions,
            )?;
            Ok(Arc::new(provider))
        }

        "mock" => Ok(Arc::new(MockProvider::new(settings.dimensions))),

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: openai, mock",
            settings.provider
        ))),
    }
}
