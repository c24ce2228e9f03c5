//! LLM provider factory.
//!
//! Creates LLM clients from configuration, resolving the endpoint and
//! injecting the API key.

use crate::client::LlmClient;
use crate::providers::OpenAiClient;
use crate::providers::openai::DEFAULT_BASE_URL;
use guide_core::{AppError, AppResult};
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("openai")
/// * `endpoint` - Optional custom base URL
/// * `api_key` - API key (required by "openai")
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or a required
/// secret is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn LlmClient>> {
    match provider.to_lowercase().as_str() {
        "openai" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("OpenAI provider requires API key".to_string())
            })?;
            let base_url = endpoint.unwrap_or(DEFAULT_BASE_URL);
            let client = OpenAiClient::with_base_url(base_url, api_key)?;
            Ok(Arc::new(client))
        }
        _ => Err(AppError::Config(format!("Unknown provider: {}", provider))),
    }
}
