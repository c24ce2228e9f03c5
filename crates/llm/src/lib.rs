//! LLM integration crate for the guide RAG tool.
//!
//! Provides a provider-agnostic abstraction for chat completion models
//! behind the [`LlmClient`] trait.
//!
//! # Providers
//! - **OpenAI**: chat completions API (and compatible servers)
//!
//! # Example
//! ```no_run
//! use guide_llm::{LlmClient, LlmRequest, providers::OpenAiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAiClient::new("sk-...")?;
//! let request = LlmRequest::new("Hello, world!", "gpt-3.5-turbo").with_temperature(0.0);
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::OpenAiClient;
