//! Embedding generation for chunks and queries.
//!
//! Provider-agnostic: the pipelines only see [`EmbeddingProvider`].

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};

use crate::types::TextChunk;
use guide_core::{AppError, AppResult};

/// Embed all chunks, sending one request per `batch_size` texts.
///
/// Batches go out one after another. The first failure aborts the run, so
/// either every chunk gets a vector or none are returned.
pub async fn embed_chunks(
    provider: &dyn EmbeddingProvider,
    chunks: &[TextChunk],
    batch_size: usize,
) -> AppResult<Vec<Vec<f32>>> {
    if chunks.is_empty() {
        return Ok(Vec::new());
    }

    let batch_size = batch_size.max(1);
    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();

    tracing::info!(
        "Embedding {} chunks using provider '{}' (model: {})",
        texts.len(),
        provider.provider_name(),
        provider.model_name()
    );

    let mut embeddings = Vec::with_capacity(texts.len());
    for (batch_index, batch) in texts.chunks(batch_size).enumerate() {
        tracing::debug!("Embedding batch {} ({} texts)", batch_index + 1, batch.len());

        let vectors = provider.embed_batch(batch).await?;
        if vectors.len() != batch.len() {
            return Err(AppError::Embedding(format!(
                "Provider returned {} embeddings for {} texts",
                vectors.len(),
                batch.len()
            )));
        }
        embeddings.extend(vectors);
    }

    if let Some(bad) = embeddings.iter().find(|v| v.len() != provider.dimensions()) {
        return Err(AppError::Embedding(format!(
            "Expected {}-dimensional embeddings, got {}",
            provider.dimensions(),
            bad.len()
        )));
    }

    tracing::debug!(
        "Generated {} embeddings of dimension {}",
        embeddings.len(),
        provider.dimensions()
    );

    Ok(embeddings)
}
