//! Vector index abstraction for stored chunks.
//!
//! The ingestion and query pipelines talk to the store only through this
//! trait.

use crate::types::{RetrievedChunk, SourceRecord, StoreStats, TextChunk};
use guide_core::AppResult;

/// Trait for vector index backends.
pub trait VectorIndex: Send {
    /// Store a document and all of its chunks with their embeddings.
    ///
    /// `embeddings[i]` belongs to `chunks[i]`. The write is atomic: either
    /// everything is stored or nothing is.
    fn insert_document(
        &mut self,
        source: &SourceRecord,
        chunks: &[TextChunk],
        embeddings: &[Vec<f32>],
    ) -> AppResult<()>;

    /// Search for the top-k most similar chunks to the query embedding.
    ///
    /// Returns chunks ordered by descending similarity score.
    fn search(&self, query_embedding: &[f32], top_k: usize) -> AppResult<Vec<RetrievedChunk>>;

    /// Get statistics about the index.
    fn stats(&self) -> AppResult<StoreStats>;

    /// Remove all chunks and sources.
    fn reset(&mut self) -> AppResult<()>;
}
