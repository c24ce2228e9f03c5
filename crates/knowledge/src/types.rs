//! Knowledge system type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Text extracted from a single PDF page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    /// Path of the PDF the page came from
    pub source: PathBuf,

    /// 0-based page number
    pub page: u32,

    /// Extracted text content
    pub text: String,
}

/// A contiguous span of a page's text, ready for embedding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    /// Unique chunk identifier
    pub id: String,

    /// 0-based page number inherited from the page
    pub page: u32,

    /// Position within the document (across all pages)
    pub position: u32,

    /// Text content
    pub text: String,

    /// Byte offset of the chunk within its page text
    pub byte_offset: usize,

    /// Length in characters
    pub char_count: usize,

    /// SHA-256 of the chunk text (hex)
    pub hash: String,
}

/// A document recorded in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Unique source identifier
    pub id: String,

    /// Path the document was ingested from
    pub path: String,

    /// File size in bytes
    pub size_bytes: u64,

    /// Number of pages that yielded text
    pub page_count: u32,

    /// Number of chunks stored for this source
    pub chunk_count: u32,

    /// SHA-256 of the file contents (hex)
    pub content_hash: String,

    /// When this source was ingested
    pub ingested_at: DateTime<Utc>,
}

/// Options for the ingest operation.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// PDF to ingest
    pub pdf_path: PathBuf,

    /// Store directory
    pub store_dir: PathBuf,

    /// Maximum chunk length in characters
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,

    /// Texts per embedding request
    pub batch_size: usize,

    /// Clear the store before writing
    pub reset: bool,
}

/// Statistics from an ingest operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestStats {
    /// Identifier of the stored source
    pub source_id: String,

    /// Number of pages loaded
    pub pages_count: u32,

    /// Number of chunks created
    pub chunks_count: u32,

    /// Total bytes of text processed
    pub bytes_processed: u64,

    /// Duration in seconds
    pub duration_secs: f64,
}

/// Result of running the ingestion pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IngestOutcome {
    /// Chunks and embeddings were written to the store.
    Ingested(IngestStats),

    /// Nothing could be loaded from the PDF; the store was not touched.
    NoDocuments { path: PathBuf, reason: String },
}

/// A stored chunk returned by similarity search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// Chunk identifier
    pub chunk_id: String,

    /// Path of the source document
    pub source_path: String,

    /// 0-based page number
    pub page: u32,

    /// Position within the document
    pub position: u32,

    /// Text content
    pub text: String,

    /// Cosine similarity to the query
    pub score: f32,
}

/// Statistics for a vector store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    /// Store directory
    pub store_path: PathBuf,

    /// Number of sources
    pub sources_count: u32,

    /// Number of chunks
    pub chunks_count: u32,

    /// Embedding model the store was built with
    pub embedding_model: String,

    /// Embedding dimensions
    pub dimensions: usize,

    /// Database size in bytes
    pub db_size_bytes: u64,

    /// Last ingestion timestamp
    pub last_ingest_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_outcome_serialization() {
        let outcome = IngestOutcome::NoDocuments {
            path: PathBuf::from("guide.pdf"),
            reason: "no extractable text".to_string(),
        };

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "no_documents");
        assert_eq!(json["path"], "guide.pdf");

        let ingested = IngestOutcome::Ingested(IngestStats {
            source_id: "s1".to_string(),
            pages_count: 3,
            chunks_count: 12,
            bytes_processed: 9000,
            duration_secs: 1.5,
        });
        let json = serde_json::to_value(&ingested).unwrap();
        assert_eq!(json["status"], "ingested");
        assert_eq!(json["chunks_count"], 12);
    }
}
