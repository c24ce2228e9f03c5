//! Document ingestion and retrieval for the guide RAG tool.
//!
//! Ingestion loads a PDF page by page, splits it into overlapping chunks,
//! embeds every chunk and persists them to a SQLite vector store. Queries
//! open that store, retrieve the nearest chunks and ask a chat model to
//! answer from them.

pub mod embeddings;
pub mod parser;
pub mod progress;
pub mod rag;
pub mod splitter;
pub mod store;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use embeddings::{create_provider, EmbeddingProvider};
pub use progress::{IngestEvent, ProgressReporter};
pub use rag::{AskOptions, RagAnswer, RagSourceRef};
pub use store::SqliteIndex;
pub use types::{
    IngestOptions, IngestOutcome, IngestStats, PageText, RetrievedChunk, SourceRecord,
    StoreStats, TextChunk,
};
pub use vector_index::VectorIndex;

use chrono::Utc;
use guide_core::AppResult;
use guide_llm::LlmClient;
use guide_prompt::PromptDefinition;
use splitter::RecursiveCharacterSplitter;
use std::path::Path;
use std::time::Instant;

/// Ingest a PDF into the vector store.
///
/// Nothing is written until every chunk has an embedding, and then the
/// whole document (and the reset, when requested) is stored in one
/// transaction. An existing store with different embedding dimensions is
/// rejected before any embedding call. A PDF that cannot be read or has no
/// text yields [`IngestOutcome::NoDocuments`] without touching the store.
pub async fn ingest(
    options: &IngestOptions,
    embedder: &dyn EmbeddingProvider,
    progress: &ProgressReporter,
) -> AppResult<IngestOutcome> {
    let start = Instant::now();

    tracing::info!("Starting ingestion of {:?}", options.pdf_path);

    let splitter = RecursiveCharacterSplitter::new(options.chunk_size, options.chunk_overlap)?;

    let loaded = match parser::load_pdf(&options.pdf_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::warn!("Could not load {:?}: {}", options.pdf_path, e);
            return Ok(IngestOutcome::NoDocuments {
                path: options.pdf_path.clone(),
                reason: e.to_string(),
            });
        }
    };

    if loaded.pages.is_empty() {
        return Ok(IngestOutcome::NoDocuments {
            path: options.pdf_path.clone(),
            reason: "no page contains extractable text".to_string(),
        });
    }
    progress.emit(IngestEvent::Loaded {
        pages: loaded.page_count,
    });

    let pages = loaded.pages;
    let chunks = splitter.split_pages(&pages);
    progress.emit(IngestEvent::Split {
        chunks: chunks.len(),
    });

    if !options.reset {
        SqliteIndex::check_dimensions(
            &options.store_dir,
            embedder.model_name(),
            embedder.dimensions(),
        )?;
    }

    let embeddings = embeddings::embed_chunks(embedder, &chunks, options.batch_size).await?;
    progress.emit(IngestEvent::Embedded {
        chunks: embeddings.len(),
    });

    let file_bytes = std::fs::read(&options.pdf_path)?;
    let bytes_processed: u64 = pages.iter().map(|p| p.text.len() as u64).sum();

    let source = SourceRecord {
        id: uuid::Uuid::new_v4().to_string(),
        path: options.pdf_path.to_string_lossy().to_string(),
        size_bytes: file_bytes.len() as u64,
        page_count: loaded.page_count as u32,
        chunk_count: chunks.len() as u32,
        content_hash: file_hash(&file_bytes),
        ingested_at: Utc::now(),
    };

    let mut index = SqliteIndex::create(
        &options.store_dir,
        embedder.model_name(),
        embedder.dimensions(),
        options.reset,
    )?;
    index.insert_document(&source, &chunks, &embeddings)?;
    progress.emit(IngestEvent::Stored {
        chunks: chunks.len(),
    });

    let duration = start.elapsed();

    tracing::info!(
        "Ingestion completed: {} pages, {} chunks, {} bytes in {:.2}s",
        loaded.page_count,
        chunks.len(),
        bytes_processed,
        duration.as_secs_f64()
    );

    Ok(IngestOutcome::Ingested(IngestStats {
        source_id: source.id,
        pages_count: source.page_count,
        chunks_count: source.chunk_count,
        bytes_processed,
        duration_secs: duration.as_secs_f64(),
    }))
}

/// Answer each question from the store at `store_dir`.
///
/// The store is opened before any service call, so a missing or empty
/// store fails without embedding anything.
pub async fn query(
    store_dir: &Path,
    embedder: &dyn EmbeddingProvider,
    llm: &dyn LlmClient,
    prompt: &PromptDefinition,
    questions: &[String],
    options: &AskOptions,
) -> AppResult<Vec<RagAnswer>> {
    let index = SqliteIndex::open(store_dir, embedder.dimensions())?;

    if index.model() != embedder.model_name() {
        tracing::warn!(
            "Store was built with '{}', querying with '{}'",
            index.model(),
            embedder.model_name()
        );
    }

    let mut answers = Vec::with_capacity(questions.len());
    for question in questions {
        answers.push(rag::ask(&index, embedder, llm, prompt, question, options).await?);
    }

    Ok(answers)
}

/// Get statistics for the store at `store_dir`.
pub fn stats(store_dir: &Path) -> AppResult<StoreStats> {
    tracing::info!("Getting stats for store {:?}", store_dir);

    SqliteIndex::inspect(store_dir)?.stats()
}

fn file_hash(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    format!("{:x}", Sha256::digest(bytes))
}
