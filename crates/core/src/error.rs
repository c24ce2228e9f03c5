//! Error types for the guide RAG tool.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application: configuration, I/O, document loading, embeddings,
//! the vector store, the language model and prompt rendering.

use thiserror::Error;

/// Unified error type for the guide RAG tool.
///
/// All fallible functions return `Result<T, AppError>` and errors are
/// propagated to `main`, which turns them into a non-zero exit.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (including missing credentials)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Source document loading and text extraction errors
    #[error("Document error: {0}")]
    Document(String),

    /// Embedding service errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector store errors (missing, unreadable or inconsistent store)
    #[error("Store error: {0}")]
    Store(String),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
