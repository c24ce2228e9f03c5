//! RAG request and response types.

use guide_llm::LlmUsage;
use serde::{Deserialize, Serialize};

/// Default number of chunks retrieved per question.
pub const DEFAULT_TOP_K: usize = 4;

/// Settings for answering a question.
#[derive(Debug, Clone)]
pub struct AskOptions {
    /// Number of chunks to retrieve
    pub top_k: usize,

    /// Chat model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,
}

impl Default for AskOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.0,
        }
    }
}

/// A retrieved chunk that was placed in the prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagSourceRef {
    /// Source document path
    pub source: String,

    /// 0-based page number
    pub page: u32,

    /// Similarity to the question
    pub score: f32,

    /// Start of the chunk text
    pub snippet: String,
}

/// Answer to one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagAnswer {
    /// The question as asked
    pub question: String,

    /// Model output, unmodified
    pub answer: String,

    /// Model that produced the answer
    pub model: String,

    /// Token usage for the completion
    pub usage: LlmUsage,

    /// Chunks used as context, most similar first
    pub sources: Vec<RagSourceRef>,
}
