//! RAG answering orchestration.
//!
//! Embeds the question, retrieves the nearest chunks, fills the prompt
//! template and returns the model's answer verbatim.

use crate::embeddings::EmbeddingProvider;
use crate::rag::types::{AskOptions, RagAnswer, RagSourceRef};
use crate::types::RetrievedChunk;
use crate::vector_index::VectorIndex;
use guide_core::AppResult;
use guide_llm::{LlmClient, LlmRequest};
use guide_prompt::{build_prompt, PromptDefinition};
use std::collections::HashMap;

/// Maximum snippet length (in characters) for source references.
const MAX_SNIPPET_LENGTH: usize = 150;

/// Answer a question from the store.
///
/// There is no relevance threshold: the top `options.top_k` chunks are
/// always used, and the prompt tells the model how to respond when they
/// do not contain the answer.
pub async fn ask(
    index: &dyn VectorIndex,
    embedder: &dyn EmbeddingProvider,
    llm: &dyn LlmClient,
    prompt: &PromptDefinition,
    question: &str,
    options: &AskOptions,
) -> AppResult<RagAnswer> {
    tracing::info!(top_k = options.top_k, "Answering question: {}", question);

    let query_embedding = embedder.embed(question).await?;
    let chunks = index.search(&query_embedding, options.top_k)?;

    if let (Some(best), Some(worst)) = (chunks.first(), chunks.last()) {
        tracing::debug!(
            "Retrieved {} chunks (top score: {:.3}, lowest: {:.3})",
            chunks.len(),
            best.score,
            worst.score
        );
    }

    let mut variables = HashMap::new();
    variables.insert("context".to_string(), build_context(&chunks));
    variables.insert("question".to_string(), question.to_string());
    let built = build_prompt(prompt, variables)?;

    let request = LlmRequest::new(built.user, &options.model).with_temperature(options.temperature);
    let response = llm.complete(&request).await?;

    Ok(RagAnswer {
        question: question.to_string(),
        answer: response.content,
        model: response.model,
        usage: response.usage,
        sources: chunks.iter().map(to_source_ref).collect(),
    })
}

/// Join retrieved chunk texts, most similar first, separated by blank lines.
pub fn build_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .map(|chunk| chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn to_source_ref(chunk: &RetrievedChunk) -> RagSourceRef {
    RagSourceRef {
        source: chunk.source_path.clone(),
        page: chunk.page,
        score: chunk.score,
        snippet: truncate_snippet(&chunk.text, MAX_SNIPPET_LENGTH),
    }
}

/// Truncate at a word boundary, appending "..." when shortened.
fn truncate_snippet(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((cut, _)) => {
            let truncated = &text[..cut];
            match truncated.rfind(char::is_whitespace) {
                Some(last_space) if last_space > 0 => format!("{}...", &truncated[..last_space]),
                _ => format!("{}...", truncated),
            }
        }
    }
}
