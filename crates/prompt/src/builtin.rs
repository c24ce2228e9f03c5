//! Prompts shipped with the binary.

use crate::types::PromptDefinition;

/// Identifier of the grounded-answer prompt.
pub const RAG_ANSWER_ID: &str = "rag.answer";

/// Sentence the model must answer with when the context has nothing relevant.
pub const FALLBACK_ANSWER: &str = "I am sorry, the guide does not contain information on this topic.";

const RAG_ANSWER_TEMPLATE: &str = "
You are an expert assistant. Your task is to answer the user's question based ONLY on the following context.
If the answer is not available in the context, respond with 'I am sorry, the guide does not contain information on this topic.'
Do not use any prior knowledge.

Context:
{{context}}

Question:
{{question}}

Answer:
";

/// The grounded-answer prompt restricting the model to retrieved context.
pub fn rag_answer() -> PromptDefinition {
    PromptDefinition {
        id: RAG_ANSWER_ID.to_string(),
        title: "Answer from guide context".to_string(),
        api_version: "1.0".to_string(),
        created_by: "builtin".to_string(),
        variables: vec!["context".to_string(), "question".to_string()],
        template: RAG_ANSWER_TEMPLATE.to_string(),
    }
}

/// Look up a built-in prompt by ID.
pub fn find(prompt_id: &str) -> Option<PromptDefinition> {
    match prompt_id {
        RAG_ANSWER_ID => Some(rag_answer()),
        _ => None,
    }
}
