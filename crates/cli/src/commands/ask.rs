//! Ask command handler.
//!
//! Answers questions from the vector store built by `guide ingest`.

use crate::commands::print_json;
use clap::Args;
use guide_core::{config::AppConfig, AppResult};
use guide_knowledge::{create_provider, AskOptions};
use guide_llm::create_client;
use guide_prompt::{builtin, load_prompt};

/// Questions answered when none are given on the command line.
pub const DEFAULT_QUESTIONS: [&str; 2] = [
    "What is the process for updating my profile?",
    "What are the security policies?",
];

/// Answer questions from the stored embeddings
#[derive(Args, Debug)]
pub struct AskCommand {
    /// Questions to answer (default: two sample questions)
    pub questions: Vec<String>,

    /// Number of chunks to retrieve per question
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Show the retrieved chunks under each answer
    #[arg(long)]
    pub show_sources: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let questions = self.questions_or_default();
        let api_key = config.require_api_key()?;

        let llm = create_client(&config.llm.provider, Some(config.llm.endpoint.as_str()), Some(api_key))?;
        let embedder = create_provider(&config.embedding, &config.llm.endpoint, Some(api_key))?;
        let prompt = load_prompt(&config.workspace, builtin::RAG_ANSWER_ID)?;

        let options = AskOptions {
            top_k: self.top_k.unwrap_or(config.retrieval.top_k),
            model: config.llm.model.clone(),
            temperature: config.llm.temperature,
        };
        tracing::debug!("Ask options: {:?}", options);

        let answers = guide_knowledge::query(
            &config.store_path(),
            embedder.as_ref(),
            llm.as_ref(),
            &prompt,
            &questions,
            &options,
        )
        .await?;

        if self.json {
            return print_json(&answers);
        }

        for answer in &answers {
            println!("Question: {}", answer.question);
            println!("Answer: {}", answer.answer);

            if self.show_sources {
                println!("Sources:");
                for source in &answer.sources {
                    println!(
                        "- {} (page {}, score {:.3}): {}",
                        source.source, source.page, source.score, source.snippet
                    );
                }
            }
            println!();
        }

        Ok(())
    }

    fn questions_or_default(&self) -> Vec<String> {
        if self.questions.is_empty() {
            DEFAULT_QUESTIONS.iter().map(|q| q.to_string()).collect()
        } else {
            self.questions.clone()
        }
    }
}
