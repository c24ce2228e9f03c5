//! Ingest command handler.

use crate::commands::print_json;
use clap::Args;
use guide_core::{config::AppConfig, AppResult};
use guide_knowledge::{create_provider, IngestEvent, IngestOptions, IngestOutcome, ProgressReporter};
use std::path::PathBuf;
use std::sync::Arc;

/// Load a PDF, split it into chunks and store their embeddings
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// PDF to ingest (default: ingest.pdfPath from config)
    pub pdf: Option<PathBuf>,

    /// Clear the store before writing
    #[arg(long)]
    pub reset: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let pdf_path = match &self.pdf {
            Some(path) => config.resolve(path),
            None => config.pdf_path(),
        };
        tracing::info!("Executing ingest command for {:?}", pdf_path);

        let api_key = if config.embedding.provider == "openai" {
            Some(config.require_api_key()?)
        } else {
            config.api_key.as_deref()
        };

        let embedder = create_provider(&config.embedding, &config.llm.endpoint, api_key)?;

        let options = IngestOptions {
            pdf_path,
            store_dir: config.store_path(),
            chunk_size: config.ingest.chunk_size,
            chunk_overlap: config.ingest.chunk_overlap,
            batch_size: config.embedding.batch_size,
            reset: self.reset,
        };

        let progress = if self.json {
            ProgressReporter::noop()
        } else {
            ProgressReporter::new(Arc::new(print_progress))
        };

        let outcome = guide_knowledge::ingest(&options, embedder.as_ref(), &progress).await?;

        if self.json {
            return print_json(&outcome);
        }

        if let IngestOutcome::Ingested(stats) = &outcome {
            tracing::debug!(
                "Stored source {} in {:.2}s",
                stats.source_id,
                stats.duration_secs
            );
        }
        println!("{}", outcome_line(&outcome));

        Ok(())
    }
}

const STORED_LINE: &str = "Successfully created and stored embeddings in the vector database.";
const NO_DOCUMENTS_LINE: &str =
    "Could not load any documents from the PDF. Check the file path and content.";

fn print_progress(event: &IngestEvent) {
    if let Some(line) = progress_line(event) {
        println!("{}", line);
    }
}

/// Console line for a progress event; the embed and store stages are silent.
fn progress_line(event: &IngestEvent) -> Option<String> {
    match event {
        IngestEvent::Loaded { pages } => Some(format!("Loaded {} document(s) from the PDF.", pages)),
        IngestEvent::Split { chunks } => Some(format!("Split the document into {} chunks.", chunks)),
        IngestEvent::Embedded { .. } | IngestEvent::Stored { .. } => None,
    }
}

fn outcome_line(outcome: &IngestOutcome) -> &'static str {
    match outcome {
        IngestOutcome::Ingested(_) => STORED_LINE,
        IngestOutcome::NoDocuments { reason, .. } => {
            tracing::debug!("Nothing ingested: {}", reason);
            NO_DOCUMENTS_LINE
        }
    }
}
