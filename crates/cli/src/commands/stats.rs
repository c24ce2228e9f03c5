//! Stats command handler.
//!
//! Reports what the vector store holds without touching any remote service.

use crate::commands::print_json;
use clap::Args;
use guide_core::{config::AppConfig, AppResult};

/// Show vector store statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let stats = guide_knowledge::stats(&config.store_path())?;

        if self.json {
            return print_json(&stats);
        }

        println!("Store: {}", stats.store_path.display());
        println!("Sources: {}", stats.sources_count);
        println!("Chunks: {}", stats.chunks_count);
        println!("Embedding model: {} ({} dimensions)", stats.embedding_model, stats.dimensions);
        println!("Database size: {} bytes", stats.db_size_bytes);
        match stats.last_ingest_at {
            Some(at) => println!("Last ingest: {}", at.to_rfc3339()),
            None => println!("Last ingest: never"),
        }

        Ok(())
    }
}
