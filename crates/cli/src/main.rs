//! Guide CLI
//!
//! Main entry point for the guide command-line tool.
//! Ingests a PDF into a local vector store and answers questions about it.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, IngestCommand, StatsCommand};
use guide_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// Guide - question answering over a PDF with retrieval-augmented generation
#[derive(Parser, Debug)]
#[command(name = "guide")]
#[command(about = "Question answering over a PDF with retrieval-augmented generation", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "GUIDE_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file (default: guide.yaml in the workspace)
    #[arg(short, long, global = true, env = "GUIDE_CONFIG")]
    config: Option<PathBuf>,

    /// Vector store directory (default: vector_db)
    #[arg(short, long, global = true, env = "GUIDE_STORE")]
    store: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a PDF, split it into chunks and store their embeddings
    Ingest(IngestCommand),

    /// Answer questions from the stored embeddings
    Ask(AskCommand),

    /// Show vector store statistics
    Stats(StatsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.workspace, cli.config)?.with_overrides(
        cli.store,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Guide CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Store: {:?}", config.store_path());

    config.validate()?;

    let command_name = match &cli.command {
        Commands::Ingest(_) => "ingest",
        Commands::Ask(_) => "ask",
        Commands::Stats(_) => "stats",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ingest(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
