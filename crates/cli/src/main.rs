//! aixp CLI
//!
//! Main entry point for the aixp command-line tool.
//! Provides commands for index management, ingestion, grounded answers and
//! chat with an aiXplain agent.

mod commands;

use aixp_core::{config::AppConfig, logging, AppResult};
use clap::{Parser, Subcommand};
use commands::{
    AskCommand, ChatCommand, CreateIndexCommand, DemoCommand, IngestDatasetCommand,
    IngestPdfCommand, IngestWebsiteCommand, SearchCommand,
};
use std::path::PathBuf;

/// aixp - aiXplain agents with retrieval-augmented answers
#[derive(Parser, Debug)]
#[command(name = "aixp")]
#[command(about = "aiXplain agents with retrieval-augmented answers", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "AIXP_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file (default: <workspace>/.aixp/config.yaml)
    #[arg(short, long, global = true, env = "AIXP_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Index backend (aixplain, local)
    #[arg(short, long, global = true, env = "AIXP_INDEX_BACKEND")]
    backend: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new index
    CreateIndex(CreateIndexCommand),

    /// Ingest a local PDF into an index
    IngestPdf(IngestPdfCommand),

    /// Ingest the paragraphs of a web page into an index
    IngestWebsite(IngestWebsiteCommand),

    /// Ingest a CSV or JSON dataset into an index
    IngestDataset(IngestDatasetCommand),

    /// Search an index
    Search(SearchCommand),

    /// Answer a question grounded in an index
    Ask(AskCommand),

    /// Interactive back-and-forth chat with the agent
    Chat(ChatCommand),

    /// Run the end-to-end demo
    Demo(DemoCommand),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::CreateIndex(_) => "create-index",
            Commands::IngestPdf(_) => "ingest-pdf",
            Commands::IngestWebsite(_) => "ingest-website",
            Commands::IngestDataset(_) => "ingest-dataset",
            Commands::Search(_) => "search",
            Commands::Ask(_) => "ask",
            Commands::Chat(_) => "chat",
            Commands::Demo(_) => "demo",
        }
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load configuration from the selected workspace and config file
    let config = AppConfig::load_from(cli.workspace.clone(), cli.config.clone())?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.backend,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("aixp CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Index backend: {}", config.index_backend);

    config.validate()?;
    config.ensure_aixp_dir()?;

    let _span = tracing::info_span!("command", name = cli.command.name()).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::CreateIndex(cmd) => cmd.execute(&config).await,
        Commands::IngestPdf(cmd) => cmd.execute(&config).await,
        Commands::IngestWebsite(cmd) => cmd.execute(&config).await,
        Commands::IngestDataset(cmd) => cmd.execute(&config).await,
        Commands::Search(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Demo(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
