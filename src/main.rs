//! ArtVector - semantic search for museum collection data
//!
//! ArtVector ingests tabular collection records, embeds their textual
//! descriptions through an Ollama model, persists the vectors in
//! PostgreSQL, and serves nearest-neighbor text search over whatever has
//! been embedded so far.

use artvector_cli::commands::execute_command;
use artvector_cli::{IndexArgs, IngestArgs, InitArgs, SearchArgs, ServeArgs, StatusArgs};
use artvector_core::{init_logging_with_config, Result};
use clap::{Parser, Subcommand};
use tracing::error;

#[derive(Parser)]
#[command(name = "artvector")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "ArtVector - incremental embedding ingestion and semantic search")]
#[command(long_about = r#"
ArtVector turns tabular museum-collection records into a semantically
searchable index. Records are ingested with no embedding, promoted to
embedded in resumable batches against an Ollama model, and searched with
cosine similarity over whatever subset has been embedded so far.

Typical flow:
    artvector init                          # write a default config
    artvector ingest --file objects.json    # load records
    artvector index                         # embed them
    artvector search "bronze statue"        # query
    artvector serve                         # or expose it all over HTTP
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log output format (pretty, json, compact)
    #[arg(long, default_value = "pretty", global = true)]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest records from a JSON file into a new dataset
    Ingest(IngestArgs),

    /// Embed pending objects in batches
    Index(IndexArgs),

    /// Search embedded objects by text
    Search(SearchArgs),

    /// Show indexing progress and datasets
    Status(StatusArgs),

    /// Start the HTTP server
    Serve(ServeArgs),

    /// Write a default configuration file
    Init(InitArgs),

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    if let Err(e) = init_logging_with_config(log_level, &cli.log_format) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(cli).await {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(artvector_cli::exit_code_for_error(&e));
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Ingest(args) => execute_command(args).await,
        Commands::Index(args) => execute_command(args).await,
        Commands::Search(args) => execute_command(args).await,
        Commands::Status(args) => execute_command(args).await,
        Commands::Serve(args) => execute_command(args).await,
        Commands::Init(args) => execute_command(args).await,
        Commands::Version => {
            println!(
                "artvector v{} (core v{})",
                env!("CARGO_PKG_VERSION"),
                artvector_core::VERSION
            );
            Ok(())
        }
    }
}
