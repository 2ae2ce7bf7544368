//! # docsage CLI
//!
//! The `docsage` binary ingests a markdown corpus into a vector index and
//! queries it.
//!
//! ## Usage
//!
//! ```bash
//! docsage --config ./config/docsage.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docsage ingest` | Load, chunk, embed and store the corpus |
//! | `docsage chunks <file>` | Print the chunks of one markdown file |
//! | `docsage retrieve "<query>"` | Print the closest chunks as JSON |
//! | `docsage eval` | Precision@k over the configured question set |
//!
//! Logs go to stderr; set `RUST_LOG=debug` for more detail.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use docsage::config;
use docsage::{chunks_cmd, eval_cmd, ingest, retrieve_cmd};

/// docsage: heading-aware markdown ingestion and retrieval.
///
/// All commands except `chunks` read a TOML configuration file.
/// See `config/docsage.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "docsage",
    about = "Heading-aware markdown ingestion and retrieval for documentation assistants",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/docsage.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest the corpus.
    ///
    /// Loads every matching markdown file, chunks it, embeds the chunks and
    /// replaces the configured collection. Any unreadable file aborts the
    /// run before the index is touched.
    Ingest {
        /// Show document and chunk counts without embedding or writing.
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the chunks of one markdown file.
    ///
    /// Works without a config file.
    Chunks {
        /// Markdown file to chunk.
        file: PathBuf,

        /// Override `chunking.max_chars`.
        #[arg(long)]
        max_chars: Option<usize>,
    },

    /// Retrieve the chunks most similar to a query.
    Retrieve {
        /// The query string.
        query: String,

        /// Number of chunks to return (1-20).
        #[arg(long)]
        top_k: Option<usize>,

        /// Show section, chunk index and a text preview per result.
        #[arg(long)]
        debug: bool,
    },

    /// Run the retrieval evaluation over `[[eval.cases]]`.
    Eval {
        /// Number of chunks retrieved per question (1-20).
        #[arg(long)]
        top_k: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let load = || config::load_config(&cli.config);

    match cli.command {
        Commands::Chunks { file, max_chars } => {
            // Use config if available, otherwise defaults
            let cfg = load().unwrap_or_else(|_| config::Config::minimal());
            let max_chars = max_chars.unwrap_or(cfg.chunking.max_chars);
            if max_chars == 0 {
                anyhow::bail!("--max-chars must be > 0");
            }
            chunks_cmd::run_chunks(&file, max_chars)?;
        }
        Commands::Ingest { dry_run } => {
            ingest::run_ingest(&load()?, dry_run).await?;
        }
        Commands::Retrieve {
            query,
            top_k,
            debug,
        } => {
            retrieve_cmd::run_retrieve(&load()?, &query, top_k, debug).await?;
        }
        Commands::Eval { top_k } => {
            eval_cmd::run_eval_cmd(&load()?, top_k).await?;
        }
    }

    Ok(())
}
