//! # docrag CLI
//!
//! The `docrag` binary is the operator interface: one-shot PDF ingestion,
//! one-shot questions, the HTTP query server, and store statistics.
//!
//! ## Usage
//!
//! ```bash
//! docrag --config ./config/docrag.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docrag ingest <pdf>` | Extract, chunk, embed, and store a PDF incrementally |
//! | `docrag ingest <pdf> --reset` | Destroy the store first, then ingest |
//! | `docrag query "<question>"` | Answer a question with cited source identifiers |
//! | `docrag serve` | Start the HTTP query server |
//! | `docrag stats` | Show record counts and database size |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use docrag::{config, ingest, query, server, stats};

/// docrag — a local-first PDF question answering service.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/docrag.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "docrag",
    about = "docrag — PDF question answering with incremental vector ingestion",
    version,
    long_about = "docrag ingests PDF documents into a SQLite-backed vector store, assigning \
    each chunk a deterministic identifier so re-ingestion only adds unseen chunks, and answers \
    questions by retrieving the most similar passages and forwarding them to a language model."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/docrag.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Ingest a PDF into the vector store.
    ///
    /// Extracts each page's text, splits it into overlapping chunks,
    /// assigns deterministic identifiers, and upserts only chunks whose
    /// identifier the store does not already hold. Re-running over an
    /// unchanged PDF adds nothing.
    Ingest {
        /// Path to the PDF file.
        pdf: PathBuf,

        /// Destroy the entire store (all records, irrecoverably) before
        /// ingesting.
        #[arg(long)]
        reset: bool,

        /// Show page and chunk counts without writing to the store.
        #[arg(long)]
        dry_run: bool,
    },

    /// Answer a question from the ingested corpus.
    ///
    /// Retrieves the top-k most similar chunks, renders them into the QA
    /// prompt, and prints the model's answer with the cited source
    /// identifiers.
    Query {
        /// The question to answer.
        question: String,

        /// Number of chunks to retrieve (defaults to retrieval.top_k).
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Start the HTTP query server.
    ///
    /// Exposes `POST /api/v1/query` and `GET /health` on the configured
    /// bind address.
    Serve,

    /// Show store statistics.
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Ingest {
            pdf,
            reset,
            dry_run,
        } => {
            ingest::run_ingest(&cfg, &pdf, reset, dry_run).await?;
        }
        Commands::Query { question, top_k } => {
            query::run_query(&cfg, &question, top_k).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
    }

    Ok(())
}
