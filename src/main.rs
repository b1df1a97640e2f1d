//! # QueryWise CLI (`qw`)
//!
//! The `qw` binary drives the query workflow controller against the built-in
//! mock collaborators: ask questions, inspect retrieved snippets, list and
//! upload documents.
//!
//! ## Usage
//!
//! ```bash
//! qw --config ./config/qw.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `qw ask "<query>"` | Retrieve snippets (if needed) and generate an answer |
//! | `qw search "<query>"` | Retrieve snippets only |
//! | `qw docs` | List documents in the store |
//! | `qw upload <files>...` | Upload files, then refresh the document list |
//! | `qw models` | List supported models |
//!
//! ## Examples
//!
//! ```bash
//! # Ask with the configured default model
//! qw ask "What drove revenue growth?"
//!
//! # Pick a model and enable every generation option
//! qw ask "Summarize the risks" --model Claude --web --knowledge --detailed
//!
//! # Upload with machine-readable progress
//! qw upload q1.pdf q2.pdf --progress json
//! ```
//!
//! Set `RUST_LOG=querywise=debug` for controller logs on stderr.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use querywise::catalog::ModelChoice;
use querywise::commands::{self, OptionFlags, Session};
use querywise::config;
use querywise::progress::ProgressMode;

/// QueryWise CLI: ask questions about your documents.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. A missing file means built-in defaults.
#[derive(Parser)]
#[command(
    name = "qw",
    about = "QueryWise: document question answering",
    version,
    long_about = "QueryWise retrieves relevant snippets from uploaded documents and asks a \
    selected model to answer questions about them. This build runs against mock retrieval, \
    generation, and document store collaborators with configurable latency."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/qw.toml`.
    #[arg(long, global = true, default_value = "./config/qw.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Generate an answer to a question.
    ///
    /// Retrieves snippets first, then asks the selected model. Flags turn
    /// generation options on in addition to those enabled in the config.
    Ask {
        /// The question.
        query: String,

        /// Model id: ChatGPT, "Google Gemini", Claude, or Auto.
        #[arg(long)]
        model: Option<ModelChoice>,

        /// Include web search results.
        #[arg(long)]
        web: bool,

        /// Include external knowledge.
        #[arg(long)]
        knowledge: bool,

        /// Request a detailed explanation.
        #[arg(long)]
        detailed: bool,

        /// Print the retrieved snippets before the answer.
        #[arg(long)]
        show_snippets: bool,
    },

    /// Retrieve snippets relevant to a query.
    Search {
        /// The query.
        query: String,
    },

    /// List documents in the store.
    Docs,

    /// Upload one or more files.
    ///
    /// Files are uploaded one at a time. A failed file does not stop the
    /// rest; the command exits non-zero if any file failed.
    Upload {
        /// Files to upload.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Progress output on stderr. Defaults to human when stderr is a
        /// terminal, otherwise off.
        #[arg(long, value_enum)]
        progress: Option<ProgressMode>,
    },

    /// List supported models.
    Models,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cfg = config::load_config_or_default(&cli.config)?;
    let mut session = Session::from_config(&cfg);

    match cli.command {
        Commands::Ask {
            query,
            model,
            web,
            knowledge,
            detailed,
            show_snippets,
        } => {
            let flags = OptionFlags {
                knowledge,
                web,
                detailed,
            };
            commands::run_ask(&mut session, &query, model, flags, show_snippets).await?;
        }
        Commands::Search { query } => {
            commands::run_search(&mut session, &query).await?;
        }
        Commands::Docs => {
            commands::run_docs(&mut session).await?;
        }
        Commands::Upload { files, progress } => {
            let mode = progress.unwrap_or_else(ProgressMode::default_for_tty);
            commands::run_upload(&mut session, &files, mode).await?;
        }
        Commands::Models => {
            commands::run_models()?;
        }
    }

    Ok(())
}
