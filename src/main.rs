//! # MicroplasticsWatch CLI (`mpw`)
//!
//! Reads the MicroplasticsWatch research library and whitepaper from the
//! terminal and runs the social preview server.
//!
//! ## Usage
//!
//! ```bash
//! mpw --config ./config/mpw.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `mpw docs` | List all library documents |
//! | `mpw search "<query>"` | Search the library with highlighted snippets |
//! | `mpw view <id>` | Read one page of a document |
//! | `mpw open <link>` | Follow a viewer deep link |
//! | `mpw whitepaper` | Read the whitepaper by chapter |
//! | `mpw preview <id>` | Print a story's social preview page |
//! | `mpw serve` | Start the preview server |
//!
//! When the config file does not exist, built-in defaults are used.
//! `MPW_API_BASE_URL` overrides the backend URL and `MPW_API_TOKEN`
//! supplies a bearer token.

use clap::{Parser, Subcommand};
use microplastics_watch::api::{session_from_env, ApiClient};
use microplastics_watch::config::{self, Config};
use microplastics_watch::{logging, preview, search, server, view, whitepaper};
use std::path::PathBuf;

/// MicroplasticsWatch reader: research library search, document viewer,
/// whitepaper chapters, and social previews.
#[derive(Parser)]
#[command(
    name = "mpw",
    about = "MicroplasticsWatch reader: search the research library, read documents and the whitepaper",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/mpw.toml`. Built-in defaults apply when the
    /// file does not exist.
    #[arg(long, global = true, default_value = "./config/mpw.toml")]
    config: PathBuf,

    /// Log request-level detail to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all documents in the research library.
    Docs {
        /// Page of the list to show.
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Search the research library.
    ///
    /// Matches are case-insensitive and literal. Each result lists up to
    /// three snippets with a viewer link that opens the page holding the
    /// match.
    Search {
        /// The search query string.
        query: String,

        /// Page of results to show.
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Results per page (defaults to `[library].page_size`).
        #[arg(long)]
        limit: Option<usize>,

        /// Restrict the search to these document ids. Repeatable.
        #[arg(long = "doc")]
        documents: Vec<String>,
    },

    /// Read one page of a document.
    View {
        /// Document id.
        id: String,

        /// Term to highlight on the page.
        #[arg(long)]
        highlight: Option<String>,

        /// Page to open (500 words per page).
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Open a viewer link such as `/research-library/42?highlight=pfas&page=3`.
    Open {
        /// Path or full URL of the viewer page.
        link: String,
    },

    /// Read the whitepaper.
    ///
    /// Loads every chapter, prints the table of contents, and shows the
    /// chapter whose slug is given (or the first one).
    Whitepaper {
        /// Chapter slug, e.g. `04-human-exposure`.
        #[arg(long)]
        chapter: Option<String>,
    },

    /// Print the social preview page for a news story.
    Preview {
        /// Story id.
        id: String,
    },

    /// Start the preview server.
    ///
    /// Serves `GET /story/{id}` and, with a corpus file, the public library
    /// API from memory.
    Serve {
        /// Corpus JSON file (`{"documents": [...], "stories": [...]}`).
        #[arg(long)]
        corpus: Option<PathBuf>,
    },
}

fn load_or_default(path: &std::path::Path) -> anyhow::Result<Config> {
    if path.exists() {
        config::load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::minimal())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let cfg = load_or_default(&cli.config)?;

    match cli.command {
        Commands::Docs { page } => {
            let client = ApiClient::new(&cfg.api, session_from_env())?;
            search::run_docs(&cfg, &client, page).await?;
        }
        Commands::Search {
            query,
            page,
            limit,
            documents,
        } => {
            let client = ApiClient::new(&cfg.api, session_from_env())?;
            search::run_search(&cfg, &client, &query, page, limit, documents).await?;
        }
        Commands::View {
            id,
            highlight,
            page,
        } => {
            let client = ApiClient::new(&cfg.api, session_from_env())?;
            view::run_view(&client, &id, highlight, page).await?;
        }
        Commands::Open { link } => {
            let client = ApiClient::new(&cfg.api, session_from_env())?;
            view::run_open(&client, &link).await?;
        }
        Commands::Whitepaper { chapter } => {
            whitepaper::run_whitepaper(&cfg, chapter.as_deref()).await?;
        }
        Commands::Preview { id } => {
            let client = ApiClient::new(&cfg.api, session_from_env())?;
            preview::run_preview(&cfg, &client, &id).await?;
        }
        Commands::Serve { corpus } => {
            server::run_server(&cfg, corpus.as_deref()).await?;
        }
    }

    Ok(())
}
