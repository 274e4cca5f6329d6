use casefile_core::DocType;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "casefile")]
#[command(version)]
#[command(about = "Hybrid keyword and semantic search over forensic phone extractions")]
pub struct Cli {
    /// Engine configuration file (JSON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Favorites and search history file (defaults to ~/.casefile/favorites.json)
    #[arg(long, global = true)]
    pub favorites_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Dump files or directories to load before running the command
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    #[arg(short, long = "data", required = true, num_args = 1..)]
    pub data: Vec<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search the loaded records
    Search {
        query: String,

        #[command(flatten)]
        data: DataArgs,

        /// keyword, semantic, sender or combined (anything else means combined)
        #[arg(short, long, default_value = "combined")]
        strategy: String,

        /// Maximum number of results
        #[arg(short = 'n', long, default_value_t = 500)]
        top_n: usize,

        /// Context messages on each side of a message hit (0 disables)
        #[arg(long)]
        context: Option<usize>,

        /// Do not record the query in search history
        #[arg(long)]
        no_history: bool,

        /// Return only this page of results (1-based)
        #[arg(long)]
        page: Option<usize>,

        /// Results per page when --page is given
        #[arg(long, default_value_t = 20)]
        page_size: usize,
    },

    /// List messages newest first, one page at a time
    Messages {
        #[command(flatten)]
        data: DataArgs,

        /// Page number (1-based)
        #[arg(long, default_value_t = 1)]
        page: usize,

        #[arg(long, default_value_t = 50)]
        page_size: usize,
    },

    /// Show the conversation around a message
    Context {
        message_id: String,

        #[command(flatten)]
        data: DataArgs,

        /// Messages on each side of the target
        #[arg(short, long, default_value_t = 3)]
        window: usize,

        /// Highlight this query in the context messages
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Sender, per-day and keyword statistics over messages
    Analyze {
        #[command(flatten)]
        data: DataArgs,

        /// Only messages containing any token of this query
        #[arg(short, long)]
        query: Option<String>,

        /// Inclusive lower time bound
        #[arg(long)]
        start: Option<String>,

        /// Inclusive upper time bound
        #[arg(long)]
        end: Option<String>,
    },

    /// Load data and report corpus and ingestion statistics
    Stats {
        #[command(flatten)]
        data: DataArgs,
    },

    /// Manage bookmarked documents
    Favorites {
        #[command(subcommand)]
        action: Option<FavoriteAction>,
    },

    /// Show or clear search history
    History {
        /// Clear the history
        #[arg(long)]
        clear: bool,
    },

    /// Print version information
    Version,
}

#[derive(Subcommand)]
pub enum FavoriteAction {
    /// List favorites, resolved against data when given
    List {
        #[arg(short, long = "data", num_args = 1..)]
        data: Vec<PathBuf>,
    },
    /// Bookmark a document
    Add {
        doc_type: DocType,
        id: String,
        /// Query the document was found with
        #[arg(short, long, default_value = "")]
        query: String,
    },
    /// Remove a bookmark
    Remove { doc_type: DocType, id: String },
}
