mod cli;
mod commands;

use casefile_core::{SearchRequest, Strategy};
use clap::Parser;
use cli::{Cli, Commands, FavoriteAction};

fn main() -> anyhow::Result<()> {
    // Initialize tracing; stdout is reserved for JSON output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;
    let favorites_file = cli.favorites_file.as_deref();

    match cli.command {
        Commands::Search {
            query,
            data,
            strategy,
            top_n,
            context,
            no_history,
            page,
            page_size,
        } => {
            let mut request = SearchRequest::new(query, Strategy::from(strategy.as_str()), top_n);
            if let Some(page) = page {
                request = request.with_page(page, page_size);
            }
            request.context_window = context;
            commands::search::run(config, favorites_file, &data.data, &request, !no_history)
        }
        Commands::Context {
            message_id,
            data,
            window,
            query,
        } => commands::context::run(config, &data.data, &message_id, window, query.as_deref()),
        Commands::Analyze {
            data,
            query,
            start,
            end,
        } => commands::analyze::run(config, &data.data, query.as_deref(), start, end),
        Commands::Messages {
            data,
            page,
            page_size,
        } => commands::messages::run(config, &data.data, page, page_size),
        Commands::Stats { data } => commands::stats::run(config, &data.data),
        Commands::Favorites { action } => match action {
            Some(FavoriteAction::List { data }) => {
                commands::favorites::run_list(config, favorites_file, &data)
            }
            None => commands::favorites::run_list(config, favorites_file, &[]),
            Some(FavoriteAction::Add { doc_type, id, query }) => {
                commands::favorites::run_add(favorites_file, doc_type, &id, &query)
            }
            Some(FavoriteAction::Remove { doc_type, id }) => {
                commands::favorites::run_remove(favorites_file, doc_type, &id)
            }
        },
        Commands::History { clear } => commands::history::run(favorites_file, clear),
        Commands::Version => commands::version::run(),
    }
}
