use anyhow::Context;
use clap::Parser;
use quotd_core::{Config, Quote, QuoteController, QuoteRepository};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "quotd")]
#[command(version, about = "Quotes in your terminal, cached for offline reading", long_about = None)]
struct Cli {
    /// Config file (defaults to <config_dir>/quotd/config.toml)
    #[arg(long, global = true, env = "QUOTD_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database holding the quote cache and favourites
    #[arg(long, global = true, env = "QUOTD_DATABASE")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Interactive terminal UI (default)
    Tui,
    /// Print the next quote of the cached batch
    Next,
    /// Step back one quote (only after `next` in the same run)
    Previous,
    /// Print the quote of the day
    Today,
    /// Replace the cached batch with fresh quotes
    Refresh,
    /// Show cache and cursor state
    Status,
    /// Manage favourite quotes
    #[command(subcommand)]
    Favourites(FavouriteCommands),
}

#[derive(clap::Subcommand)]
enum FavouriteCommands {
    /// List saved favourites, newest first
    List,
    /// Save a quote as favourite
    Add {
        /// Quote text
        text: String,
        /// Quote author
        author: String,
    },
    /// Remove a saved favourite
    Remove {
        /// Quote text
        text: String,
        /// Quote author
        author: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, None | Some(Commands::Tui));

    // The TUI owns the screen, so only warnings get through there
    let default_filter = if interactive { "quotd=warn" } else { "quotd=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load config")?;

    if let Some(database) = cli.database {
        config.cache.database_path = Some(database);
    }

    let repository = Arc::new(QuoteRepository::open(&config).context("Failed to open quote store")?);

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let controller = QuoteController::new(repository);
            let app = quotd_tui::App::new(config.ui.show_today_quote);
            quotd_tui::run_tui(app, controller).await?;
        }
        Commands::Next => {
            let quote = repository.get_next_quote().await?;
            print_quote(&quote);
        }
        Commands::Previous => {
            let quote = repository.get_previous_quote().await?;
            print_quote(&quote);
        }
        Commands::Today => {
            let quote = repository.get_today_quote().await?;
            print_quote(&quote);
        }
        Commands::Refresh => {
            if !repository.force_refresh_cache().await {
                anyhow::bail!("Failed to refresh quotes");
            }
            let count = repository.cached_quotes().await?.len();
            println!("Cached {} fresh quotes", count);
        }
        Commands::Status => {
            let cached = repository.cached_quotes().await?;
            let saved = repository.saved_position()?;
            let favourites = repository.subscribe_favourites().borrow().len();

            println!("Database:    {}", config.database_path()?.display());
            println!("Preferences: {}", config.preferences_path()?.display());
            println!("Cached:      {} quotes", cached.len());
            println!("Expires:     after {} hours", config.cache.expiration_hours);
            println!("Position:    {}", describe_position(saved, cached.len()));
            println!("Favourites:  {}", favourites);
        }
        Commands::Favourites(FavouriteCommands::List) => {
            let favourites = repository.subscribe_favourites().borrow().clone();
            if favourites.is_empty() {
                println!("No favourites yet");
            }
            for quote in favourites {
                print_quote(&quote);
            }
        }
        Commands::Favourites(FavouriteCommands::Add { text, author }) => {
            repository.add_favourite(&text, &author).await?;
            println!("Saved {}", Quote::new(text, author));
        }
        Commands::Favourites(FavouriteCommands::Remove { text, author }) => {
            repository.remove_favourite(&text, &author).await?;
            println!("Removed {}", Quote::new(text, author));
        }
    }

    Ok(())
}

fn print_quote(quote: &Quote) {
    println!("{}", quote);
}

/// Saved cursor position as shown by `status`
fn describe_position(saved: Option<i64>, cached: usize) -> String {
    match saved {
        None | Some(-1) => "start of batch".to_string(),
        Some(position) => format!("quote {} of {}", position + 1, cached),
    }
}
