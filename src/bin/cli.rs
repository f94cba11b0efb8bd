//! Release Tracker CLI
//!
//! One-shot catalog commands plus `serve`, which reads chat commands from
//! stdin and runs the daily purge job in the background.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use clap::{Parser, Subcommand};
use release_tracker::{
    commands::{Command as ChatCommand, CommandHandler},
    error::Result,
    models::Config,
    pipeline::{PurgeJob, run_session, spawn_line_reader},
    services::{NewRelease, ReleaseCatalog},
    storage::{MemoryRepository, ReleaseRepository, SqliteRepository},
    utils::http::HttpFetcher,
};
use tokio::sync::watch;

/// Release Tracker - upcoming set release catalog
#[derive(Parser, Debug)]
#[command(
    name = "release-tracker",
    version,
    about = "Tracks upcoming Magic: The Gathering set releases"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Use a throwaway in-memory store instead of the database file
    #[arg(long)]
    in_memory: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a release by hand
    Add {
        code: String,
        name: String,
        /// Preview start (YYYY-MM-DD)
        preview_date: String,
        /// Release date (YYYY-MM-DD)
        release_date: String,
        /// Official announcement link
        link: String,
    },

    /// Add a release from its announcement page
    Scrape { url: String },

    /// Show one release
    Find { code: String },

    /// Show every release
    List {
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove a release
    Delete { code: String },

    /// Remove releases past the retention window now
    Purge,

    /// Validate the configuration file
    Validate,

    /// Read chat commands from stdin and run the daily purge job
    Serve,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn open_repository(config: &Config, in_memory: bool) -> Result<Arc<dyn ReleaseRepository>> {
    if in_memory {
        log::info!("Using in-memory release store");
        return Ok(Arc::new(MemoryRepository::new()));
    }
    Ok(Arc::new(SqliteRepository::open(&config.database.path)?))
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);
    log::debug!("Loaded configuration from {}", cli.config.display());

    log::debug!("Validating configuration...");
    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }
    if let Command::Validate = cli.command {
        log::info!("✓ Config OK");
        return Ok(());
    }

    let repository = open_repository(&config, cli.in_memory)?;
    let fetcher = Arc::new(HttpFetcher::from_config(&config.scraper)?);
    let catalog = ReleaseCatalog::new(
        Arc::clone(&repository),
        fetcher,
        config.scraper.clone(),
        config.purge.retention(),
    )?;
    let handler = CommandHandler::new(catalog, config.bot.prefix.clone());

    let outcome = run_command(cli.command, &handler, &config, &repository).await;

    repository.close().await?;
    outcome
}

async fn run_command(
    command: Command,
    handler: &CommandHandler,
    config: &Config,
    repository: &Arc<dyn ReleaseRepository>,
) -> Result<()> {
    let chat_command = match command {
        Command::Add {
            code,
            name,
            preview_date,
            release_date,
            link,
        } => ChatCommand::AddSet(NewRelease {
            code,
            name,
            preview_date,
            release_date,
            source_link: link,
        }),
        Command::Scrape { url } => ChatCommand::ScrapeSet { url },
        Command::Find { code } => ChatCommand::FindSet { code },
        Command::List { json: false } => ChatCommand::ListSets,
        Command::Delete { code } => ChatCommand::DeleteSet { code },

        Command::List { json: true } => {
            let records = handler.catalog().list().await?;
            println!("{}", serde_json::to_string_pretty(&records)?);
            return Ok(());
        }

        Command::Purge => {
            let removed = handler
                .catalog()
                .purge_expired(Local::now().date_naive())
                .await?;
            log::info!("Removed {} expired release(s)", removed);
            return Ok(());
        }

        Command::Serve => return serve(handler, config, repository).await,

        // Handled before the store is opened.
        Command::Validate => return Ok(()),
    };

    let lookup = matches!(chat_command, ChatCommand::FindSet { .. });
    match handler.try_execute(chat_command).await {
        Ok(reply) => {
            print!("{}", reply);
            Ok(())
        }
        Err(e) => {
            log::error!("{}", handler.error_text(&e, lookup));
            Err(e)
        }
    }
}

async fn serve(
    handler: &CommandHandler,
    config: &Config,
    repository: &Arc<dyn ReleaseRepository>,
) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let purge = PurgeJob::new(
        Arc::clone(repository),
        config.purge.interval()?,
        config.purge.retention(),
    )?
    .spawn(shutdown_rx);

    log::info!(
        "Listening for `{}` commands on stdin (Ctrl+D or Ctrl+C to stop)",
        handler.prefix()
    );

    let lines = spawn_line_reader(std::io::BufReader::new(std::io::stdin()));
    let stdout = tokio::io::stdout();
    let outcome = tokio::select! {
        result = run_session(handler, lines, stdout) => result.map(|_| ()),
        _ = tokio::signal::ctrl_c() => {
            log::info!("Shutdown requested");
            Ok(())
        }
    };

    let _ = shutdown_tx.send(true);
    if let Err(e) = purge.await {
        log::error!("Purge job ended abnormally: {}", e);
    }

    outcome
}
