// src/main.rs

//! exwatch CLI
//!
//! One invocation per cycle; an external scheduler provides the cadence.
//! Exits non-zero only on configuration problems, never on transient
//! fetch, notify, or store failures.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use exwatch::{
    config::{GistCredentials, TelegramCredentials},
    error::Result,
    models::{Config, StoreBackend},
    notify::TelegramNotifier,
    pipeline::{run::state_key, run_monitor},
    services::{ArticleExtractor, HtmlExtractor},
    storage::{GistStore, LocalStore, StateStore},
    utils::http,
};

/// exwatch - news listing monitor
#[derive(Parser, Debug)]
#[command(
    name = "exwatch",
    version,
    about = "Watches news listing pages and pushes Telegram alerts for new articles"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one monitoring cycle: fetch, diff, notify, persist
    Run,

    /// Fetch and print current matches without notifying or saving
    Check,

    /// Validate the configuration file
    Validate,

    /// Show persisted state summary per source
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Build the configured state store backend.
///
/// The gist backend needs credentials from the environment; resolving them
/// here keeps the failure fatal and ahead of any network call.
fn build_store(config: &Config, client: &reqwest::Client) -> Result<Box<dyn StateStore>> {
    match config.store.backend {
        StoreBackend::Gist => Ok(Box::new(GistStore::new(
            client.clone(),
            GistCredentials::from_env()?,
        ))),
        StoreBackend::Local => Ok(Box::new(LocalStore::new(&config.store.local_dir))),
    }
}

fn build_extractor(config: &Config, client: reqwest::Client) -> HtmlExtractor {
    HtmlExtractor::new(
        client,
        config.monitor.clone(),
        config.cleaning.clone(),
        config.store.utc_offset(),
    )
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("exwatch starting...");

    let config = Config::load_or_default(&cli.config);

    match cli.command {
        Command::Run => {
            config.validate()?;

            let client = http::create_client(&config.monitor)?;
            let notifier = TelegramNotifier::new(client.clone(), TelegramCredentials::from_env()?);
            let store = build_store(&config, &client)?;
            let extractor = build_extractor(&config, client);

            run_monitor(&config, &extractor, store.as_ref(), &notifier).await?;
        }

        Command::Check => {
            config.validate()?;

            let client = http::create_client(&config.monitor)?;
            let extractor = build_extractor(&config, client);
            let delay = std::time::Duration::from_millis(config.monitor.request_delay_ms);

            for (index, source) in config.sources.iter().enumerate() {
                match extractor.fetch(source).await {
                    Ok(articles) if articles.is_empty() => {
                        log::warn!("[{}] nothing matched", source.id);
                    }
                    Ok(articles) => {
                        log::info!("[{}] {} current articles:", source.id, articles.len());
                        for article in &articles {
                            log::info!("    {} ({})", article.title, article.link);
                        }
                    }
                    Err(e) => log::warn!("[{}] fetch failed: {}", source.id, e),
                }

                if index + 1 < config.sources.len() && !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }

            log::info!(
                "Config OK ({} sources, {}h retention, {} store)",
                config.sources.len(),
                config.monitor.retention_hours,
                match config.store.backend {
                    StoreBackend::Gist => "gist",
                    StoreBackend::Local => "local",
                }
            );
        }

        Command::Info => {
            config.validate()?;

            let client = http::create_client(&config.monitor)?;
            let store = build_store(&config, &client)?;

            for source in &config.sources {
                match store.load(&state_key(&source.id)).await {
                    Ok(Some(state)) => log::info!(
                        "[{}] {} remembered titles, last updated {}",
                        source.id,
                        state.articles.len(),
                        state.last_updated
                    ),
                    Ok(None) => log::info!("[{}] no state yet", source.id),
                    Err(e) => log::warn!("[{}] state load failed: {}", source.id, e),
                }
            }
        }
    }

    log::info!("Done!");

    Ok(())
}
