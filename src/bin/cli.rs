// src/bin/cli.rs

//! Sales feed CLI
//!
//! Polls the feed and logs what it admits.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use salesfeed::{
    error::Result,
    models::Config,
    pipeline::{Ingestor, Poller},
    services::{FeedClient, HttpFeedClient, HttpImageLoader, ImageLoader},
    storage::ItemStore,
    utils::http,
};

/// salesfeed - live sales feed poller
#[derive(Parser, Debug)]
#[command(name = "salesfeed", version, about = "Live sales feed poller")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "salesfeed.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll the feed until interrupted
    Run {
        /// Stop after this many ticks
        #[arg(long)]
        ticks: Option<u64>,
    },

    /// Poll once and print the resulting items as JSON
    Once {
        /// Seconds to wait for enrichment before printing
        #[arg(long, default_value_t = 15)]
        settle_secs: u64,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn build_poller(config: &Config) -> Result<Poller> {
    let client = http::create_async_client(&config.http)?;
    let feed: Arc<dyn FeedClient> =
        Arc::new(HttpFeedClient::new(client.clone(), config.feed.url.clone()));
    let images: Arc<dyn ImageLoader> = Arc::new(HttpImageLoader::new(client, &config.enrichment));

    let ingestor = Ingestor::from_config(
        &config.enrichment,
        ItemStore::new(),
        Arc::clone(&feed),
        images,
    );
    Ok(Poller::new(
        feed,
        Arc::new(ingestor),
        config.feed.poll_interval(),
    ))
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config);
    init_logging(cli.verbose, &config.logging.level);

    log::info!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Run { ticks } => {
            config.validate()?;
            let poller = build_poller(&config)?;

            tokio::select! {
                _ = poller.run(ticks) => {}
                _ = tokio::signal::ctrl_c() => {
                    log::info!("Interrupted");
                }
            }

            log::info!(
                "Stopped with {} items",
                poller.ingestor().store().len().await
            );
        }

        Command::Once { settle_secs } => {
            config.validate()?;
            let poller = build_poller(&config)?;

            if let Some(mut outcome) = poller.tick().await {
                if !outcome
                    .wait_for_enrichment(Duration::from_secs(settle_secs))
                    .await
                {
                    log::warn!("Enrichment still running after {}s", settle_secs);
                }
            }

            if poller.ingestor().store().is_empty().await {
                log::warn!("No items admitted from this snapshot");
            }

            let items = poller.ingestor().store().snapshot().await;
            println!("{}", serde_json::to_string_pretty(&items)?);
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK (feed {})", config.feed.url);
        }
    }

    Ok(())
}
