//! Listing Scraper CLI
//!
//! Local execution entry point.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use listing_scraper::{
    browser,
    error::Result,
    media,
    models::Config,
    pipeline::{self, ScrapeRequest},
    services::UuidGenerator,
    storage::LocalStorage,
};

/// Marketplace listing scraper
#[derive(Parser, Debug)]
#[command(
    name = "listing-scraper",
    version,
    about = "Scrapes marketplace listings and their detail pages into JSON"
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
    /// Scrape a search-results page and its listings
    Scrape {
        /// Search-results page URL
        url: String,

        /// Category tag attached to every listing
        #[arg(long)]
        category: Option<String>,

        /// Keep source image URLs instead of re-hosting them
        #[arg(long)]
        no_rehost: bool,

        /// Output file (default: {output.dir}/{output.file_name})
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate the configuration file
    Validate,

    /// Show the last written output and run report
    Info {
        /// Output file (default: {output.dir}/{output.file_name})
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Storage for `--output`, or the configured location.
fn storage_for(output: Option<PathBuf>, config: &Config) -> Result<LocalStorage> {
    match output {
        Some(path) => LocalStorage::at_path(&path),
        None => Ok(LocalStorage::from_config(&config.output)),
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Scrape {
            url,
            category,
            no_rehost,
            output,
        } => {
            let config = pipeline::run_validate(&cli.config)?;
            let storage = storage_for(output, &config)?;

            // Credentials are checked before any page is opened.
            let media = media::create_rehost(&config, no_rehost).await?;
            let sessions = browser::create_factory(&config)?;

            let request = ScrapeRequest { url, category };
            let report = pipeline::run_scraper(
                &config,
                sessions.as_ref(),
                &UuidGenerator,
                &media,
                &storage,
                &request,
            )
            .await?;

            log::info!(
                "Scrape complete: {} of {} listings written",
                report.listing_count,
                report.stub_count
            );
        }

        Command::Validate => {
            pipeline::run_validate(&cli.config)?;
            log::info!("All validations passed!");
        }

        Command::Info { output } => {
            let config = listing_scraper::config::load_config(&cli.config)?;
            let storage = storage_for(output, &config)?;
            pipeline::run_info(&storage).await?;
        }
    }

    Ok(())
}
