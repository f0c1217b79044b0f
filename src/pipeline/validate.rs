// src/pipeline/validate.rs

use std::path::Path;

use crate::config::load_config;
use crate::error::Result;
use crate::models::{Config, MediaBackend};

/// Load and validate the configuration file, logging the effective values.
pub fn run_validate(config_path: &Path) -> Result<Config> {
    log::info!("Validating configuration in {}...", config_path.display());

    let config = load_config(config_path).inspect_err(|e| {
        log::error!("Config validation failed: {}", e);
    })?;

    let scraper = &config.scraper;
    log::info!("✓ Config OK");
    log::info!("  engine: {:?} (headless: {})", scraper.engine, scraper.headless);
    log::info!("  user agent: {}", scraper.user_agent);
    log::info!(
        "  timeouts: listing {}s, detail {}s, condition {}ms",
        scraper.listing_timeout_secs,
        scraper.detail_timeout_secs,
        scraper.condition_timeout_ms
    );
    log::info!("  output: {}", config.output.path().display());

    let media = &config.media;
    match (media.enabled, media.backend) {
        (false, _) => log::info!("  media: disabled"),
        (true, MediaBackend::Local) => {
            log::info!("  media: local ({})", media.local_dir.display())
        }
        (true, MediaBackend::S3) => log::info!("  media: s3 (bucket from environment)"),
    }

    Ok(config)
}
