// src/pipeline/info.rs

use crate::error::Result;
use crate::storage::{ListingStorage, LocalStorage, RunReport};

/// Log a summary of the last written document and run report.
pub async fn run_info(storage: &LocalStorage) -> Result<Option<RunReport>> {
    let path = storage.listings_path();
    log::info!("Output file: {}", path.display());

    if path.exists() {
        let listings = storage.load_listings().await?;
        let reserved = listings.iter().filter(|l| l.reserved).count();
        log::info!("Listings: {} ({} reserved)", listings.len(), reserved);
    } else {
        log::info!("No listings written yet.");
    }

    let report = storage.load_report().await?;
    match &report {
        Some(report) => {
            log::info!("Last run: {} -> {}", report.started_at, report.finished_at);
            log::info!("Source: {}", report.source_url);
            log::info!(
                "Collected {} stubs, wrote {} listings",
                report.stub_count,
                report.listing_count
            );
            if let Some(reason) = &report.reason {
                log::info!("Stopped early: {}", reason);
            }
        }
        None => log::info!("No run report found."),
    }

    Ok(report)
}
