// src/pipeline/scrape.rs

//! Listing scrape pipeline.
//!
//! Phase 1 collects stubs from the results page, phase 2 enriches them from
//! their detail pages. Each phase owns one session and closes it before
//! returning. Whatever was gathered is written, even when nothing was.

use chrono::Utc;

use crate::browser::{SessionFactory, close_quietly};
use crate::error::Result;
use crate::media::MediaRehost;
use crate::models::{Config, ListingStub};
use crate::services::{DetailEnricher, EnrichmentOutcome, IdGenerator, ListingCollector};
use crate::storage::{ListingStorage, RunReport};

/// What to scrape.
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    /// Search-results page URL
    pub url: String,
    /// Tag attached to every listing
    pub category: Option<String>,
}

/// Run the listing scraper.
pub async fn run_scraper(
    config: &Config,
    sessions: &dyn SessionFactory,
    ids: &dyn IdGenerator,
    media: &MediaRehost,
    storage: &dyn ListingStorage,
    request: &ScrapeRequest,
) -> Result<RunReport> {
    let started_at = Utc::now();
    log::info!(
        "Scraping {} with the {} engine ({})",
        request.url,
        sessions.name(),
        if media.is_pass_through() {
            "source image URIs"
        } else {
            "re-hosting images"
        }
    );

    let stubs = collect_stubs(config, sessions, ids, &request.url).await?;
    let stub_count = stubs.len();

    let outcome = if stubs.is_empty() {
        log::warn!("No listings found on {}", request.url);
        EnrichmentOutcome::default()
    } else {
        enrich_stubs(config, sessions, media, request.category.clone(), stubs).await?
    };

    let written = storage.write_listings(&outcome.listings).await?;

    let report = RunReport {
        started_at,
        finished_at: Utc::now(),
        source_url: request.url.clone(),
        category: request.category.clone(),
        stub_count,
        listing_count: written.count,
        stopped_early: outcome.stopped_early,
        reason: outcome.reason,
    };
    storage.write_report(&report).await?;

    if report.stopped_early {
        log::warn!(
            "Stopped after {} of {} listings, saved to {}",
            report.listing_count,
            stub_count,
            written.location
        );
    } else {
        log::info!(
            "Saved {} listings to {}",
            report.listing_count,
            written.location
        );
    }

    Ok(report)
}

/// Phase 1: collect stubs over a dedicated session.
async fn collect_stubs(
    config: &Config,
    sessions: &dyn SessionFactory,
    ids: &dyn IdGenerator,
    url: &str,
) -> Result<Vec<ListingStub>> {
    let mut session = sessions.open().await?;
    let stubs = ListingCollector::new(config, ids)
        .collect(session.as_mut(), url)
        .await;
    close_quietly(session.as_mut()).await;

    Ok(stubs)
}

/// Phase 2: enrich stubs over a dedicated session.
async fn enrich_stubs(
    config: &Config,
    sessions: &dyn SessionFactory,
    media: &MediaRehost,
    category: Option<String>,
    stubs: Vec<ListingStub>,
) -> Result<EnrichmentOutcome> {
    let mut session = sessions.open().await?;
    let outcome = DetailEnricher::new(config, media, category)
        .enrich(session.as_mut(), stubs)
        .await;
    close_quietly(session.as_mut()).await;

    Ok(outcome)
}
