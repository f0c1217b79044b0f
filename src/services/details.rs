// src/services/details.rs

//! Detail enricher service.
//!
//! Visits each listing's detail page in order over a single session and
//! extracts images, description, condition and the reserved flag. Each
//! awaited block follows its [`FieldPolicy`]: a missing carousel or
//! description stops the loop, a missing condition block is skipped.

use scraper::Html;

use crate::browser::{self, PageSession};
use crate::error::{AppError, Result};
use crate::media::MediaRehost;
use crate::models::{
    Config, EnrichedListing, FieldPolicy, ListingDetails, ListingStub, MAX_LISTINGS, OnMissing,
    PolicyTable,
};
use crate::utils::{element_text, resolve};

/// Result of the enrichment loop.
///
/// `listings` is always a prefix of the input stubs. When a hard failure
/// ends the loop, `stopped_early` is set and `reason` says why; the
/// listings enriched before it are kept.
#[derive(Debug, Default)]
pub struct EnrichmentOutcome {
    pub listings: Vec<EnrichedListing>,
    pub stopped_early: bool,
    pub reason: Option<String>,
}

impl EnrichmentOutcome {
    fn stop(&mut self, error: &AppError) {
        self.stopped_early = true;
        self.reason = Some(error.to_string());
    }
}

/// Outcome of awaiting one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    Skipped,
}

/// Service for enriching listing stubs from their detail pages.
pub struct DetailEnricher<'a> {
    policies: PolicyTable,
    image_selector: String,
    reserved_selector: String,
    media: &'a MediaRehost,
    category: Option<String>,
    limit: usize,
}

impl<'a> DetailEnricher<'a> {
    pub fn new(config: &Config, media: &'a MediaRehost, category: Option<String>) -> Self {
        Self {
            policies: PolicyTable::from_config(config),
            image_selector: config.selectors.carousel_image.clone(),
            reserved_selector: config.selectors.reserved.clone(),
            media,
            category,
            limit: MAX_LISTINGS,
        }
    }

    /// Enrich `stubs` one at a time, stopping at the first hard failure or
    /// once [`MAX_LISTINGS`] listings are done.
    pub async fn enrich(
        &self,
        session: &mut dyn PageSession,
        stubs: Vec<ListingStub>,
    ) -> EnrichmentOutcome {
        let total = stubs.len().min(self.limit);
        let mut outcome = EnrichmentOutcome::default();

        for stub in stubs {
            if outcome.listings.len() >= self.limit {
                break;
            }

            let position = outcome.listings.len() + 1;
            log::info!("[{}/{}] Visiting {}", position, total, stub.url);

            match self.enrich_one(session, stub).await {
                Ok(listing) => {
                    log::info!(
                        "[{}/{}] Enriched {} ({} images)",
                        position,
                        total,
                        listing.id(),
                        listing.images.len()
                    );
                    outcome.listings.push(listing);
                }
                Err(e) => {
                    log::error!(
                        "[{}/{}] Stopping enrichment, keeping {} listings: {}",
                        position,
                        total,
                        outcome.listings.len(),
                        e
                    );
                    outcome.stop(&e);
                    break;
                }
            }
        }

        outcome
    }

    async fn enrich_one(
        &self,
        session: &mut dyn PageSession,
        stub: ListingStub,
    ) -> Result<EnrichedListing> {
        session.navigate(&stub.url).await?;
        let page_url = session.current_url().unwrap_or(&stub.url).to_string();

        await_field(session, &self.policies.carousel).await?;
        let image_sel = browser::parse_selector(&self.image_selector)?;
        let images = browser::extract(session, |doc| {
            doc.select(&image_sel)
                .filter_map(|img| img.value().attr("src"))
                .map(|src| resolve(&page_url, src))
                .collect::<Vec<_>>()
        })
        .await?;
        log::debug!("Images: {:?}", images);

        await_field(session, &self.policies.description).await?;
        let description = self
            .first_text(session, &self.policies.description.selector)
            .await?
            .unwrap_or_default();
        log::debug!("Description: {}", description);

        let condition = match await_field(session, &self.policies.condition).await? {
            Readiness::Ready => self
                .first_text(session, &self.policies.condition.selector)
                .await?
                .filter(|text| !text.is_empty()),
            Readiness::Skipped => None,
        };
        log::debug!("Condition: {:?}", condition);

        let reserved_sel = browser::parse_selector(&self.reserved_selector)?;
        let reserved =
            browser::extract(session, |doc| doc.select(&reserved_sel).next().is_some()).await?;

        let images = self.media.rehost(&images, &stub.id).await?;

        Ok(stub.enrich(
            ListingDetails {
                description,
                condition,
                reserved,
                images,
            },
            self.category.clone(),
        ))
    }

    /// Trimmed text of the first element matching `selector`.
    async fn first_text(
        &self,
        session: &mut dyn PageSession,
        selector: &str,
    ) -> Result<Option<String>> {
        let sel = browser::parse_selector(selector)?;
        browser::extract(session, |doc: &Html| {
            doc.select(&sel).next().map(|el| element_text(&el))
        })
        .await
    }
}

/// Wait for a field's block according to its policy.
///
/// A timeout becomes [`Readiness::Skipped`] for `Skip` policies and
/// [`AppError::MissingField`] for `Abort` policies. Other session errors
/// are returned unchanged.
pub async fn await_field(session: &mut dyn PageSession, policy: &FieldPolicy) -> Result<Readiness> {
    match session.wait_for(&policy.selector, policy.timeout).await {
        Ok(()) => Ok(Readiness::Ready),
        Err(e) if e.is_timeout() => match policy.on_missing {
            OnMissing::Skip => {
                log::warn!("No {} block found ({}), leaving it empty", policy.field, e);
                Ok(Readiness::Skipped)
            }
            OnMissing::Abort => {
                let url = session.current_url().unwrap_or_default().to_string();
                Err(AppError::missing_field(policy.field.as_str(), url, e))
            }
        },
        Err(e) => Err(e),
    }
}
