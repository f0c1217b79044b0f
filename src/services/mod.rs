//! Service layer for the scraper.
//!
//! This module contains the business logic for:
//! - Listing discovery on a results page (`ListingCollector`)
//! - Detail page enrichment (`DetailEnricher`)
//! - Listing identifiers (`IdGenerator`)

mod details;
mod ids;
mod listings;

pub use details::{DetailEnricher, EnrichmentOutcome, Readiness, await_field};
pub use ids::{IdGenerator, UuidGenerator};
pub use listings::ListingCollector;

#[cfg(test)]
pub(crate) use ids::testing;
