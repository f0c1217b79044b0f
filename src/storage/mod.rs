//! Storage abstractions for scrape results.
//!
//! ## Directory Structure
//!
//! ```text
//! results/
//! ├── listings.json         # Ordered array of enriched listings
//! ├── stats.json            # Report of the last run
//! └── media/                # Re-hosted images (local media backend)
//! ```

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::EnrichedListing;

pub use local::LocalStorage;

/// File name of the run report, written next to the listings document.
pub const REPORT_FILE_NAME: &str = "stats.json";

/// Metadata about a storage write operation.
#[derive(Debug, Clone)]
pub struct WriteMetadata {
    /// Number of listings in the written document
    pub count: usize,
    /// Where the document was written
    pub location: String,
    /// Timestamp of the write
    pub timestamp: DateTime<Utc>,
}

/// Report of a single scrape run, written next to the listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub source_url: String,
    pub category: Option<String>,
    /// Stubs collected from the results page
    pub stub_count: usize,
    /// Listings written after enrichment
    pub listing_count: usize,
    pub stopped_early: bool,
    pub reason: Option<String>,
}

/// Trait for result storage backends.
#[async_trait]
pub trait ListingStorage: Send + Sync {
    /// Replace the stored document with `listings` (possibly empty).
    async fn write_listings(&self, listings: &[EnrichedListing]) -> Result<WriteMetadata>;

    /// Load the stored listings; empty when nothing was written yet.
    async fn load_listings(&self) -> Result<Vec<EnrichedListing>>;

    /// Persist the report of the last run.
    async fn write_report(&self, report: &RunReport) -> Result<()>;

    /// Load the report of the last run, if any.
    async fn load_report(&self) -> Result<Option<RunReport>>;
}
