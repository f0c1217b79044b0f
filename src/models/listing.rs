// src/models/listing.rs

//! Listing stub and enriched listing data structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Maximum number of listings collected or enriched in one run.
pub const MAX_LISTINGS: usize = 10;

/// A listing discovered on the search-results page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingStub {
    /// Opaque identifier, assigned once at creation
    pub id: String,

    /// Listing title from the anchor's `title` attribute
    pub title: String,

    /// Absolute URL of the listing's detail page
    pub url: String,

    /// Displayed price text, trimmed (empty if absent)
    pub price: String,
}

impl ListingStub {
    /// Attach detail-page fields, producing the final listing.
    ///
    /// The stub is moved in whole, so its fields cannot change afterwards.
    pub fn enrich(self, details: ListingDetails, category: Option<String>) -> EnrichedListing {
        EnrichedListing {
            stub: self,
            description: details.description,
            condition: details.condition,
            reserved: details.reserved,
            images: details.images,
            category,
        }
    }
}

/// Fields extracted from a listing's detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingDetails {
    pub description: String,
    pub condition: Option<String>,
    pub reserved: bool,
    pub images: Vec<String>,
}

/// A listing enriched with its detail page contents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnrichedListing {
    /// Discovery-time fields
    #[serde(flatten)]
    pub stub: ListingStub,

    /// Description text, trimmed
    pub description: String,

    /// Condition/specifications text (omitted when the block is absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    /// Whether the listing carries the reserved badge
    pub reserved: bool,

    /// Image URIs in carousel order
    pub images: Vec<String>,

    /// Caller-supplied category tag
    pub category: Option<String>,
}

impl EnrichedListing {
    pub fn id(&self) -> &str {
        &self.stub.id
    }

    /// Load a persisted listing document.
    pub fn load_all(path: impl AsRef<Path>) -> Result<Vec<Self>> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
