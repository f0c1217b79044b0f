// src/models/policy.rs

//! Readiness policies for detail-page fields.

use std::fmt;
use std::time::Duration;

use crate::models::Config;

/// Detail-page blocks that are awaited before extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Carousel,
    Description,
    Condition,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Carousel => "carousel",
            Field::Description => "description",
            Field::Condition => "condition",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do when a block never becomes ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnMissing {
    /// Stop the enrichment loop, keeping listings already enriched
    Abort,
    /// Leave the field at its default and continue
    Skip,
}

/// Readiness rule for one field.
#[derive(Debug, Clone)]
pub struct FieldPolicy {
    pub field: Field,
    pub selector: String,
    pub timeout: Duration,
    pub on_missing: OnMissing,
}

/// Policies for every awaited detail-page field.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    pub carousel: FieldPolicy,
    pub description: FieldPolicy,
    pub condition: FieldPolicy,
}

impl PolicyTable {
    /// Build the table from configured selectors and timeouts.
    pub fn from_config(config: &Config) -> Self {
        let selectors = &config.selectors;
        let scraper = &config.scraper;

        Self {
            carousel: FieldPolicy {
                field: Field::Carousel,
                selector: selectors.carousel.clone(),
                timeout: scraper.detail_timeout(),
                on_missing: OnMissing::Abort,
            },
            description: FieldPolicy {
                field: Field::Description,
                selector: selectors.description.clone(),
                timeout: scraper.detail_timeout(),
                on_missing: OnMissing::Abort,
            },
            condition: FieldPolicy {
                field: Field::Condition,
                selector: selectors.condition.clone(),
                timeout: scraper.condition_timeout(),
                on_missing: OnMissing::Skip,
            },
        }
    }
}
