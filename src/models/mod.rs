// src/models/mod.rs

//! Domain models for the scraper application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod listing;
mod policy;

// Re-export all public types
pub use config::{
    Config, Engine, MediaBackend, MediaConfig, OutputConfig, ScraperConfig, SelectorConfig,
};
pub use listing::{EnrichedListing, ListingDetails, ListingStub, MAX_LISTINGS};
pub use policy::{Field, FieldPolicy, OnMissing, PolicyTable};
