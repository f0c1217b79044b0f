//! Pipeline entry points for scraper operations.
//!
//! - `run_scraper`: Collect listings from a results page and enrich them
//! - `run_validate`: Check the configuration file
//! - `run_info`: Summarize the last written output

pub mod info;
pub mod scrape;
pub mod validate;

pub use info::run_info;
pub use scrape::{ScrapeRequest, run_scraper};
pub use validate::run_validate;
