//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::storage::REPORT_FILE_NAME;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Page engine and timing settings
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// CSS selectors for results and detail pages
    #[serde(default)]
    pub selectors: SelectorConfig,

    /// Output document location
    #[serde(default)]
    pub output: OutputConfig,

    /// Image re-hosting settings
    #[serde(default)]
    pub media: MediaConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.scraper.user_agent.trim().is_empty() {
            return Err(AppError::validation("scraper.user_agent is empty"));
        }
        if self.scraper.listing_timeout_secs == 0 {
            return Err(AppError::validation(
                "scraper.listing_timeout_secs must be > 0",
            ));
        }
        if self.scraper.detail_timeout_secs == 0 {
            return Err(AppError::validation(
                "scraper.detail_timeout_secs must be > 0",
            ));
        }
        if self.scraper.condition_timeout_ms == 0 {
            return Err(AppError::validation(
                "scraper.condition_timeout_ms must be > 0",
            ));
        }
        if self.scraper.condition_timeout() >= self.scraper.detail_timeout() {
            return Err(AppError::validation(
                "scraper.condition_timeout_ms must be below scraper.detail_timeout_secs",
            ));
        }
        if self.scraper.poll_interval_ms == 0 {
            return Err(AppError::validation("scraper.poll_interval_ms must be > 0"));
        }
        self.selectors.validate()?;
        if self.output.file_name.trim().is_empty() {
            return Err(AppError::validation("output.file_name is empty"));
        }
        if self.output.file_name == REPORT_FILE_NAME {
            return Err(AppError::validation(format!(
                "output.file_name cannot be {REPORT_FILE_NAME}, the run report uses that name"
            )));
        }
        Ok(())
    }
}

/// Page engine kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// Headless Chromium (renders client-side pages)
    #[default]
    Chromium,
    /// Plain HTTP fetch (server-rendered pages only)
    Http,
}

/// Page engine and timing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    #[serde(default)]
    pub engine: Engine,

    /// Run Chromium without a window
    #[serde(default = "defaults::headless")]
    pub headless: bool,

    /// User-Agent for both engines
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Wait for the results-page listing container
    #[serde(default = "defaults::listing_timeout")]
    pub listing_timeout_secs: u64,

    /// Wait for required detail-page blocks (carousel, description)
    #[serde(default = "defaults::detail_timeout")]
    pub detail_timeout_secs: u64,

    /// Wait for the optional condition block
    #[serde(default = "defaults::condition_timeout")]
    pub condition_timeout_ms: u64,

    /// How often Chromium re-checks a selector while waiting
    #[serde(default = "defaults::poll_interval")]
    pub poll_interval_ms: u64,

    /// HTTP request timeout (page fetches and image downloads)
    #[serde(default = "defaults::request_timeout")]
    pub request_timeout_secs: u64,
}

impl ScraperConfig {
    pub fn listing_timeout(&self) -> Duration {
        Duration::from_secs(self.listing_timeout_secs)
    }

    pub fn detail_timeout(&self) -> Duration {
        Duration::from_secs(self.detail_timeout_secs)
    }

    pub fn condition_timeout(&self) -> Duration {
        Duration::from_millis(self.condition_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            engine: Engine::default(),
            headless: defaults::headless(),
            user_agent: defaults::user_agent(),
            listing_timeout_secs: defaults::listing_timeout(),
            detail_timeout_secs: defaults::detail_timeout(),
            condition_timeout_ms: defaults::condition_timeout(),
            poll_interval_ms: defaults::poll_interval(),
            request_timeout_secs: defaults::request_timeout(),
        }
    }
}

/// CSS selectors for the results page and the detail page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Each listing card on the results page
    #[serde(default = "defaults::listing_item")]
    pub listing_item: String,

    /// Price element within a listing card
    #[serde(default = "defaults::listing_price")]
    pub listing_price: String,

    /// Image carousel container on the detail page
    #[serde(default = "defaults::carousel")]
    pub carousel: String,

    /// Image slots within the carousel
    #[serde(default = "defaults::carousel_image")]
    pub carousel_image: String,

    /// Description block
    #[serde(default = "defaults::description")]
    pub description: String,

    /// Condition/specifications block
    #[serde(default = "defaults::condition")]
    pub condition: String,

    /// Reserved status badge
    #[serde(default = "defaults::reserved")]
    pub reserved: String,
}

impl SelectorConfig {
    fn validate(&self) -> Result<()> {
        let named = [
            ("selectors.listing_item", &self.listing_item),
            ("selectors.listing_price", &self.listing_price),
            ("selectors.carousel", &self.carousel),
            ("selectors.carousel_image", &self.carousel_image),
            ("selectors.description", &self.description),
            ("selectors.condition", &self.condition),
            ("selectors.reserved", &self.reserved),
        ];
        for (name, selector) in named {
            if selector.trim().is_empty() {
                return Err(AppError::validation(format!("{name} is empty")));
            }
            scraper::Selector::parse(selector)
                .map_err(|e| AppError::selector(selector.as_str(), format!("{e:?}")))?;
        }
        Ok(())
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            listing_item: defaults::listing_item(),
            listing_price: defaults::listing_price(),
            carousel: defaults::carousel(),
            carousel_image: defaults::carousel_image(),
            description: defaults::description(),
            condition: defaults::condition(),
            reserved: defaults::reserved(),
        }
    }
}

/// Output document location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "defaults::output_dir")]
    pub dir: PathBuf,

    #[serde(default = "defaults::output_file")]
    pub file_name: String,
}

impl OutputConfig {
    /// Full path of the listing document.
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: defaults::output_dir(),
            file_name: defaults::output_file(),
        }
    }
}

/// Media store backend kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaBackend {
    /// Download images into a local directory
    #[default]
    Local,
    /// Upload images to an S3 bucket (requires the `s3` feature)
    S3,
}

/// Image re-hosting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// When false, source image URIs are kept as-is
    #[serde(default = "defaults::media_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub backend: MediaBackend,

    /// Root directory for the local backend
    #[serde(default = "defaults::media_dir")]
    pub local_dir: PathBuf,

    /// Base URL prepended to stored object keys
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_base_url: Option<String>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::media_enabled(),
            backend: MediaBackend::default(),
            local_dir: defaults::media_dir(),
            public_base_url: None,
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Scraper defaults
    pub fn headless() -> bool {
        true
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".into()
    }
    pub fn listing_timeout() -> u64 {
        30
    }
    pub fn detail_timeout() -> u64 {
        30
    }
    pub fn condition_timeout() -> u64 {
        5_000
    }
    pub fn poll_interval() -> u64 {
        100
    }
    pub fn request_timeout() -> u64 {
        30
    }

    // Selector defaults
    pub fn listing_item() -> String {
        ".ItemCardList__item".into()
    }
    pub fn listing_price() -> String {
        ".ItemCard__price".into()
    }
    pub fn carousel() -> String {
        "wallapop-carousel".into()
    }
    pub fn carousel_image() -> String {
        r#"wallapop-carousel img[slot="carousel-content"]"#.into()
    }
    pub fn description() -> String {
        ".item-detail_ItemDetail__description__7rXXT".into()
    }
    pub fn condition() -> String {
        ".item-detail-additional-specifications_ItemDetailAdditionalSpecifications__characteristics__Ut9iT".into()
    }
    pub fn reserved() -> String {
        r#"wallapop-badge[badge-type="reserved"]"#.into()
    }

    // Output defaults
    pub fn output_dir() -> PathBuf {
        PathBuf::from("results")
    }
    pub fn output_file() -> String {
        "listings.json".into()
    }

    // Media defaults
    pub fn media_enabled() -> bool {
        true
    }
    pub fn media_dir() -> PathBuf {
        PathBuf::from("results/media")
    }
}
