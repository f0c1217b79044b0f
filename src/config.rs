// src/config.rs

//! Configuration loading utilities.
//!
//! File-based settings live in [`Config`]; credentials for the media store
//! come from the environment only and are checked before any scraping.

use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::Config;

/// Bucket name for the S3 media store (required).
pub const ENV_MEDIA_BUCKET: &str = "MEDIA_S3_BUCKET";
/// Key prefix inside the bucket.
pub const ENV_MEDIA_PREFIX: &str = "MEDIA_S3_PREFIX";
/// Public URL that stored keys are appended to.
pub const ENV_MEDIA_PUBLIC_URL: &str = "MEDIA_PUBLIC_BASE_URL";

/// Media store settings sourced from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaEnv {
    pub bucket: String,
    pub prefix: String,
    pub public_base_url: Option<String>,
}

impl MediaEnv {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, failing when the bucket is unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bucket = non_empty(ENV_MEDIA_BUCKET).ok_or_else(|| {
            AppError::config(format!(
                "{ENV_MEDIA_BUCKET} must be set to use the s3 media backend (or pass --no-rehost)"
            ))
        })?;

        Ok(Self {
            bucket,
            prefix: non_empty(ENV_MEDIA_PREFIX).unwrap_or_default(),
            public_base_url: non_empty(ENV_MEDIA_PUBLIC_URL),
        })
    }
}

/// Load and validate configuration from a TOML file.
///
/// A missing or unreadable file falls back to defaults; invalid values
/// are an error.
pub fn load_config(path: &Path) -> Result<Config> {
    let config = Config::load_or_default(path);
    config
        .validate()
        .map_err(|e| AppError::config(format!("Invalid configuration in {path:?}: {e}")))?;
    Ok(config)
}
