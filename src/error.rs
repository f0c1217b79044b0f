// src/error.rs

//! Unified error handling for the scraper application.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Result type alias for scraper operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Page engine failed (launch, CDP command, close)
    #[error("Browser error: {0}")]
    Browser(String),

    /// A page could not be loaded
    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    /// A readiness wait ran out of time
    #[error("Timed out after {}ms waiting for '{selector}'", .timeout.as_millis())]
    Timeout { selector: String, timeout: Duration },

    /// A required detail-page field never became ready
    #[error("Required field '{field}' missing on {url}: {source}")]
    MissingField {
        field: String,
        url: String,
        #[source]
        source: Box<AppError>,
    },

    /// Media upload failed
    #[error("Media error for {source_uri}: {message}")]
    Media { source_uri: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a page engine error.
    pub fn browser(message: impl fmt::Display) -> Self {
        Self::Browser(message.to_string())
    }

    /// Create a navigation error.
    pub fn navigation(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Navigation {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a readiness timeout error.
    pub fn timeout(selector: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            selector: selector.into(),
            timeout,
        }
    }

    /// Wrap a readiness failure as a missing required field.
    pub fn missing_field(field: impl Into<String>, url: impl Into<String>, source: AppError) -> Self {
        Self::MissingField {
            field: field.into(),
            url: url.into(),
            source: Box::new(source),
        }
    }

    /// Create a media upload error.
    pub fn media(source_uri: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Media {
            source_uri: source_uri.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether this error is a readiness timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_reports_millis() {
        let err = AppError::timeout("wallapop-carousel", Duration::from_secs(2));
        assert_eq!(
            err.to_string(),
            "Timed out after 2000ms waiting for 'wallapop-carousel'"
        );
        assert!(err.is_timeout());
    }

    #[test]
    fn missing_field_keeps_source() {
        let err = AppError::missing_field(
            "description",
            "https://example.com/item/1",
            AppError::timeout(".desc", Duration::from_millis(500)),
        );
        let source = std::error::Error::source(&err).map(|e| e.to_string());
        assert_eq!(
            source.as_deref(),
            Some("Timed out after 500ms waiting for '.desc'")
        );
        assert!(!err.is_timeout());
    }
}
