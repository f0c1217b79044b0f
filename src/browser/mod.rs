//! Page-retrieval engines.
//!
//! The scraper only talks to pages through [`PageSession`]:
//! - `navigate`: load a URL
//! - `wait_for`: block until a selector matches or a timeout elapses
//! - `content`: snapshot the live document as HTML
//!
//! Extraction is done on the snapshot with `scraper` via [`extract`], so
//! the same code runs against Chromium, a plain HTTP fetch, or canned HTML
//! in tests.

#[cfg(feature = "chromium")]
mod chromium;
#[cfg(test)]
pub(crate) mod fake;
mod http;

use std::time::Duration;

use async_trait::async_trait;
use scraper::Html;

use crate::error::{AppError, Result};
use crate::models::{Config, Engine};

#[cfg(feature = "chromium")]
pub use chromium::{ChromiumSession, ChromiumSessions};
pub use http::{HttpSession, HttpSessions};

/// One live page, exclusively owned by a pipeline phase.
#[async_trait]
pub trait PageSession: Send {
    /// Load `url`, replacing the current document.
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Wait until `selector` matches an element, or fail with
    /// [`AppError::Timeout`] once `timeout` has elapsed.
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<()>;

    /// Serialized HTML of the current document.
    async fn content(&mut self) -> Result<String>;

    /// URL of the last successful navigation.
    fn current_url(&self) -> Option<&str>;

    /// Release the underlying engine resources.
    async fn close(&mut self) -> Result<()>;
}

/// Opens sessions for the pipeline phases.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Engine name for logging.
    fn name(&self) -> &'static str;

    async fn open(&self) -> Result<Box<dyn PageSession>>;
}

/// Snapshot the current document and run `f` over it.
pub async fn extract<T, F>(session: &mut dyn PageSession, f: F) -> Result<T>
where
    F: FnOnce(&Html) -> T,
{
    let html = session.content().await?;
    let document = Html::parse_document(&html);
    Ok(f(&document))
}

/// Build the session factory selected by `scraper.engine`.
pub fn create_factory(config: &Config) -> Result<Box<dyn SessionFactory>> {
    match config.scraper.engine {
        #[cfg(feature = "chromium")]
        Engine::Chromium => Ok(Box::new(ChromiumSessions::new(config.scraper.clone()))),
        #[cfg(not(feature = "chromium"))]
        Engine::Chromium => Err(AppError::config(
            "scraper.engine = \"chromium\" requires the 'chromium' feature",
        )),
        Engine::Http => Ok(Box::new(HttpSessions::new(&config.scraper)?)),
    }
}

/// Close a session, logging instead of failing.
///
/// Used on every phase exit path so a failed close never masks the
/// phase's own result.
pub async fn close_quietly(session: &mut dyn PageSession) {
    if let Err(e) = session.close().await {
        log::warn!("Failed to close page session: {}", e);
    }
}

/// Parse a CSS selector into a crate error on failure.
pub fn parse_selector(s: &str) -> Result<scraper::Selector> {
    scraper::Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
