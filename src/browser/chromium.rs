//! Headless Chromium page engine (`chromiumoxide`).
//!
//! Each session launches its own browser process with a single page. The
//! CDP handler runs on a background task until the browser is closed.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::{PageSession, SessionFactory};
use crate::error::{AppError, Result};
use crate::models::ScraperConfig;

/// Launches one Chromium process per session.
pub struct ChromiumSessions {
    config: ScraperConfig,
}

impl ChromiumSessions {
    pub fn new(config: ScraperConfig) -> Self {
        Self { config }
    }

    fn browser_config(&self) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg(format!("--user-agent={}", self.config.user_agent));
        if !self.config.headless {
            builder = builder.with_head();
        }
        builder.build().map_err(AppError::browser)
    }
}

#[async_trait]
impl SessionFactory for ChromiumSessions {
    fn name(&self) -> &'static str {
        "chromium"
    }

    async fn open(&self) -> Result<Box<dyn PageSession>> {
        let (mut browser, mut handler) = Browser::launch(self.browser_config()?)
            .await
            .map_err(AppError::browser)?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                // Don't leak the process we just started.
                let _ = browser.close().await;
                handler_task.abort();
                return Err(AppError::browser(e));
            }
        };

        log::debug!("Launched Chromium session");
        Ok(Box::new(ChromiumSession {
            browser: Some(browser),
            page: Some(page),
            handler_task: Some(handler_task),
            url: None,
            poll_interval: self.config.poll_interval(),
        }))
    }
}

/// A session over one Chromium page.
pub struct ChromiumSession {
    browser: Option<Browser>,
    page: Option<Page>,
    handler_task: Option<JoinHandle<()>>,
    url: Option<String>,
    poll_interval: Duration,
}

impl ChromiumSession {
    fn page(&self) -> Result<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| AppError::browser("session already closed"))
    }
}

#[async_trait]
impl PageSession for ChromiumSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.page()?
            .goto(url)
            .await
            .map_err(|e| AppError::navigation(url, e))?;
        self.url = Some(url.to_string());
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        let page = self.page()?;
        let deadline = Instant::now() + timeout;

        loop {
            if page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(AppError::timeout(selector, timeout));
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }

    async fn content(&mut self) -> Result<String> {
        self.page()?.content().await.map_err(AppError::browser)
    }

    fn current_url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    async fn close(&mut self) -> Result<()> {
        let mut result = Ok(());

        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                log::debug!("Page close failed: {}", e);
            }
        }
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                result = Err(AppError::browser(e));
            }
            let _ = browser.wait().await;
        }
        if let Some(task) = self.handler_task.take() {
            task.abort();
        }

        log::debug!("Closed Chromium session");
        result
    }
}
