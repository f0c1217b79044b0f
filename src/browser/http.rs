//! Static HTTP page engine.
//!
//! Fetches each page once with `reqwest`. Readiness is decided against the
//! fetched document, so `wait_for` never actually waits: a selector that is
//! not in the server-rendered HTML will not appear later.

use std::time::Duration;

use async_trait::async_trait;
use scraper::Html;

use super::{PageSession, SessionFactory, parse_selector};
use crate::error::{AppError, Result};
use crate::models::ScraperConfig;
use crate::utils::http::{create_async_client, fetch_text};

/// Opens [`HttpSession`]s sharing one client.
pub struct HttpSessions {
    client: reqwest::Client,
}

impl HttpSessions {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
        })
    }
}

#[async_trait]
impl SessionFactory for HttpSessions {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn open(&self) -> Result<Box<dyn PageSession>> {
        Ok(Box::new(HttpSession {
            client: self.client.clone(),
            url: None,
            html: String::new(),
        }))
    }
}

/// A session backed by plain HTTP fetches.
pub struct HttpSession {
    client: reqwest::Client,
    url: Option<String>,
    html: String,
}

#[async_trait]
impl PageSession for HttpSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        let html = fetch_text(&self.client, url)
            .await
            .map_err(|e| AppError::navigation(url, e))?;
        self.html = html;
        self.url = Some(url.to_string());
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        let sel = parse_selector(selector)?;
        let found = Html::parse_document(&self.html).select(&sel).next().is_some();
        if found {
            Ok(())
        } else {
            Err(AppError::timeout(selector, timeout))
        }
    }

    async fn content(&mut self) -> Result<String> {
        Ok(self.html.clone())
    }

    fn current_url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    async fn close(&mut self) -> Result<()> {
        self.url = None;
        self.html.clear();
        Ok(())
    }
}
