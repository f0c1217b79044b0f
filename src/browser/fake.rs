//! In-memory page engine serving canned HTML for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use scraper::Html;

use super::{PageSession, SessionFactory, parse_selector};
use crate::error::{AppError, Result};

/// What happened to the sessions a [`FakeBrowser`] handed out.
#[derive(Debug, Default, Clone)]
pub struct SessionLog {
    pub opened: usize,
    pub closed: usize,
    pub visited: Vec<String>,
    pub waits: Vec<String>,
}

#[derive(Clone, Default)]
pub struct FakeBrowser {
    pages: Arc<HashMap<String, String>>,
    log: Arc<Mutex<SessionLog>>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` at `url`. Unknown URLs fail navigation.
    pub fn page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.pages).insert(url.into(), html.into());
        self
    }

    pub fn log(&self) -> SessionLog {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionFactory for FakeBrowser {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn open(&self) -> Result<Box<dyn PageSession>> {
        self.log.lock().unwrap().opened += 1;
        Ok(Box::new(FakeSession {
            pages: Arc::clone(&self.pages),
            log: Arc::clone(&self.log),
            url: None,
        }))
    }
}

pub struct FakeSession {
    pages: Arc<HashMap<String, String>>,
    log: Arc<Mutex<SessionLog>>,
    url: Option<String>,
}

impl FakeSession {
    fn html(&self) -> &str {
        self.url
            .as_ref()
            .and_then(|u| self.pages.get(u))
            .map(String::as_str)
            .unwrap_or("")
    }
}

#[async_trait]
impl PageSession for FakeSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.log.lock().unwrap().visited.push(url.to_string());
        if !self.pages.contains_key(url) {
            return Err(AppError::navigation(url, "404 Not Found"));
        }
        self.url = Some(url.to_string());
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        self.log.lock().unwrap().waits.push(selector.to_string());
        let sel = parse_selector(selector)?;
        if Html::parse_document(self.html()).select(&sel).next().is_some() {
            Ok(())
        } else {
            Err(AppError::timeout(selector, timeout))
        }
    }

    async fn content(&mut self) -> Result<String> {
        Ok(self.html().to_string())
    }

    fn current_url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    async fn close(&mut self) -> Result<()> {
        self.log.lock().unwrap().closed += 1;
        Ok(())
    }
}

/// Marketplace-shaped HTML fixtures.
pub mod pages {
    pub const RESULTS_URL: &str = "https://es.wallapop.com/app/search?keywords=casco";

    pub fn item_url(i: usize) -> String {
        format!("https://es.wallapop.com/item/casco-{i}")
    }

    pub fn image_url(i: usize, n: usize) -> String {
        format!("https://cdn.wallapop.com/images/{i}/{n}.jpg")
    }

    /// A results page with `count` listing cards.
    pub fn results(count: usize) -> String {
        let cards: String = (1..=count)
            .map(|i| {
                format!(
                    r#"<a class="ItemCardList__item" title="Casco {i}" href="/item/casco-{i}">
                         <span class="ItemCard__price">  {i}0 €  </span>
                       </a>"#
                )
            })
            .collect();
        format!(r#"<html><body><div class="ItemCardList">{cards}</div></body></html>"#)
    }

    /// Detail page options.
    #[derive(Clone)]
    pub struct Detail {
        pub images: usize,
        pub carousel: bool,
        pub description: bool,
        pub condition: bool,
        pub reserved: bool,
    }

    impl Default for Detail {
        fn default() -> Self {
            Self {
                images: 3,
                carousel: true,
                description: true,
                condition: true,
                reserved: false,
            }
        }
    }

    /// A detail page for listing `i`.
    pub fn detail(i: usize, opts: &Detail) -> String {
        let mut body = String::new();
        if opts.carousel {
            let imgs: String = (1..=opts.images)
                .map(|n| {
                    format!(r#"<img slot="carousel-content" src="{}">"#, image_url(i, n))
                })
                .collect();
            body.push_str(&format!("<wallapop-carousel>{imgs}</wallapop-carousel>"));
        }
        if opts.description {
            body.push_str(&format!(
                r#"<section class="item-detail_ItemDetail__description__7rXXT">
                     Casco {i} en buen estado
                   </section>"#
            ));
        }
        if opts.condition {
            body.push_str(
                r#"<div class="item-detail-additional-specifications_ItemDetailAdditionalSpecifications__characteristics__Ut9iT">
                     Como nuevo
                   </div>"#,
            );
        }
        if opts.reserved {
            body.push_str(r#"<wallapop-badge badge-type="reserved">Reservado</wallapop-badge>"#);
        }
        format!("<html><body>{body}</body></html>")
    }
}
