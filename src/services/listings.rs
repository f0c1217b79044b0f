// src/services/listings.rs

//! Listing collector service.
//!
//! Reads up to [`MAX_LISTINGS`] listing cards from a search-results page.

use std::time::Duration;

use scraper::{ElementRef, Html, Selector};

use crate::browser::{self, PageSession};
use crate::error::Result;
use crate::models::{Config, ListingStub, MAX_LISTINGS};
use crate::services::IdGenerator;
use crate::utils::{element_text, resolve};

/// Service for collecting listing stubs from a results page.
pub struct ListingCollector<'a> {
    item_selector: String,
    price_selector: String,
    timeout: Duration,
    limit: usize,
    ids: &'a dyn IdGenerator,
}

impl<'a> ListingCollector<'a> {
    /// Create a collector using the configured selectors and timeout.
    pub fn new(config: &Config, ids: &'a dyn IdGenerator) -> Self {
        Self {
            item_selector: config.selectors.listing_item.clone(),
            price_selector: config.selectors.listing_price.clone(),
            timeout: config.scraper.listing_timeout(),
            limit: MAX_LISTINGS,
            ids,
        }
    }

    /// Collect stubs from the results page at `url`.
    ///
    /// Never fails: an unreachable page or a listing container that never
    /// shows up means there is nothing to scrape, and yields no stubs.
    pub async fn collect(&self, session: &mut dyn PageSession, url: &str) -> Vec<ListingStub> {
        match self.try_collect(session, url).await {
            Ok(stubs) => {
                log::info!("Collected {} listings from {}", stubs.len(), url);
                stubs
            }
            Err(e) => {
                log::warn!("No listings collected from {}: {}", url, e);
                Vec::new()
            }
        }
    }

    async fn try_collect(&self, session: &mut dyn PageSession, url: &str) -> Result<Vec<ListingStub>> {
        session.navigate(url).await?;
        session.wait_for(&self.item_selector, self.timeout).await?;

        let item_sel = browser::parse_selector(&self.item_selector)?;
        let price_sel = browser::parse_selector(&self.price_selector)?;
        let page_url = session.current_url().unwrap_or(url).to_string();

        browser::extract(session, |doc| self.parse_stubs(doc, &item_sel, &price_sel, &page_url))
            .await
    }

    fn parse_stubs(
        &self,
        document: &Html,
        item_sel: &Selector,
        price_sel: &Selector,
        page_url: &str,
    ) -> Vec<ListingStub> {
        document
            .select(item_sel)
            .take(self.limit)
            .map(|item| self.parse_item(&item, price_sel, page_url))
            .collect()
    }

    fn parse_item(&self, item: &ElementRef<'_>, price_sel: &Selector, page_url: &str) -> ListingStub {
        let anchor = Self::anchor(item);
        let title = anchor.value().attr("title").unwrap_or("").trim().to_string();
        let url = anchor
            .value()
            .attr("href")
            .map(|href| resolve(page_url, href))
            .unwrap_or_default();
        let price = item
            .select(price_sel)
            .next()
            .map(|el| element_text(&el))
            .unwrap_or_default();

        ListingStub {
            id: self.ids.next_id(),
            title,
            url,
            price,
        }
    }

    /// The card itself when it is an anchor, else its first nested anchor.
    fn anchor<'d>(item: &ElementRef<'d>) -> ElementRef<'d> {
        if item.value().name() == "a" {
            return *item;
        }
        item.descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "a")
            .unwrap_or(*item)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::browser::SessionFactory;
    use crate::browser::fake::{FakeBrowser, pages};
    use crate::services::ids::testing::SequentialIds;

    async fn collect_from(browser: &FakeBrowser) -> Vec<ListingStub> {
        let ids = SequentialIds::default();
        let config = Config::default();
        let collector = ListingCollector::new(&config, &ids);
        let mut session = browser.open().await.unwrap();
        collector.collect(session.as_mut(), pages::RESULTS_URL).await
    }

    #[tokio::test]
    async fn test_collects_at_most_ten() {
        let browser = FakeBrowser::new().page(pages::RESULTS_URL, pages::results(15));
        let stubs = collect_from(&browser).await;

        assert_eq!(stubs.len(), MAX_LISTINGS);
        assert_eq!(stubs[0].title, "Casco 1");
        assert_eq!(stubs[9].title, "Casco 10");
        let ids: HashSet<&str> = stubs.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids.len(), stubs.len());
    }

    #[tokio::test]
    async fn test_stub_fields() {
        let browser = FakeBrowser::new().page(pages::RESULTS_URL, pages::results(2));
        let stubs = collect_from(&browser).await;

        assert_eq!(
            stubs[1],
            ListingStub {
                id: "listing-2".to_string(),
                title: "Casco 2".to_string(),
                url: pages::item_url(2),
                price: "20 €".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_missing_price_is_empty() {
        let html = r#"<html><body>
            <a class="ItemCardList__item" title="Guantes" href="https://es.wallapop.com/item/guantes-9"></a>
        </body></html>"#;
        let browser = FakeBrowser::new().page(pages::RESULTS_URL, html);
        let stubs = collect_from(&browser).await;

        assert_eq!(stubs.len(), 1);
        assert_eq!(stubs[0].price, "");
        assert_eq!(stubs[0].url, "https://es.wallapop.com/item/guantes-9");
    }

    #[tokio::test]
    async fn test_nested_anchor() {
        let html = r#"<html><body>
            <div class="ItemCardList__item">
              <div><a title="Chaqueta" href="/item/chaqueta-4">ver</a></div>
              <span class="ItemCard__price">120 €</span>
            </div>
        </body></html>"#;
        let browser = FakeBrowser::new().page(pages::RESULTS_URL, html);
        let stubs = collect_from(&browser).await;

        assert_eq!(stubs[0].title, "Chaqueta");
        assert_eq!(stubs[0].url, "https://es.wallapop.com/item/chaqueta-4");
        assert_eq!(stubs[0].price, "120 €");
    }

    #[tokio::test]
    async fn test_empty_results_page() {
        let browser = FakeBrowser::new().page(pages::RESULTS_URL, pages::results(0));
        assert!(collect_from(&browser).await.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_page() {
        let browser = FakeBrowser::new();
        assert!(collect_from(&browser).await.is_empty());
        assert_eq!(browser.log().visited, vec![pages::RESULTS_URL.to_string()]);
    }
}
