// src/services/tags.rs

//! Tag enrichment.
//!
//! Scrapes `a.tag` anchors from the item page. Failures are retried forever
//! with a fixed delay; tag data is assumed to become available eventually.

use std::sync::Arc;
use std::time::Duration;

use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{Item, Tag};
use crate::services::FeedClient;
use crate::utils::resolve_url;

const TAG_SELECTOR: &str = "a.tag";

/// Extract `(href, text)` pairs of every `a.tag` anchor, in document order.
///
/// Anchors missing an `href` or visible text are skipped. Relative hrefs are
/// resolved against `page_url`.
pub fn parse_tags(html: &str, page_url: &str) -> Result<Vec<Tag>> {
    let selector = Selector::parse(TAG_SELECTOR)
        .map_err(|e| AppError::selector(TAG_SELECTOR, format!("{e:?}")))?;
    let document = Html::parse_document(html);

    let tags = document
        .select(&selector)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?.trim();
            let name = normalize_whitespace(&anchor.text().collect::<String>());
            if href.is_empty() || name.is_empty() {
                return None;
            }
            Some(Tag {
                tag_url: resolve_url(page_url, href),
                tag_name: name,
            })
        })
        .collect();

    Ok(tags)
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Populates an item's tags from its page.
pub struct TagEnricher {
    client: Arc<dyn FeedClient>,
    retry_delay: Duration,
}

impl TagEnricher {
    pub fn new(client: Arc<dyn FeedClient>, retry_delay: Duration) -> Self {
        Self {
            client,
            retry_delay,
        }
    }

    /// Fetch and parse the item page, retrying until it succeeds.
    ///
    /// Returns the number of failed attempts before success.
    pub async fn enrich(&self, item: &Item) -> usize {
        let mut failures = 0;
        loop {
            match self.fetch_tags(&item.url).await {
                Ok(tags) => {
                    let count = tags.len();
                    if item.set_tags(tags) {
                        log::debug!("Tagged {} with {} tags", item.url, count);
                    } else {
                        log::debug!("Tags for {} already set, discarding result", item.url);
                    }
                    return failures;
                }
                Err(error) => {
                    failures += 1;
                    log::warn!(
                        "Tag fetch failed for {} (attempt {}): {}. Retrying in {:?}",
                        item.url,
                        failures,
                        error,
                        self.retry_delay
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }
    }

    async fn fetch_tags(&self, url: &str) -> Result<Vec<Tag>> {
        let html = self.client.fetch_document(url).await?;
        parse_tags(&html, url)
    }
}
