// src/services/feed.rs

//! Transport for the sales feed and item pages.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;
use crate::models::{FeedResponse, FeedSnapshot};
use crate::utils::http;

/// Source of feed snapshots and item page documents.
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// Fetch the current feed snapshot.
    async fn fetch_snapshot(&self) -> Result<FeedSnapshot>;

    /// Fetch an HTML document as raw text.
    async fn fetch_document(&self, url: &str) -> Result<String>;
}

/// `FeedClient` backed by `reqwest`.
#[derive(Clone)]
pub struct HttpFeedClient {
    client: Client,
    feed_url: String,
}

impl HttpFeedClient {
    pub fn new(client: Client, feed_url: impl Into<String>) -> Self {
        Self {
            client,
            feed_url: feed_url.into(),
        }
    }
}

#[async_trait]
impl FeedClient for HttpFeedClient {
    async fn fetch_snapshot(&self) -> Result<FeedSnapshot> {
        let body = http::fetch_text(&self.client, &self.feed_url).await?;
        let response: FeedResponse = serde_json::from_str(&body)?;
        Ok(response.feed_data)
    }

    async fn fetch_document(&self, url: &str) -> Result<String> {
        http::fetch_text(&self.client, url).await
    }
}
