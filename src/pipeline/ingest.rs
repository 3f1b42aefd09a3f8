// src/pipeline/ingest.rs

//! Filter → dedup → enrich for one feed snapshot.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tokio::task::JoinHandle;

use crate::models::{EnrichmentConfig, FeedSnapshot, Item};
use crate::services::{ColorEnricher, FeedClient, ImageLoader, ItemFilter, TagEnricher};
use crate::storage::ItemStore;

/// Summary of one pipeline run.
#[derive(Debug, Default)]
pub struct TickOutcome {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub events: usize,
    pub rejected: usize,
    pub duplicates: usize,
    pub admitted: Vec<Arc<Item>>,
    enrichment: Vec<JoinHandle<()>>,
}

impl TickOutcome {
    pub fn admitted_count(&self) -> usize {
        self.admitted.len()
    }

    /// Wall-clock time spent filtering and admitting.
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Wait for this run's enrichment tasks, giving up after `limit`.
    ///
    /// Returns `false` on timeout. Tasks that did not finish keep running.
    pub async fn wait_for_enrichment(&mut self, limit: Duration) -> bool {
        let handles = std::mem::take(&mut self.enrichment);
        tokio::time::timeout(limit, join_all(handles)).await.is_ok()
    }
}

/// Drives feed snapshots into the item store.
pub struct Ingestor {
    store: ItemStore,
    filter: ItemFilter,
    tags: Option<Arc<TagEnricher>>,
    colors: Option<Arc<ColorEnricher>>,
}

impl Ingestor {
    pub fn new(
        store: ItemStore,
        tags: Option<TagEnricher>,
        colors: Option<ColorEnricher>,
    ) -> Self {
        Self {
            store,
            filter: ItemFilter::new(),
            tags: tags.map(Arc::new),
            colors: colors.map(Arc::new),
        }
    }

    /// Wire up enrichers according to the configuration.
    pub fn from_config(
        config: &EnrichmentConfig,
        store: ItemStore,
        client: Arc<dyn FeedClient>,
        images: Arc<dyn ImageLoader>,
    ) -> Self {
        let tags = config
            .tags_enabled
            .then(|| TagEnricher::new(client, config.tag_retry_delay()));
        let colors = config
            .colors_enabled
            .then(|| ColorEnricher::new(images));
        Self::new(store, tags, colors)
    }

    pub fn store(&self) -> &ItemStore {
        &self.store
    }

    /// Run one snapshot through the pipeline.
    ///
    /// Events are handled in feed order. Each newly admitted item gets its
    /// own tag and color tasks; this returns without waiting for them.
    pub async fn ingest(&self, snapshot: FeedSnapshot) -> TickOutcome {
        let mut outcome = TickOutcome {
            started_at: Utc::now(),
            events: snapshot.event_count(),
            ..TickOutcome::default()
        };

        for event in snapshot.into_events() {
            if !self.filter.accept(&event) {
                outcome.rejected += 1;
                continue;
            }

            // Read-locked fast path for repeats from the overlapping feed window
            if self.store.contains(event.utc_date).await {
                outcome.duplicates += 1;
                continue;
            }

            match self.store.admit(Item::from(event)).await.admitted() {
                Some(item) => {
                    log::debug!("Admitted {} ({})", item.url, item.timestamp);
                    outcome.enrichment.extend(self.spawn_enrichment(&item));
                    outcome.admitted.push(item);
                }
                None => outcome.duplicates += 1,
            }
        }

        outcome.finished_at = Utc::now();
        outcome
    }

    fn spawn_enrichment(&self, item: &Arc<Item>) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::with_capacity(2);

        if let Some(tags) = &self.tags {
            let (tags, item) = (Arc::clone(tags), Arc::clone(item));
            handles.push(tokio::spawn(async move {
                tags.enrich(&item).await;
            }));
        }

        if let Some(colors) = &self.colors {
            let (colors, item) = (Arc::clone(colors), Arc::clone(item));
            handles.push(tokio::spawn(async move {
                colors.enrich(&item).await;
            }));
        }

        handles
    }
}
