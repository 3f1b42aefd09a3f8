// src/pipeline/poller.rs

//! Fixed-interval feed poller.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::pipeline::{Ingestor, TickOutcome};
use crate::services::FeedClient;

/// Pulls a feed snapshot every `interval` and hands it to the ingestor.
///
/// Each tick runs as its own task, so a slow fetch never delays the next
/// tick and runs may overlap. The store's admission lock is the only
/// coordination between them.
#[derive(Clone)]
pub struct Poller {
    client: Arc<dyn FeedClient>,
    ingestor: Arc<Ingestor>,
    interval: Duration,
}

impl Poller {
    pub fn new(client: Arc<dyn FeedClient>, ingestor: Arc<Ingestor>, interval: Duration) -> Self {
        Self {
            client,
            ingestor,
            interval,
        }
    }

    pub fn ingestor(&self) -> &Ingestor {
        &self.ingestor
    }

    /// Fetch one snapshot and ingest it.
    ///
    /// A failed fetch skips the tick and returns `None`.
    pub async fn tick(&self) -> Option<TickOutcome> {
        let snapshot = match self.client.fetch_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                log::warn!("Feed fetch failed, skipping tick: {}", error);
                return None;
            }
        };

        let outcome = self.ingestor.ingest(snapshot).await;
        log::info!(
            "Tick: {} events, {} rejected, {} duplicates, {} new ({} items total) in {}ms",
            outcome.events,
            outcome.rejected,
            outcome.duplicates,
            outcome.admitted_count(),
            self.ingestor.store().len().await,
            outcome.elapsed().num_milliseconds()
        );
        Some(outcome)
    }

    /// Poll forever, or until `max_ticks` ticks have fired.
    ///
    /// The first tick fires one full interval after the call. With a tick
    /// limit, returns once every started run has finished ingesting
    /// (enrichment tasks keep running).
    pub async fn run(&self, max_ticks: Option<u64>) {
        let mut interval = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        log::info!("Polling feed every {:?}", self.interval);

        let mut fired = 0u64;
        let mut runs: Vec<JoinHandle<Option<TickOutcome>>> = Vec::new();

        loop {
            interval.tick().await;
            fired += 1;

            let poller = self.clone();
            let run = tokio::spawn(async move { poller.tick().await });

            match max_ticks {
                Some(limit) => {
                    runs.push(run);
                    if fired >= limit {
                        break;
                    }
                }
                None => drop(run),
            }
        }

        for run in runs {
            if let Err(error) = run.await {
                log::warn!("Pipeline run aborted: {}", error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, Result};
    use crate::models::{FeedSnapshot, RawEvent};
    use crate::storage::ItemStore;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sale(timestamp: i64, item_price: f64, amount_paid: f64) -> RawEvent {
        RawEvent {
            item_price,
            amount_paid,
            url: format!("https://artist{timestamp}.bandcamp.com/album/a"),
            artist_name: format!("Artist {timestamp}"),
            utc_date: timestamp,
            ..RawEvent::default()
        }
    }

    /// Serves scripted snapshots; `None` entries fail the fetch.
    struct ScriptedFeed {
        script: Mutex<VecDeque<Option<Vec<RawEvent>>>>,
        calls: AtomicUsize,
    }

    impl ScriptedFeed {
        fn new(script: Vec<Option<Vec<RawEvent>>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl FeedClient for ScriptedFeed {
        async fn fetch_snapshot(&self) -> Result<FeedSnapshot> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.script.lock().unwrap().pop_front().flatten() {
                Some(events) => Ok(FeedSnapshot::from_events(events)),
                None => Err(AppError::fetch("feed", "503 Service Unavailable")),
            }
        }

        async fn fetch_document(&self, url: &str) -> Result<String> {
            Err(AppError::fetch(url, "not used"))
        }
    }

    fn poller(feed: Arc<ScriptedFeed>) -> Poller {
        let ingestor = Arc::new(Ingestor::new(ItemStore::new(), None, None));
        Poller::new(feed, ingestor, Duration::from_secs(10))
    }

    #[tokio::test]
    async fn test_repeat_delivery_and_rejection_across_ticks() {
        let feed = Arc::new(ScriptedFeed::new(vec![
            Some(vec![sale(1000, 5.00, 5.01)]),
            Some(vec![sale(1000, 5.00, 5.01), sale(2000, 10.00, 9.99)]),
        ]));
        let poller = poller(feed);

        let first = poller.tick().await.unwrap();
        assert_eq!(first.admitted_count(), 1);
        assert_eq!(poller.ingestor().store().len().await, 1);

        let second = poller.tick().await.unwrap();
        assert_eq!(second.duplicates, 1);
        assert_eq!(second.rejected, 1);
        assert_eq!(poller.ingestor().store().len().await, 1);
    }

    #[tokio::test]
    async fn test_failed_tick_is_skipped() {
        let feed = Arc::new(ScriptedFeed::new(vec![None, Some(vec![sale(7, 1.0, 2.0)])]));
        let poller = poller(feed);

        assert!(poller.tick().await.is_none());
        assert!(poller.ingestor().store().is_empty().await);

        assert!(poller.tick().await.is_some());
        assert_eq!(poller.ingestor().store().len().await, 1);
    }

    /// Every fetch takes longer than the poll interval.
    struct SlowFeed {
        delay: Duration,
        started: Mutex<Vec<Instant>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    #[async_trait]
    impl FeedClient for SlowFeed {
        async fn fetch_snapshot(&self) -> Result<FeedSnapshot> {
            self.started.lock().unwrap().push(Instant::now());
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            tokio::time::sleep(self.delay).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(FeedSnapshot::from_events(vec![sale(1000, 5.00, 5.01)]))
        }

        async fn fetch_document(&self, url: &str) -> Result<String> {
            Err(AppError::fetch(url, "not used"))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_fetch_does_not_delay_ticks() {
        let feed = Arc::new(SlowFeed {
            delay: Duration::from_secs(25),
            started: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        });
        let ingestor = Arc::new(Ingestor::new(ItemStore::new(), None, None));
        let poller = Poller::new(feed.clone(), ingestor, Duration::from_secs(10));

        let start = Instant::now();
        poller.run(Some(3)).await;

        let started = feed.started.lock().unwrap().clone();
        assert_eq!(started.len(), 3);
        for (n, at) in started.iter().enumerate() {
            let offset = at.duration_since(start);
            let expected = Duration::from_secs(10 * (n as u64 + 1));
            assert!(offset >= expected, "tick {n} at {offset:?}");
            assert!(offset < expected + Duration::from_secs(1), "tick {n} at {offset:?}");
        }

        // All three fetches were outstanding at once
        assert_eq!(feed.max_in_flight.load(Ordering::SeqCst), 3);
        // Overlapping runs delivering the same sale admit it once
        assert_eq!(poller.ingestor().store().len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_keeps_polling_after_failures() {
        let feed = Arc::new(ScriptedFeed::new(vec![
            None,
            Some(vec![sale(1, 1.0, 2.0)]),
            None,
            Some(vec![sale(2, 1.0, 2.0)]),
        ]));
        let poller = poller(Arc::clone(&feed));

        let start = Instant::now();
        poller.run(Some(4)).await;

        assert_eq!(feed.calls.load(Ordering::SeqCst), 4);
        assert_eq!(poller.ingestor().store().len().await, 2);
        // First tick after one interval, then three more
        assert!(start.elapsed() >= Duration::from_secs(40));
        assert!(start.elapsed() < Duration::from_secs(50));
    }
}
