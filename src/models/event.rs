// src/models/event.rs

//! Wire representation of the sales feed.
//!
//! Events are decoded one at a time: a malformed event is dropped on its own
//! and never takes the rest of the snapshot down with it.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Top-level feed response.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedResponse {
    pub feed_data: FeedSnapshot,
}

/// One snapshot of the sales feed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedSnapshot {
    /// Server clock at response time
    #[serde(default, deserialize_with = "null_as_default")]
    pub server_time: f64,

    /// Start of the requested window
    #[serde(default, deserialize_with = "null_as_default")]
    pub start_date: f64,

    /// End of the requested window
    #[serde(default, deserialize_with = "null_as_default")]
    pub end_date: f64,

    /// Seconds the feed lags behind real time
    #[serde(default, deserialize_with = "null_as_default")]
    pub data_delay_sec: f64,

    /// Event batches in feed order
    #[serde(default, deserialize_with = "null_as_default")]
    pub events: Vec<EventBatch>,
}

impl FeedSnapshot {
    /// Build a snapshot holding a single batch of events.
    pub fn from_events(events: Vec<RawEvent>) -> Self {
        Self {
            events: vec![EventBatch {
                event_type: "sale".to_string(),
                utc_date: 0.0,
                items: events,
            }],
            ..Self::default()
        }
    }

    /// Flatten all batches into a single event sequence, preserving order.
    pub fn into_events(self) -> impl Iterator<Item = RawEvent> {
        self.events.into_iter().flat_map(|batch| batch.items)
    }

    /// Total number of well-formed events across all batches.
    pub fn event_count(&self) -> usize {
        self.events.iter().map(|batch| batch.items.len()).sum()
    }
}

/// A batch of events sharing one event type.
#[derive(Debug, Clone, Deserialize)]
pub struct EventBatch {
    #[serde(default, deserialize_with = "null_as_default")]
    pub event_type: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub utc_date: f64,

    #[serde(default, deserialize_with = "well_formed_events")]
    pub items: Vec<RawEvent>,
}

/// A single sale as delivered by the feed.
///
/// Amounts, url, and timestamp are required; an event missing any of them
/// (or carrying `null`) is dropped. Text fields tolerate `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEvent {
    /// Listed price
    pub item_price: f64,

    /// What the buyer actually paid
    pub amount_paid: f64,

    /// Canonical page url (often protocol-relative)
    pub url: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub artist_name: String,

    #[serde(default)]
    pub album_title: Option<String>,

    #[serde(default)]
    pub item_description: Option<String>,

    #[serde(default)]
    pub art_url: Option<String>,

    /// Sale time in whole seconds, the item identity
    #[serde(deserialize_with = "whole_seconds")]
    pub utc_date: i64,

    #[serde(default)]
    pub item_type: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode each event independently, skipping the ones that do not parse.
fn well_formed_events<'de, D>(deserializer: D) -> std::result::Result<Vec<RawEvent>, D::Error>
where
    D: Deserializer<'de>,
{
    let values: Vec<Value> = null_as_default(deserializer)?;
    let events = values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<RawEvent>(value) {
            Ok(event) => Some(event),
            Err(error) => {
                log::debug!("Dropping malformed feed event: {}", error);
                None
            }
        })
        .collect();
    Ok(events)
}

/// The feed reports fractional seconds; identity only needs whole ones.
fn whole_seconds<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    Ok(value.trunc() as i64)
}
