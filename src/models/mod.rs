// src/models/mod.rs

//! Domain models for the sales feed pipeline.
//!
//! Wire types for the feed, the enriched item, and configuration.

mod config;
mod event;
mod item;

// Re-export all public types
pub use config::{Config, EnrichmentConfig, FeedConfig, HttpConfig, LoggingConfig};
pub use event::{EventBatch, FeedResponse, FeedSnapshot, RawEvent};
pub use item::{ColorPair, Item, ItemSnapshot, Tag};
