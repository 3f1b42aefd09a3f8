// src/pipeline/mod.rs

//! Pipeline entry points.
//!
//! - `Ingestor`: filter, dedup, and enrich one feed snapshot
//! - `Poller`: run the ingestor on a fixed interval

pub mod ingest;
pub mod poller;

pub use ingest::{Ingestor, TickOutcome};
pub use poller::Poller;
