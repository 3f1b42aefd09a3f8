// src/storage/mod.rs

//! In-memory item collection.
//!
//! The store is the only state shared between the poller and the enrichment
//! tasks. It lives for the process lifetime and is never persisted.
//!
//! - Append-only: items are never removed
//! - At most one item per timestamp
//! - Admission order is preserved

mod items;

pub use items::{Admission, ItemStore};
