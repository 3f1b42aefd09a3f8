// src/lib.rs

//! Sales feed poller library
//!
//! Polls a live sales feed, keeps overpaid sales, and enriches each new sale
//! with tags from its page and colors from its cover art.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
