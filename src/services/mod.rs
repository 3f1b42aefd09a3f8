// src/services/mod.rs

//! Service layer for the sales feed pipeline.
//!
//! This module contains the business logic for:
//! - Feed transport (`FeedClient`, `HttpFeedClient`)
//! - Sale acceptance (`ItemFilter`)
//! - Tag scraping (`TagEnricher`)
//! - Cover color extraction (`ColorEnricher`, `ImageLoader`)

mod colors;
mod feed;
mod filter;
mod tags;

pub use colors::{
    ColorEnricher, HttpImageLoader, ImageLoader, Rgb, color_pair, extract_palette, to_rgb_color,
};
pub use feed::{FeedClient, HttpFeedClient};
pub use filter::{ItemFilter, to_cents};
pub use tags::{TagEnricher, parse_tags};
