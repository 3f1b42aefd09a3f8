// src/services/colors.rs

//! Cover art color enrichment.
//!
//! Best effort: a failed load leaves the item's colors unset for good.

use std::sync::Arc;

use async_trait::async_trait;
use color_thief::ColorFormat;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{ColorPair, EnrichmentConfig, Item};
use crate::utils::http;

/// An RGB triple.
pub type Rgb = [u8; 3];

/// Loads an image and reduces it to a palette, most dominant color first.
#[async_trait]
pub trait ImageLoader: Send + Sync {
    async fn load_palette(&self, url: &str) -> Result<Vec<Rgb>>;
}

/// Decode image bytes and quantize them to at most `max_colors` colors.
pub fn extract_palette(bytes: &[u8], quality: u8, max_colors: u8) -> Result<Vec<Rgb>> {
    let image = image::load_from_memory(bytes)?.to_rgba8();
    let palette = color_thief::get_palette(image.as_raw(), ColorFormat::Rgba, quality, max_colors)
        .map_err(|e| AppError::palette(format!("{e:?}")))?;
    Ok(palette.into_iter().map(|c| [c.r, c.g, c.b]).collect())
}

/// Render a color as an opaque `rgb(r,g,b,1)` string.
pub fn to_rgb_color([r, g, b]: Rgb) -> String {
    format!("rgb({r},{g},{b},1)")
}

/// Background from the most dominant entry, text from the least dominant.
pub fn color_pair(palette: &[Rgb]) -> Option<ColorPair> {
    let first = palette.first()?;
    let last = palette.last()?;
    Some(ColorPair {
        background_color: to_rgb_color(*first),
        text_color: to_rgb_color(*last),
    })
}

/// `ImageLoader` that downloads with `reqwest` and decodes off the runtime.
#[derive(Clone)]
pub struct HttpImageLoader {
    client: Client,
    quality: u8,
    max_colors: u8,
}

impl HttpImageLoader {
    pub fn new(client: Client, config: &EnrichmentConfig) -> Self {
        Self {
            client,
            quality: config.palette_quality,
            max_colors: config.palette_colors,
        }
    }
}

#[async_trait]
impl ImageLoader for HttpImageLoader {
    async fn load_palette(&self, url: &str) -> Result<Vec<Rgb>> {
        let bytes = http::fetch_bytes(&self.client, url).await?;
        let (quality, max_colors) = (self.quality, self.max_colors);

        tokio::task::spawn_blocking(move || extract_palette(&bytes, quality, max_colors))
            .await
            .map_err(|e| AppError::palette(format!("decode task failed: {e}")))?
    }
}

/// Populates an item's colors from its cover art.
pub struct ColorEnricher {
    loader: Arc<dyn ImageLoader>,
}

impl ColorEnricher {
    pub fn new(loader: Arc<dyn ImageLoader>) -> Self {
        Self { loader }
    }

    /// Load the art and assign colors. Returns whether colors were set.
    pub async fn enrich(&self, item: &Item) -> bool {
        let Some(art_url) = item.art_url.as_deref() else {
            log::debug!("No art url for {}, skipping colors", item.url);
            return false;
        };

        let palette = match self.loader.load_palette(art_url).await {
            Ok(palette) => palette,
            Err(error) => {
                log::debug!("Image load failed for {}: {}", art_url, error);
                return false;
            }
        };

        let Some(colors) = color_pair(&palette) else {
            log::debug!("Empty palette for {}", art_url);
            return false;
        };

        if !item.set_colors(colors) {
            log::debug!("Colors for {} already set, discarding result", item.url);
            return false;
        }
        true
    }
}
