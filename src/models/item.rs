// src/models/item.rs

//! Display-ready item and its enrichment attributes.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::RawEvent;
use crate::utils::url::https_url;

/// A tag link scraped from the item page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub tag_url: String,
    pub tag_name: String,
}

/// Background and text colors derived from the cover art.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColorPair {
    pub background_color: String,
    pub text_color: String,
}

/// An accepted sale.
///
/// Identity is the timestamp. Tags and colors are set-once cells filled in
/// by the enrichment tasks after the item has been admitted.
#[derive(Debug)]
pub struct Item {
    pub url: String,
    pub artist: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub art_url: Option<String>,
    pub timestamp: i64,
    tags: OnceLock<Vec<Tag>>,
    colors: OnceLock<ColorPair>,
}

impl Item {
    /// Build an item with empty enrichment cells.
    pub fn new(
        url: impl Into<String>,
        artist: impl Into<String>,
        title: Option<String>,
        description: Option<String>,
        art_url: Option<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            url: url.into(),
            artist: artist.into(),
            title,
            description,
            art_url,
            timestamp,
            tags: OnceLock::new(),
            colors: OnceLock::new(),
        }
    }

    pub fn tags(&self) -> Option<&[Tag]> {
        self.tags.get().map(Vec::as_slice)
    }

    pub fn colors(&self) -> Option<&ColorPair> {
        self.colors.get()
    }

    /// Assign tags if none are set yet. Returns `false` if they already were.
    pub fn set_tags(&self, tags: Vec<Tag>) -> bool {
        self.tags.set(tags).is_ok()
    }

    /// Assign colors if none are set yet. Returns `false` if they already were.
    pub fn set_colors(&self, colors: ColorPair) -> bool {
        self.colors.set(colors).is_ok()
    }

    /// Owned view for the presentation layer.
    pub fn snapshot(&self) -> ItemSnapshot {
        ItemSnapshot {
            url: self.url.clone(),
            artist: self.artist.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            art_url: self.art_url.clone(),
            timestamp: self.timestamp,
            sold_at: DateTime::<Utc>::from_timestamp(self.timestamp, 0),
            tags: self.tags().map(<[Tag]>::to_vec),
            background_color: self.colors().map(|c| c.background_color.clone()),
            text_color: self.colors().map(|c| c.text_color.clone()),
        }
    }
}

impl From<RawEvent> for Item {
    fn from(event: RawEvent) -> Self {
        Self::new(
            https_url(&event.url),
            event.artist_name,
            event.album_title,
            event.item_description,
            event.art_url,
            event.utc_date,
        )
    }
}

/// Serializable point-in-time copy of an [`Item`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemSnapshot {
    pub url: String,
    pub artist: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub art_url: Option<String>,
    pub timestamp: i64,
    pub sold_at: Option<DateTime<Utc>>,
    pub tags: Option<Vec<Tag>>,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> RawEvent {
        RawEvent {
            item_price: 7.0,
            amount_paid: 8.5,
            url: "//lowtide.bandcamp.com/album/harbour-lights".to_string(),
            artist_name: "Low Tide".to_string(),
            album_title: Some("Harbour Lights".to_string()),
            item_description: Some("Harbour Lights".to_string()),
            art_url: Some("https://f4.bcbits.com/img/a123_7.jpg".to_string()),
            utc_date: 1_602_345_601,
            item_type: Some("a".to_string()),
        }
    }

    #[test]
    fn test_from_raw_event() {
        let item = Item::from(sample_event());
        assert_eq!(item.url, "https://lowtide.bandcamp.com/album/harbour-lights");
        assert_eq!(item.artist, "Low Tide");
        assert_eq!(item.timestamp, 1_602_345_601);
        assert!(item.tags().is_none());
        assert!(item.colors().is_none());
    }

    #[test]
    fn test_tags_set_once() {
        let item = Item::from(sample_event());
        let first = vec![Tag {
            tag_url: "https://bandcamp.com/tag/ambient".into(),
            tag_name: "ambient".into(),
        }];

        assert!(item.set_tags(first.clone()));
        assert!(!item.set_tags(Vec::new()));
        assert_eq!(item.tags(), Some(first.as_slice()));
    }

    #[test]
    fn test_colors_set_once() {
        let item = Item::from(sample_event());
        let first = ColorPair {
            background_color: "rgb(1,2,3,1)".into(),
            text_color: "rgb(4,5,6,1)".into(),
        };
        let second = ColorPair {
            background_color: "rgb(9,9,9,1)".into(),
            text_color: "rgb(9,9,9,1)".into(),
        };

        assert!(item.set_colors(first.clone()));
        assert!(!item.set_colors(second));
        assert_eq!(item.colors(), Some(&first));
    }

    #[test]
    fn test_snapshot() {
        let item = Item::from(sample_event());
        item.set_colors(ColorPair {
            background_color: "rgb(1,2,3,1)".into(),
            text_color: "rgb(4,5,6,1)".into(),
        });

        let snapshot = item.snapshot();
        assert_eq!(snapshot.timestamp, 1_602_345_601);
        assert_eq!(
            snapshot.sold_at.map(|d| d.to_rfc3339()),
            Some("2020-10-10T16:00:01+00:00".to_string())
        );
        assert_eq!(snapshot.tags, None);
        assert_eq!(snapshot.background_color.as_deref(), Some("rgb(1,2,3,1)"));
        assert_eq!(snapshot.text_color.as_deref(), Some("rgb(4,5,6,1)"));
    }
}
