// src/storage/items.rs

//! Lock-guarded, timestamp-keyed item store.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::{Item, ItemSnapshot};

/// Outcome of offering an item to the store.
#[derive(Debug, Clone)]
pub enum Admission {
    /// First item with this timestamp, now part of the collection
    Admitted(Arc<Item>),
    /// An item with this timestamp is already known
    Duplicate,
}

impl Admission {
    pub fn admitted(self) -> Option<Arc<Item>> {
        match self {
            Admission::Admitted(item) => Some(item),
            Admission::Duplicate => None,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    items: Vec<Arc<Item>>,
    timestamps: HashSet<i64>,
}

/// Shared handle to the item collection.
///
/// Cloning the handle shares the same underlying collection.
#[derive(Debug, Clone, Default)]
pub struct ItemStore {
    inner: Arc<RwLock<Inner>>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit `item` unless one with the same timestamp exists.
    ///
    /// The lookup and the append happen under one write lock, so concurrent
    /// admissions for the same timestamp cannot both succeed.
    pub async fn admit(&self, item: Item) -> Admission {
        let mut inner = self.inner.write().await;
        if !inner.timestamps.insert(item.timestamp) {
            return Admission::Duplicate;
        }
        let item = Arc::new(item);
        inner.items.push(Arc::clone(&item));
        Admission::Admitted(item)
    }

    pub async fn contains(&self, timestamp: i64) -> bool {
        self.inner.read().await.timestamps.contains(&timestamp)
    }

    pub async fn get(&self, timestamp: i64) -> Option<Arc<Item>> {
        self.inner
            .read()
            .await
            .items
            .iter()
            .find(|item| item.timestamp == timestamp)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Handles to every item, in admission order.
    pub async fn items(&self) -> Vec<Arc<Item>> {
        self.inner.read().await.items.clone()
    }

    /// Serializable copies of every item, in admission order.
    pub async fn snapshot(&self) -> Vec<ItemSnapshot> {
        self.inner
            .read()
            .await
            .items
            .iter()
            .map(|item| item.snapshot())
            .collect()
    }
}
