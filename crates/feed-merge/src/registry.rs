//! The storage collaborator seen from the merge engine.
//!
//! The engine only reads: the ordered feed sources, the ordered manual blocks
//! and the ordered bookings. Every call is expected to return fresh data.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{MergeError, Result};
use crate::model::{Booking, FeedSource, ManualBlock};

#[async_trait]
pub trait Registry: Send + Sync {
    /// Configured external feeds, in registry order.
    async fn feed_sources(&self) -> Result<Vec<FeedSource>>;

    /// Manual blocks, most recent range first.
    async fn manual_blocks(&self) -> Result<Vec<ManualBlock>>;

    /// Bookings, most recently created first.
    async fn bookings(&self) -> Result<Vec<Booking>>;
}

/// Registry backed by owned vectors, returned exactly in the order given.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    pub sources: Vec<FeedSource>,
    pub blocks: Vec<ManualBlock>,
    pub bookings: Vec<Booking>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: FeedSource) -> Self {
        self.sources.push(source);
        self
    }

    pub fn with_block(mut self, block: ManualBlock) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn with_booking(mut self, booking: Booking) -> Self {
        self.bookings.push(booking);
        self
    }
}

#[async_trait]
impl Registry for MemoryRegistry {
    async fn feed_sources(&self) -> Result<Vec<FeedSource>> {
        Ok(self.sources.clone())
    }

    async fn manual_blocks(&self) -> Result<Vec<ManualBlock>> {
        Ok(self.blocks.clone())
    }

    async fn bookings(&self) -> Result<Vec<Booking>> {
        Ok(self.bookings.clone())
    }
}

/// On-disk JSON snapshot of the registry.
///
/// ```json
/// {"sources": [{"platform": "Airbnb", "url": "https://..."}],
///  "blocks": [{"id": 1, "from": "2024-06-01T00:00:00Z", "to": "2024-06-03T00:00:00Z"}],
///  "bookings": []}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    #[serde(default)]
    pub sources: Vec<FeedSource>,
    #[serde(default)]
    pub blocks: Vec<ManualBlock>,
    #[serde(default)]
    pub bookings: Vec<Booking>,
}

impl RegistrySnapshot {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| MergeError::storage("parse registry snapshot", e))
    }

    /// Blocks ordered by range start, latest first. Ties keep file order.
    pub fn ordered_blocks(&self) -> Vec<ManualBlock> {
        let mut blocks = self.blocks.clone();
        blocks.sort_by(|a, b| b.from.cmp(&a.from));
        blocks
    }

    /// Bookings ordered by creation time, latest first. Undated bookings keep
    /// file order after all dated ones.
    pub fn ordered_bookings(&self) -> Vec<Booking> {
        let mut bookings = self.bookings.clone();
        bookings.sort_by(|a, b| match (a.created_at, b.created_at) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        bookings
    }
}

/// Registry that re-reads a [`RegistrySnapshot`] file on every call.
#[derive(Debug, Clone)]
pub struct JsonFileRegistry {
    path: PathBuf,
}

impl JsonFileRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    async fn snapshot(&self) -> Result<RegistrySnapshot> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| MergeError::storage(&format!("read {}", self.path.display()), e))?;
        RegistrySnapshot::from_json(&raw)
    }
}

#[async_trait]
impl Registry for JsonFileRegistry {
    async fn feed_sources(&self) -> Result<Vec<FeedSource>> {
        Ok(self.snapshot().await?.sources)
    }

    async fn manual_blocks(&self) -> Result<Vec<ManualBlock>> {
        Ok(self.snapshot().await?.ordered_blocks())
    }

    async fn bookings(&self) -> Result<Vec<Booking>> {
        Ok(self.snapshot().await?.ordered_bookings())
    }
}
