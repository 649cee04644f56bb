//! In-memory [`FeedStore`] for the feedcache workspace.
//!
//! [`InMemoryFeedStore`] keeps its snapshot in process memory, so it is lost
//! when the store is dropped. It honors the same contract as the SQLite
//! backend and is handy as a test double for code that decides when to
//! cache, refresh or invalidate a feed.
//!
//! ```rust
//! use std::time::SystemTime;
//!
//! use feedcache_memory::{FeedStore, InMemoryFeedStore};
//!
//! # async fn example() -> Result<(), feedcache_memory::FeedCacheError> {
//! let store = InMemoryFeedStore::new();
//! store.insert(&[], SystemTime::now()).await?;
//! assert!(!store.retrieve().await?.is_empty());
//! # Ok(())
//! # }
//! ```

use std::time::SystemTime;

use async_trait::async_trait;
use tokio::sync::RwLock;

// Re-export core types for convenience.
pub use feedcache_core::{CachedFeed, FeedCacheError, FeedImage, FeedStore};

struct Snapshot {
    feed: Vec<FeedImage>,
    timestamp: SystemTime,
}

/// A [`FeedStore`] holding its single snapshot behind an async `RwLock`.
///
/// Readers share the lock; `insert` and `delete` swap the whole slot under
/// one write guard, so a reader sees either the old snapshot or the new one.
#[derive(Default)]
pub struct InMemoryFeedStore {
    slot: RwLock<Option<Snapshot>>,
}

impl InMemoryFeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `feed` written at `timestamp`.
    pub fn with_snapshot(feed: Vec<FeedImage>, timestamp: SystemTime) -> Self {
        Self {
            slot: RwLock::new(Some(Snapshot { feed, timestamp })),
        }
    }
}

#[async_trait]
impl FeedStore for InMemoryFeedStore {
    async fn retrieve(&self) -> Result<CachedFeed, FeedCacheError> {
        let slot = self.slot.read().await;
        Ok(match slot.as_ref() {
            None => CachedFeed::Empty,
            Some(snapshot) => CachedFeed::found(snapshot.feed.clone(), snapshot.timestamp),
        })
    }

    async fn insert(
        &self,
        feed: &[FeedImage],
        timestamp: SystemTime,
    ) -> Result<(), FeedCacheError> {
        let snapshot = Snapshot {
            feed: feed.to_vec(),
            timestamp,
        };
        *self.slot.write().await = Some(snapshot);
        tracing::debug!(images = feed.len(), "inserted in-memory feed snapshot");
        Ok(())
    }

    async fn delete(&self) -> Result<(), FeedCacheError> {
        let removed = self.slot.write().await.take().is_some();
        tracing::debug!(removed, "deleted in-memory feed snapshot");
        Ok(())
    }
}
