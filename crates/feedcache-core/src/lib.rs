use std::time::SystemTime;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

pub mod unix_time;

pub use url;
pub use uuid;

// ---------------------------------------------------------------------------
// FeedImage
// ---------------------------------------------------------------------------

/// A single image in a feed, in the strongly-typed form callers work with.
///
/// Two images with the same `id` describe the same logical image, but stores
/// never deduplicate: a feed is persisted exactly as given, in order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedImage {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub url: Url,
}

impl FeedImage {
    pub fn new(id: Uuid, url: Url) -> Self {
        Self {
            id,
            description: None,
            location: None,
            url,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

// ---------------------------------------------------------------------------
// CachedFeed: the outcome of a retrieval
// ---------------------------------------------------------------------------

/// What a [`FeedStore`] currently holds.
///
/// `Found` with an empty `feed` is a real snapshot (an empty feed was
/// inserted) and is distinct from `Empty`, which means nothing is cached.
///
/// Serialized timestamps use [`unix_time`], so times before 1970 survive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CachedFeed {
    Empty,
    Found {
        feed: Vec<FeedImage>,
        #[serde(with = "unix_time")]
        timestamp: SystemTime,
    },
}

impl CachedFeed {
    pub fn found(feed: Vec<FeedImage>, timestamp: SystemTime) -> Self {
        CachedFeed::Found { feed, timestamp }
    }

    /// `true` when no snapshot is stored.
    pub fn is_empty(&self) -> bool {
        matches!(self, CachedFeed::Empty)
    }

    pub fn feed(&self) -> Option<&[FeedImage]> {
        match self {
            CachedFeed::Empty => None,
            CachedFeed::Found { feed, .. } => Some(feed),
        }
    }

    pub fn timestamp(&self) -> Option<SystemTime> {
        match self {
            CachedFeed::Empty => None,
            CachedFeed::Found { timestamp, .. } => Some(*timestamp),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type shared by every feed store backend.
///
/// Records that cannot be decoded back into a [`FeedImage`] are not errors;
/// backends leave them out of the retrieved feed.
#[derive(Debug, Error)]
pub enum FeedCacheError {
    /// The backing storage could not be opened or initialized.
    #[error("open error: {0}")]
    Open(String),
    /// A retrieve, insert or delete could not complete. Nothing was changed.
    #[error("transaction error: {0}")]
    Transaction(String),
}

// ---------------------------------------------------------------------------
// FeedStore trait (implemented in feedcache-sqlite and feedcache-memory)
// ---------------------------------------------------------------------------

/// Single-slot storage for the most recently cached feed.
///
/// A store holds at most one snapshot: a feed plus the time it was written.
/// Every call resolves exactly once, and operations on one store appear to
/// run in some total order: a `retrieve` never observes a half-written
/// `insert`.
#[async_trait]
pub trait FeedStore: Send + Sync {
    /// Read the current snapshot. Never modifies what is stored.
    async fn retrieve(&self) -> Result<CachedFeed, FeedCacheError>;

    /// Replace the current snapshot (if any) with `feed` written at `timestamp`.
    ///
    /// On error the previous snapshot is left as it was.
    async fn insert(&self, feed: &[FeedImage], timestamp: SystemTime)
        -> Result<(), FeedCacheError>;

    /// Remove the current snapshot. Succeeds when nothing is stored.
    async fn delete(&self) -> Result<(), FeedCacheError>;
}
