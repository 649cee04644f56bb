//! SQLite persistence for the feedcache workspace.
//!
//! This crate provides:
//! - [`SqliteFeedStore`]: a [`FeedStore`] that keeps the single cached feed
//!   snapshot in SQLite, replacing it atomically on every insert.
//! - [`SqliteFeedStoreConfig`]: where the database lives (a file or a named
//!   in-memory database) and how long to wait on locks.
//! - The persisted record model ([`FeedImageRecord`], [`CacheSnapshot`]).
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::time::SystemTime;
//!
//! use feedcache_sqlite::{FeedStore, SqliteFeedStore, SqliteFeedStoreConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteFeedStore::open(SqliteFeedStoreConfig::new("/tmp/feed.db"))?;
//! store.insert(&[], SystemTime::now()).await?;
//! let cached = store.retrieve().await?;
//! assert!(!cached.is_empty());
//! # Ok(())
//! # }
//! ```

mod config;
pub mod record;
mod store;

pub use config::{SqliteFeedStoreConfig, StorageLocation};
pub use record::{CacheSnapshot, FeedImageRecord};
pub use store::SqliteFeedStore;

// Re-export core types for convenience.
pub use feedcache_core::{CachedFeed, FeedCacheError, FeedImage, FeedStore};
