//! feedcache: a persistent single-slot cache for image feed snapshots.
//!
//! This crate re-exports the feedcache sub-crates for single-import usage.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `default` | `sqlite`, `memory` |
//! | `sqlite` | `SqliteFeedStore`, backed by a SQLite file or named in-memory database |
//! | `memory` | `InMemoryFeedStore`, a process-local store for tests |
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use feedcache::core::{CachedFeed, FeedImage, FeedStore};
//! use feedcache::sqlite::{SqliteFeedStore, SqliteFeedStoreConfig};
//! ```

/// Core types and traits: FeedImage, CachedFeed, FeedStore, FeedCacheError.
/// Always available.
pub use feedcache_core as core;

/// SQLite-backed FeedStore and its configuration.
#[cfg(feature = "sqlite")]
pub use feedcache_sqlite as sqlite;

/// In-memory FeedStore.
#[cfg(feature = "memory")]
pub use feedcache_memory as memory;

pub use feedcache_core::{CachedFeed, FeedCacheError, FeedImage, FeedStore};
