use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use async_trait::async_trait;
use feedcache_core::{CachedFeed, FeedCacheError, FeedImage, FeedStore};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

use crate::config::SqliteFeedStoreConfig;
use crate::record::{decode_timestamp, encode_timestamp, CacheSnapshot, FeedImageRecord};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS feed_cache (
        slot            INTEGER PRIMARY KEY CHECK (slot = 0),
        timestamp_secs  INTEGER NOT NULL,
        timestamp_nanos INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS feed_cache_images (
        position    INTEGER PRIMARY KEY,
        id          TEXT    NOT NULL,
        description TEXT,
        location    TEXT,
        url         TEXT    NOT NULL
    );";

/// SQLite-backed feed store.
///
/// Holds one snapshot in a database file (or a named in-memory database for
/// testing). The `feed_cache` table has at most one row, pinned by
/// `CHECK (slot = 0)`, and its images live in `feed_cache_images` ordered by
/// `position`. Each operation is one SQLite transaction run through
/// `tokio::task::spawn_blocking` so the async runtime is never blocked.
///
/// # Example
///
/// ```rust,no_run
/// use feedcache_sqlite::{SqliteFeedStore, SqliteFeedStoreConfig};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// // File-based (persists across restarts)
/// let store = SqliteFeedStore::open(SqliteFeedStoreConfig::new("/var/lib/myapp/feed.db"))?;
///
/// // In-memory (for testing)
/// let store = SqliteFeedStore::in_memory()?;
/// # Ok(())
/// # }
/// ```
pub struct SqliteFeedStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteFeedStore {
    /// Open (and if needed create) the store described by `config`.
    pub fn open(config: SqliteFeedStoreConfig) -> Result<Self, FeedCacheError> {
        let conn = config.connect()?;
        conn.execute_batch(SCHEMA)
            .map_err(|e| FeedCacheError::Open(format!("SQLite create tables: {e}")))?;
        tracing::debug!(location = %config.location, "opened sqlite feed store");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open a store on a private in-memory database.
    pub fn in_memory() -> Result<Self, FeedCacheError> {
        Self::open(SqliteFeedStoreConfig::default())
    }

    /// Run `f` on a blocking worker while holding the connection lock.
    async fn with_connection<T, F>(&self, f: F) -> Result<T, FeedCacheError>
    where
        F: FnOnce(&mut Connection) -> Result<T, FeedCacheError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| FeedCacheError::Transaction(format!("Lock: {e}")))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| FeedCacheError::Transaction(format!("spawn_blocking: {e}")))?
    }
}

fn sqlite_error(step: &'static str) -> impl FnOnce(rusqlite::Error) -> FeedCacheError {
    move |e| FeedCacheError::Transaction(format!("SQLite {step}: {e}"))
}

fn load_snapshot(tx: &Transaction<'_>) -> Result<Option<CacheSnapshot>, FeedCacheError> {
    let header: Option<(i64, i64)> = tx
        .query_row(
            "SELECT timestamp_secs, timestamp_nanos FROM feed_cache WHERE slot = 0",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .map_err(sqlite_error("select snapshot"))?;

    let Some((secs, nanos)) = header else {
        return Ok(None);
    };
    let timestamp = decode_timestamp(secs, nanos).ok_or_else(|| {
        FeedCacheError::Transaction(format!(
            "stored timestamp out of range: {secs}s {nanos}ns"
        ))
    })?;

    let mut stmt = tx
        .prepare(
            "SELECT id, description, location, url FROM feed_cache_images \
             ORDER BY position ASC",
        )
        .map_err(sqlite_error("prepare images"))?;
    let feed = stmt
        .query_map([], |row| {
            Ok(FeedImageRecord {
                id: row.get(0)?,
                description: row.get(1)?,
                location: row.get(2)?,
                url: row.get(3)?,
            })
        })
        .map_err(sqlite_error("select images"))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(sqlite_error("read image row"))?;

    Ok(Some(CacheSnapshot { timestamp, feed }))
}

/// Remove the stored snapshot. Returns whether there was one.
fn clear_snapshot(tx: &Transaction<'_>) -> Result<bool, FeedCacheError> {
    tx.execute("DELETE FROM feed_cache_images", [])
        .map_err(sqlite_error("delete images"))?;
    let removed = tx
        .execute("DELETE FROM feed_cache", [])
        .map_err(sqlite_error("delete snapshot"))?;
    Ok(removed > 0)
}

fn write_snapshot(
    tx: &Transaction<'_>,
    snapshot: &CacheSnapshot,
    secs: i64,
    nanos: i64,
) -> Result<(), FeedCacheError> {
    tx.execute(
        "INSERT INTO feed_cache (slot, timestamp_secs, timestamp_nanos) VALUES (0, ?1, ?2)",
        params![secs, nanos],
    )
    .map_err(sqlite_error("insert snapshot"))?;

    let mut stmt = tx
        .prepare(
            "INSERT INTO feed_cache_images (position, id, description, location, url) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .map_err(sqlite_error("prepare image insert"))?;
    for (position, record) in snapshot.feed.iter().enumerate() {
        stmt.execute(params![
            position as i64,
            record.id,
            record.description,
            record.location,
            record.url,
        ])
        .map_err(sqlite_error("insert image"))?;
    }
    Ok(())
}

#[async_trait]
impl FeedStore for SqliteFeedStore {
    async fn retrieve(&self) -> Result<CachedFeed, FeedCacheError> {
        let snapshot = self
            .with_connection(|conn| {
                let tx = conn.transaction().map_err(sqlite_error("begin"))?;
                let snapshot = load_snapshot(&tx)?;
                tx.commit().map_err(sqlite_error("commit"))?;
                Ok(snapshot)
            })
            .await?;

        match snapshot {
            None => {
                tracing::debug!("retrieved empty feed cache");
                Ok(CachedFeed::Empty)
            }
            Some(snapshot) => {
                let stored = snapshot.feed.len();
                let (feed, timestamp) = snapshot.into_domain();
                tracing::debug!(stored, images = feed.len(), "retrieved feed snapshot");
                Ok(CachedFeed::found(feed, timestamp))
            }
        }
    }

    async fn insert(
        &self,
        feed: &[FeedImage],
        timestamp: SystemTime,
    ) -> Result<(), FeedCacheError> {
        let snapshot = CacheSnapshot::from_domain(feed, timestamp);
        let (secs, nanos) = encode_timestamp(timestamp).ok_or_else(|| {
            FeedCacheError::Transaction(format!("timestamp out of range: {timestamp:?}"))
        })?;
        let images = snapshot.feed.len();

        // Clearing and writing share one IMMEDIATE transaction, so readers
        // see the old snapshot or the new one and never a mix.
        self.with_connection(move |conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(sqlite_error("begin"))?;
            clear_snapshot(&tx)?;
            write_snapshot(&tx, &snapshot, secs, nanos)?;
            tx.commit().map_err(sqlite_error("commit"))
        })
        .await?;

        tracing::debug!(images, "inserted feed snapshot");
        Ok(())
    }

    async fn delete(&self) -> Result<(), FeedCacheError> {
        let removed = self
            .with_connection(|conn| {
                let tx = conn
                    .transaction_with_behavior(TransactionBehavior::Immediate)
                    .map_err(sqlite_error("begin"))?;
                let removed = clear_snapshot(&tx)?;
                tx.commit().map_err(sqlite_error("commit"))?;
                Ok(removed)
            })
            .await?;

        tracing::debug!(removed, "deleted feed snapshot");
        Ok(())
    }
}
