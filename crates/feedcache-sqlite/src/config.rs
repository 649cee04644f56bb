use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use feedcache_core::FeedCacheError;
use rusqlite::{Connection, OpenFlags};
use uuid::Uuid;

/// Where a [`SqliteFeedStore`](crate::SqliteFeedStore) keeps its database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    /// A database file that survives restarts.
    Path(PathBuf),
    /// A named in-memory database. Every store opened with the same name
    /// sees the same data for as long as at least one of them is alive.
    InMemory(String),
}

impl fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageLocation::Path(path) => write!(f, "{}", path.display()),
            StorageLocation::InMemory(identifier) => write!(f, "memory:{identifier}"),
        }
    }
}

/// Configuration for [`SqliteFeedStore`](crate::SqliteFeedStore).
#[derive(Debug, Clone)]
pub struct SqliteFeedStoreConfig {
    pub location: StorageLocation,
    /// How long a transaction waits for a lock held by another connection
    /// before failing. Defaults to 5 seconds.
    pub busy_timeout: Duration,
}

impl SqliteFeedStoreConfig {
    pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

    /// Store the cache in the database file at `path`, creating it if needed.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            location: StorageLocation::Path(path.into()),
            busy_timeout: Self::DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Store the cache in the in-memory database named `identifier`.
    pub fn in_memory(identifier: impl Into<String>) -> Self {
        Self {
            location: StorageLocation::InMemory(identifier.into()),
            busy_timeout: Self::DEFAULT_BUSY_TIMEOUT,
        }
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    pub(crate) fn connect(&self) -> Result<Connection, FeedCacheError> {
        let conn = match &self.location {
            StorageLocation::Path(path) => Connection::open(path).map_err(|e| {
                FeedCacheError::Open(format!("SQLite open {}: {e}", path.display()))
            })?,
            StorageLocation::InMemory(identifier) => {
                if identifier.trim().is_empty() {
                    return Err(FeedCacheError::Open(
                        "in-memory identifier must not be empty".to_string(),
                    ));
                }
                Connection::open_with_flags(
                    shared_memory_uri(identifier),
                    OpenFlags::SQLITE_OPEN_READ_WRITE
                        | OpenFlags::SQLITE_OPEN_CREATE
                        | OpenFlags::SQLITE_OPEN_URI
                        | OpenFlags::SQLITE_OPEN_NO_MUTEX,
                )
                .map_err(|e| FeedCacheError::Open(format!("SQLite open {}: {e}", self.location)))?
            }
        };
        conn.busy_timeout(self.busy_timeout)
            .map_err(|e| FeedCacheError::Open(format!("SQLite busy timeout: {e}")))?;
        Ok(conn)
    }
}

impl Default for SqliteFeedStoreConfig {
    /// A private in-memory database under a freshly generated name.
    fn default() -> Self {
        Self::in_memory(Uuid::new_v4().to_string())
    }
}

/// A `memdb` VFS URI. The leading `/` makes the database visible to every
/// connection in the process that opens the same name. Lock conflicts on it
/// report `SQLITE_BUSY` and wait out the busy timeout.
fn shared_memory_uri(identifier: &str) -> String {
    let name: String = url::form_urlencoded::byte_serialize(identifier.as_bytes()).collect();
    format!("file:/feedcache-{name}?vfs=memdb")
}
