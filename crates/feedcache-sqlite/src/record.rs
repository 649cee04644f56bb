//! Persisted shape of a cached feed and its translation to and from
//! [`FeedImage`].
//!
//! Records are deliberately loosely typed: identifiers and URLs are stored as
//! text. Decoding is partial, and a record whose `id` is not a UUID or whose
//! `url` is not an absolute URL is left out of the decoded feed instead of
//! failing the whole retrieval.

use std::time::SystemTime;

use feedcache_core::{unix_time, FeedImage};
use url::Url;
use uuid::Uuid;

/// One feed image as stored in the `feed_cache_images` table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedImageRecord {
    pub id: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub url: String,
}

impl From<&FeedImage> for FeedImageRecord {
    fn from(image: &FeedImage) -> Self {
        Self {
            id: image.id.hyphenated().to_string(),
            description: image.description.clone(),
            location: image.location.clone(),
            url: image.url.as_str().to_owned(),
        }
    }
}

impl FeedImageRecord {
    /// Decode into a [`FeedImage`], or `None` if the record is unusable.
    pub fn to_domain(&self) -> Option<FeedImage> {
        let id = Uuid::parse_str(&self.id).ok()?;
        let url = Url::parse(&self.url).ok()?;
        Some(FeedImage {
            id,
            description: self.description.clone(),
            location: self.location.clone(),
            url,
        })
    }
}

/// The single stored snapshot: an ordered feed and the time it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSnapshot {
    pub timestamp: SystemTime,
    pub feed: Vec<FeedImageRecord>,
}

impl CacheSnapshot {
    pub fn from_domain(feed: &[FeedImage], timestamp: SystemTime) -> Self {
        Self {
            timestamp,
            feed: feed.iter().map(FeedImageRecord::from).collect(),
        }
    }

    /// Decode every record, dropping unusable ones and keeping the order of
    /// the rest.
    pub fn into_domain(self) -> (Vec<FeedImage>, SystemTime) {
        let feed = self
            .feed
            .iter()
            .filter_map(|record| {
                let image = record.to_domain();
                if image.is_none() {
                    tracing::warn!(
                        record_id = %record.id,
                        url = %record.url,
                        "dropping unusable feed image record"
                    );
                }
                image
            })
            .collect();
        (feed, self.timestamp)
    }
}

/// Timestamp as stored in `feed_cache`: signed seconds and nanoseconds
/// relative to the Unix epoch.
pub(crate) fn encode_timestamp(timestamp: SystemTime) -> Option<(i64, i64)> {
    let (secs, nanos) = unix_time::to_parts(timestamp)?;
    Some((secs, i64::from(nanos)))
}

pub(crate) fn decode_timestamp(secs: i64, nanos: i64) -> Option<SystemTime> {
    unix_time::from_parts(secs, u32::try_from(nanos).ok()?)
}
