use std::time::{Duration, UNIX_EPOCH};

use feedcache::core::url::Url;
use feedcache::core::uuid::Uuid;
use feedcache::sqlite::{SqliteFeedStore, SqliteFeedStoreConfig};
use feedcache::{CachedFeed, FeedImage, FeedStore};
use tracing_subscriber::EnvFilter;

fn print_cached(label: &str, cached: &CachedFeed) -> Result<(), serde_json::Error> {
    println!("=== {label} ===");
    println!("{}", serde_json::to_string_pretty(cached)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
        .init();

    // Usage: feed_cache [DB_PATH]   (in-memory when omitted)
    let config = match std::env::args().nth(1) {
        Some(path) => SqliteFeedStoreConfig::new(path),
        None => SqliteFeedStoreConfig::default(),
    };
    tracing::info!(location = %config.location, "opening feed store");
    let store = SqliteFeedStore::open(config)?;

    print_cached("Before any insert", &store.retrieve().await?)?;

    // --- A one-image feed ---
    let image = FeedImage::new(Uuid::new_v4(), Url::parse("http://a.com")?).with_location("NYC");
    store.insert(&[image], UNIX_EPOCH + Duration::from_secs(1000)).await?;
    print_cached("After inserting one image", &store.retrieve().await?)?;

    // --- An empty feed is still a snapshot ---
    store.insert(&[], UNIX_EPOCH + Duration::from_secs(2000)).await?;
    print_cached("After inserting an empty feed", &store.retrieve().await?)?;

    // --- Delete ---
    store.delete().await?;
    print_cached("After delete", &store.retrieve().await?)?;

    Ok(())
}
