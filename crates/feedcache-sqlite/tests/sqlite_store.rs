use std::time::{Duration, SystemTime, UNIX_EPOCH};

use feedcache_sqlite::{CachedFeed, FeedImage, FeedStore, SqliteFeedStore, SqliteFeedStoreConfig};
use url::Url;
use uuid::Uuid;

fn unique_image(url: &str) -> FeedImage {
    FeedImage::new(Uuid::new_v4(), Url::parse(url).unwrap())
        .with_description("any description")
        .with_location("any location")
}

fn unique_feed() -> Vec<FeedImage> {
    vec![
        unique_image("https://a-url.com/1"),
        unique_image("https://a-url.com/2"),
    ]
}

fn at(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

// ---------------------------------------------------------------------------
// Retrieve
// ---------------------------------------------------------------------------

#[tokio::test]
async fn retrieve_delivers_empty_on_empty_cache() {
    let store = SqliteFeedStore::in_memory().unwrap();
    assert_eq!(store.retrieve().await.unwrap(), CachedFeed::Empty);
}

#[tokio::test]
async fn retrieve_has_no_side_effects_on_empty_cache() {
    let store = SqliteFeedStore::in_memory().unwrap();
    assert_eq!(store.retrieve().await.unwrap(), CachedFeed::Empty);
    assert_eq!(store.retrieve().await.unwrap(), CachedFeed::Empty);
}

#[tokio::test]
async fn retrieve_delivers_found_values_on_non_empty_cache() {
    let store = SqliteFeedStore::in_memory().unwrap();
    let feed = unique_feed();
    let timestamp = SystemTime::now();

    store.insert(&feed, timestamp).await.unwrap();

    assert_eq!(
        store.retrieve().await.unwrap(),
        CachedFeed::found(feed, timestamp)
    );
}

#[tokio::test]
async fn retrieve_has_no_side_effects_on_non_empty_cache() {
    let store = SqliteFeedStore::in_memory().unwrap();
    let feed = unique_feed();
    store.insert(&feed, at(1000)).await.unwrap();

    for _ in 0..3 {
        assert_eq!(
            store.retrieve().await.unwrap(),
            CachedFeed::found(feed.clone(), at(1000))
        );
    }
}

#[tokio::test]
async fn retrieve_preserves_optional_fields_and_order() {
    let store = SqliteFeedStore::in_memory().unwrap();
    let bare = FeedImage::new(Uuid::new_v4(), Url::parse("http://a.com").unwrap());
    let described = unique_image("http://b.com/img.png?size=large");
    let empty_text = FeedImage::new(Uuid::new_v4(), Url::parse("http://c.com").unwrap())
        .with_description("")
        .with_location("");
    let feed = vec![described, bare, empty_text];

    store.insert(&feed, at(5)).await.unwrap();

    let cached = store.retrieve().await.unwrap();
    assert_eq!(cached.feed().unwrap(), feed.as_slice());
}

#[tokio::test]
async fn retrieve_preserves_sub_second_and_pre_epoch_timestamps() {
    let store = SqliteFeedStore::in_memory().unwrap();

    let precise = UNIX_EPOCH + Duration::new(1_700_000_000, 987_654_321);
    store.insert(&[], precise).await.unwrap();
    assert_eq!(store.retrieve().await.unwrap().timestamp(), Some(precise));

    let before_epoch = UNIX_EPOCH - Duration::new(86_400, 250_000_000);
    store.insert(&[], before_epoch).await.unwrap();
    assert_eq!(store.retrieve().await.unwrap().timestamp(), Some(before_epoch));
}

// ---------------------------------------------------------------------------
// Insert
// ---------------------------------------------------------------------------

#[tokio::test]
async fn insert_delivers_no_error_on_empty_cache() {
    let store = SqliteFeedStore::in_memory().unwrap();
    assert!(store.insert(&unique_feed(), SystemTime::now()).await.is_ok());
}

#[tokio::test]
async fn insert_delivers_no_error_on_non_empty_cache() {
    let store = SqliteFeedStore::in_memory().unwrap();
    store.insert(&unique_feed(), SystemTime::now()).await.unwrap();
    assert!(store.insert(&unique_feed(), SystemTime::now()).await.is_ok());
}

#[tokio::test]
async fn insert_overrides_previously_inserted_cache_values() {
    let store = SqliteFeedStore::in_memory().unwrap();
    store.insert(&unique_feed(), at(1000)).await.unwrap();

    let latest = vec![unique_image("https://a-url.com/latest")];
    store.insert(&latest, at(2000)).await.unwrap();

    assert_eq!(
        store.retrieve().await.unwrap(),
        CachedFeed::found(latest, at(2000))
    );
}

#[tokio::test]
async fn insert_keeps_duplicate_images() {
    let store = SqliteFeedStore::in_memory().unwrap();
    let img = unique_image("https://a-url.com/dup");
    let feed = vec![img.clone(), img.clone(), img];

    store.insert(&feed, at(1)).await.unwrap();
    assert_eq!(store.retrieve().await.unwrap().feed().unwrap(), feed.as_slice());
}

#[tokio::test]
async fn insert_large_feed_roundtrips() {
    let store = SqliteFeedStore::in_memory().unwrap();
    let feed: Vec<FeedImage> = (0..500)
        .map(|i| unique_image(&format!("https://a-url.com/{i}")))
        .collect();

    store.insert(&feed, at(9)).await.unwrap();
    assert_eq!(store.retrieve().await.unwrap(), CachedFeed::found(feed, at(9)));
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_delivers_no_error_on_empty_cache() {
    let store = SqliteFeedStore::in_memory().unwrap();
    assert!(store.delete().await.is_ok());
}

#[tokio::test]
async fn delete_has_no_side_effects_on_empty_cache() {
    let store = SqliteFeedStore::in_memory().unwrap();
    store.delete().await.unwrap();
    assert_eq!(store.retrieve().await.unwrap(), CachedFeed::Empty);
}

#[tokio::test]
async fn delete_delivers_no_error_on_non_empty_cache() {
    let store = SqliteFeedStore::in_memory().unwrap();
    store.insert(&unique_feed(), SystemTime::now()).await.unwrap();
    assert!(store.delete().await.is_ok());
}

#[tokio::test]
async fn delete_empties_previously_inserted_cache() {
    let store = SqliteFeedStore::in_memory().unwrap();
    store.insert(&unique_feed(), SystemTime::now()).await.unwrap();

    store.delete().await.unwrap();
    assert_eq!(store.retrieve().await.unwrap(), CachedFeed::Empty);
}

// ---------------------------------------------------------------------------
// End-to-end scenario
// ---------------------------------------------------------------------------

#[tokio::test]
async fn insert_empty_feed_then_delete_walkthrough() {
    let store = SqliteFeedStore::in_memory().unwrap();
    let image = FeedImage::new(Uuid::new_v4(), Url::parse("http://a.com").unwrap())
        .with_location("NYC");

    store.insert(&[image.clone()], at(1000)).await.unwrap();
    assert_eq!(
        store.retrieve().await.unwrap(),
        CachedFeed::found(vec![image], at(1000))
    );

    store.insert(&[], at(2000)).await.unwrap();
    assert_eq!(
        store.retrieve().await.unwrap(),
        CachedFeed::found(vec![], at(2000))
    );

    store.delete().await.unwrap();
    assert_eq!(store.retrieve().await.unwrap(), CachedFeed::Empty);
}

// ---------------------------------------------------------------------------
// Storage locations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn file_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("feed.db");
    let feed = unique_feed();

    {
        let store = SqliteFeedStore::open(SqliteFeedStoreConfig::new(&path)).unwrap();
        store.insert(&feed, at(3000)).await.unwrap();
    }

    let reopened = SqliteFeedStore::open(SqliteFeedStoreConfig::new(&path)).unwrap();
    assert_eq!(
        reopened.retrieve().await.unwrap(),
        CachedFeed::found(feed, at(3000))
    );
}

#[tokio::test]
async fn stores_sharing_memory_identifier_see_each_other() {
    let identifier = format!("shared-{}", Uuid::new_v4());
    let writer = SqliteFeedStore::open(SqliteFeedStoreConfig::in_memory(&identifier)).unwrap();
    let reader = SqliteFeedStore::open(SqliteFeedStoreConfig::in_memory(&identifier)).unwrap();
    let feed = unique_feed();

    writer.insert(&feed, at(4000)).await.unwrap();
    assert_eq!(
        reader.retrieve().await.unwrap(),
        CachedFeed::found(feed, at(4000))
    );

    reader.delete().await.unwrap();
    assert_eq!(writer.retrieve().await.unwrap(), CachedFeed::Empty);
}

#[tokio::test]
async fn separate_memory_identifiers_are_isolated() {
    let a = SqliteFeedStore::open(SqliteFeedStoreConfig::in_memory(Uuid::new_v4().to_string()))
        .unwrap();
    let b = SqliteFeedStore::open(SqliteFeedStoreConfig::in_memory(Uuid::new_v4().to_string()))
        .unwrap();

    a.insert(&unique_feed(), at(1)).await.unwrap();
    assert_eq!(b.retrieve().await.unwrap(), CachedFeed::Empty);
}

#[tokio::test]
async fn default_in_memory_stores_are_isolated() {
    let a = SqliteFeedStore::in_memory().unwrap();
    let b = SqliteFeedStore::in_memory().unwrap();

    a.insert(&unique_feed(), at(1)).await.unwrap();
    assert_eq!(b.retrieve().await.unwrap(), CachedFeed::Empty);
}
