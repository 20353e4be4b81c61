//! Snapshot reuse and refresh over a scripted remote.

mod helpers;

use std::sync::atomic::Ordering;
use std::time::Duration;

use tempfile::TempDir;

use bulk_mutator::snapshot::{load_or_refresh, Snapshot, SnapshotCache};

use helpers::{ample, dummy_products, ScriptedRemote};

const QUERY: &str = "title:Dummy*";

fn cache_in(dir: &TempDir) -> SnapshotCache {
    SnapshotCache::new(dir.path().join("inventory_cache.json"), Duration::from_secs(3600))
}

#[tokio::test]
async fn test_fresh_cache_is_used_without_fetching() {
    let dir = TempDir::new().unwrap();
    let cache = cache_in(&dir);
    cache.save(&dummy_products(1, 2)).unwrap();
    let remote = ScriptedRemote::steady(ample()).with_products(dummy_products(3, 1));

    let products = load_or_refresh(&remote, &cache, QUERY).await.unwrap();

    assert_eq!(products, dummy_products(1, 2));
    assert_eq!(remote.pages.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_stale_cache_is_refreshed_and_replaced() {
    let dir = TempDir::new().unwrap();
    let cache = cache_in(&dir);
    let stale = Snapshot {
        saved_at: chrono::Utc::now().timestamp_millis() - 2 * 60 * 60 * 1000,
        products: dummy_products(1, 1),
    };
    std::fs::write(cache.path(), serde_json::to_string(&stale).unwrap()).unwrap();
    let remote = ScriptedRemote::steady(ample()).with_products(dummy_products(3, 1));

    let products = load_or_refresh(&remote, &cache, QUERY).await.unwrap();

    assert_eq!(products.len(), 3);
    // Two products per scripted page
    assert_eq!(remote.pages.load(Ordering::SeqCst), 2);
    assert!(cache.is_valid());
    assert_eq!(cache.load().unwrap().len(), 3);
}

#[tokio::test]
async fn test_unreadable_or_missing_cache_is_refreshed() {
    let dir = TempDir::new().unwrap();
    let cache = cache_in(&dir);
    let remote = ScriptedRemote::steady(ample()).with_products(dummy_products(2, 1));

    assert_eq!(load_or_refresh(&remote, &cache, QUERY).await.unwrap().len(), 2);

    std::fs::write(cache.path(), "not json").unwrap();
    assert_eq!(load_or_refresh(&remote, &cache, QUERY).await.unwrap().len(), 2);
    assert_eq!(remote.pages.load(Ordering::SeqCst), 2);
}
