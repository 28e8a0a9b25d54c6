//! Integration Tests for the Cache Service
//!
//! Drives the public API through the scenarios a caller relies on.

use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

use serde_json::{json, Value};
use tokio_test::{assert_err, assert_ok};
use ttl_cache::{CacheError, CacheService, CacheStorage, Config, MemoryStorage};

const TTL: Duration = Duration::from_secs(30);

// == Helper Functions ==

fn create_test_cache() -> CacheService {
    CacheService::from_config(MemoryStorage::new(), &Config::default()).unwrap()
}

// == Add / Get ==

#[tokio::test]
async fn test_add_then_get_then_duplicate_add() {
    let cache = create_test_cache();

    assert_ok!(cache.add("a", json!("x"), TTL));
    assert_eq!(*cache.get("a").unwrap(), json!("x"));

    let err = assert_err!(cache.add("a", json!("y"), TTL));
    assert_eq!(err, CacheError::KeyExists("a".to_string()));

    cache.shutdown().await;
}

#[tokio::test]
async fn test_expired_key_is_hidden_then_revived() {
    let cache = create_test_cache();

    assert_ok!(cache.add("a", json!("x"), Duration::from_secs(1)));
    sleep(Duration::from_millis(1100));

    let err = assert_err!(cache.get("a"));
    assert!(matches!(err, CacheError::KeyNotFound(_)));

    assert_ok!(cache.add("a", json!("y"), TTL));
    assert_eq!(*cache.get("a").unwrap(), json!("y"));
    assert_eq!(cache.len(), 1);

    cache.shutdown().await;
}

#[tokio::test]
async fn test_validation_does_not_mutate() {
    let cache = create_test_cache();

    for key in ["", "   "] {
        let err = assert_err!(cache.add(key, json!("v"), TTL));
        assert!(matches!(err, CacheError::InvalidArgument(_)));
    }
    assert_eq!(
        assert_err!(cache.add("k", Value::Null, TTL)),
        CacheError::NullValue
    );
    assert!(cache.is_empty());

    cache.shutdown().await;
}

#[tokio::test]
async fn test_structured_values_are_shared() {
    let cache = create_test_cache();
    let payload = json!({"user": "alice", "roles": ["admin", "ops"]});

    assert_ok!(cache.add("session", payload.clone(), TTL));

    let first = cache.get("session").unwrap();
    let second = cache.get("session").unwrap();
    assert_eq!(*first, payload);
    assert!(Arc::ptr_eq(&first, &second));

    cache.shutdown().await;
}

// == Sweep ==

#[test]
fn test_storage_clear_expired_mixed_ttls() {
    let mut storage = MemoryStorage::new();

    storage.add("one", json!(1), Duration::from_secs(1)).unwrap();
    storage.add("two", json!(2), Duration::from_secs(2)).unwrap();
    storage.add("ten", json!(10), Duration::from_secs(10)).unwrap();
    storage.add("another", json!(1), Duration::from_secs(1)).unwrap();

    sleep(Duration::from_secs(2));
    storage.clear_expired();

    assert_eq!(storage.len(), 1);
    assert!(storage.get("ten").unwrap().is_some());
}

#[tokio::test]
async fn test_background_sweep_with_config() {
    let config = Config {
        sweep_interval_ms: 100,
    };
    let cache = CacheService::from_config(MemoryStorage::new(), &config).unwrap();

    assert_ok!(cache.add("short", json!("x"), Duration::from_millis(150)));
    assert_ok!(cache.add("long", json!("y"), TTL));

    tokio::time::sleep(Duration::from_millis(500)).await;

    let stats = cache.stats();
    assert_eq!(stats.total_entries, 1);
    assert_eq!(stats.expired_removed, 1);
    assert!(stats.sweeps >= 2);

    cache.shutdown().await;
}

// == Concurrency ==

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_adds_on_one_key_admit_one_winner() {
    let cache = Arc::new(create_test_cache());

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let cache = Arc::clone(&cache);
            tokio::task::spawn_blocking(move || cache.add("contested", json!(i), TTL).is_ok())
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap() {
            winners += 1;
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(cache.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_revival_races_fast_sweep() {
    let config = Config {
        sweep_interval_ms: 1,
    };
    let cache = Arc::new(CacheService::from_config(MemoryStorage::new(), &config).unwrap());

    for round in 0..50 {
        // Expired on arrival: the sweep and the revivals below race for it
        assert_ok!(cache.add("contested", json!(-1), Duration::ZERO));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                tokio::task::spawn_blocking(move || {
                    let value = json!(round * 100 + i);
                    cache
                        .add("contested", value.clone(), TTL)
                        .ok()
                        .map(|_| value)
                })
            })
            .collect();

        let mut winners = Vec::new();
        for handle in handles {
            if let Some(value) = handle.await.unwrap() {
                winners.push(value);
            }
        }

        assert_eq!(winners.len(), 1, "Round {} admitted {:?}", round, winners);
        assert_eq!(*cache.get("contested").unwrap(), winners[0]);
        assert!(cache.len() <= 1);

        assert_ok!(cache.remove("contested"));
    }

    assert!(cache.stats().sweeps > 0);
}
