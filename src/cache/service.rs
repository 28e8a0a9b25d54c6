//! Cache Service Module
//!
//! Public cache API over a `CacheStorage`. Enforces add-or-revive semantics,
//! hides expired entries from readers and owns the background expiry sweep.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use tracing::debug;

use crate::cache::storage::{validate_key, validate_value};
use crate::cache::{
    read_storage, write_storage, CacheStats, CacheStorage, CacheValue, MemoryStorage,
    StatsRecorder,
};
use crate::config::{Config, DEFAULT_SWEEP_INTERVAL_MS};
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_sweep_task, sweep_once, SweepHandle};

// == Cache Service ==
/// TTL cache backed by a storage implementation.
///
/// The storage sits behind one lock shared with the sweep task. `add` holds
/// the write lock for its whole check-then-insert sequence. A panic inside
/// the storage does not disable the cache: the lock is recovered on next use.
///
/// # Example
/// ```ignore
/// let cache = CacheService::new(MemoryStorage::new())?;
/// cache.add("a", json!("x"), Duration::from_secs(30))?;
/// assert_eq!(*cache.get("a")?, json!("x"));
/// cache.shutdown().await;
/// ```
#[derive(Debug)]
pub struct CacheService<S: CacheStorage = MemoryStorage> {
    storage: Arc<RwLock<S>>,
    stats: Arc<StatsRecorder>,
    sweeper: SweepHandle,
}

impl<S: CacheStorage> CacheService<S> {
    // == Constructors ==
    /// Creates a service with the default sweep interval.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(storage: S) -> Result<Self> {
        Self::with_sweep_interval(storage, Duration::from_millis(DEFAULT_SWEEP_INTERVAL_MS))
    }

    /// Creates a service using the sweep interval from `config`.
    pub fn from_config(storage: S, config: &Config) -> Result<Self> {
        Self::with_sweep_interval(storage, config.sweep_interval())
    }

    /// Creates a service that sweeps expired entries every `interval`.
    ///
    /// # Errors
    /// - `InvalidArgument` if `interval` is zero
    /// - `Internal` if called outside a tokio runtime
    pub fn with_sweep_interval(storage: S, interval: Duration) -> Result<Self> {
        let storage = Arc::new(RwLock::new(storage));
        let stats = Arc::new(StatsRecorder::new());
        let sweeper = spawn_sweep_task(storage.clone(), stats.clone(), interval)?;

        Ok(Self {
            storage,
            stats,
            sweeper,
        })
    }

    // == Add ==
    /// Stores `value` under `key` for `ttl`.
    ///
    /// A key whose entry has expired but not yet been swept is revived in
    /// place with the new value and TTL.
    ///
    /// # Errors
    /// - `InvalidArgument` for an empty or whitespace key
    /// - `NullValue` for a null value
    /// - `KeyExists` if the key holds a live entry
    pub fn add(&self, key: &str, value: CacheValue, ttl: Duration) -> Result<()> {
        validate_key(key)?;
        validate_value(&value)?;

        let mut storage = write_storage(&*self.storage);

        let existing = storage.get(key)?;
        match existing {
            None => storage.add(key, value, ttl),
            Some(entry) if entry.is_alive() => Err(CacheError::KeyExists(key.to_string())),
            Some(_) => {
                debug!(key, "Reviving expired key");
                storage.change_value(key, value, ttl)
            }
        }
    }

    // == Get ==
    /// Returns the live value stored under `key`.
    ///
    /// Expired entries are reported as `KeyNotFound` and left in place for
    /// the sweep.
    pub fn get(&self, key: &str) -> Result<Arc<CacheValue>> {
        validate_key(key)?;

        let entry = {
            let storage = read_storage(&*self.storage);
            storage.get(key)?
        };

        match entry {
            Some(entry) if entry.is_alive() => {
                self.stats.record_hit();
                Ok(entry.value())
            }
            _ => {
                self.stats.record_miss();
                Err(CacheError::KeyNotFound(key.to_string()))
            }
        }
    }

    // == Remove ==
    /// Removes the entry under `key`, alive or not.
    pub fn remove(&self, key: &str) -> Result<()> {
        validate_key(key)?;

        let mut storage = write_storage(&*self.storage);
        match storage.remove(key)? {
            Some(_) => {
                debug!(key, "Removed key");
                Ok(())
            }
            None => Err(CacheError::KeyNotFound(key.to_string())),
        }
    }

    // == Purge Expired ==
    /// Runs a sweep now instead of waiting for the next tick.
    ///
    /// Returns `Internal` if the storage panicked during the sweep.
    pub fn purge_expired(&self) -> Result<usize> {
        sweep_once(&*self.storage, &self.stats)
    }

    // == Length ==
    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        read_storage(&*self.storage).len()
    }

    // == Is Empty ==
    /// Returns true if no entries are stored, expired or not.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.len())
    }

    // == Shutdown ==
    /// Stops the sweep task and waits for it to exit.
    ///
    /// Dropping the service also stops the task, without waiting.
    pub async fn shutdown(self) {
        self.sweeper.join().await;
    }
}
