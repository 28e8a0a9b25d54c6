//! Cache Storage Module
//!
//! The key to entry mapping. Storage does no liveness gatekeeping on lookup;
//! callers decide what an expired entry means.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheValue};
use crate::error::{CacheError, Result};

// == Storage Trait ==
/// Operations the cache service needs from its backing storage.
///
/// Implementations are driven through a single lock owned by the service,
/// so methods take `&self` / `&mut self` and do no locking of their own.
pub trait CacheStorage: Send + Sync + 'static {
    /// Returns the entry stored under `key`, alive or not.
    fn get(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Inserts a new entry. Fails with `KeyExists` if the key is present,
    /// whether or not its entry is alive.
    fn add(&mut self, key: &str, value: CacheValue, ttl: Duration) -> Result<()>;

    /// Replaces the entry under an existing key with a fresh one.
    fn change_value(&mut self, key: &str, value: CacheValue, ttl: Duration) -> Result<()>;

    /// Removes every entry that is not alive and returns how many were removed.
    fn clear_expired(&mut self) -> usize;

    /// Removes the entry under `key`, returning it if it was present.
    fn remove(&mut self, key: &str) -> Result<Option<CacheEntry>>;

    /// Number of stored entries, expired ones included.
    fn len(&self) -> usize;

    /// Returns true if nothing is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// == Validation ==
/// Rejects empty and whitespace-only keys.
pub fn validate_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(CacheError::InvalidArgument(
            "key must not be empty or whitespace".to_string(),
        ));
    }
    Ok(())
}

/// Rejects null values.
pub fn validate_value(value: &CacheValue) -> Result<()> {
    if value.is_null() {
        return Err(CacheError::NullValue);
    }
    Ok(())
}

fn validate_arguments(key: &str, value: &CacheValue) -> Result<()> {
    validate_key(key)?;
    validate_value(value)
}

// == Lock Access ==
/// Acquires the storage read lock, recovering it if a previous holder panicked.
///
/// Entries are replaced whole, so a panic mid-operation never leaves a
/// half-written entry behind.
pub(crate) fn read_storage<S>(lock: &RwLock<S>) -> RwLockReadGuard<'_, S> {
    lock.read().unwrap_or_else(|poisoned| {
        warn!("Recovering poisoned storage lock");
        lock.clear_poison();
        poisoned.into_inner()
    })
}

/// Acquires the storage write lock, recovering it if a previous holder panicked.
pub(crate) fn write_storage<S>(lock: &RwLock<S>) -> RwLockWriteGuard<'_, S> {
    lock.write().unwrap_or_else(|poisoned| {
        warn!("Recovering poisoned storage lock");
        lock.clear_poison();
        poisoned.into_inner()
    })
}

// == Memory Storage ==
/// HashMap-backed storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, CacheEntry>,
}

impl MemoryStorage {
    // == Constructor ==
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        validate_key(key)?;
        Ok(self.entries.get(key).cloned())
    }

    fn add(&mut self, key: &str, value: CacheValue, ttl: Duration) -> Result<()> {
        validate_arguments(key, &value)?;

        if self.entries.contains_key(key) {
            return Err(CacheError::KeyExists(key.to_string()));
        }

        self.entries
            .insert(key.to_string(), CacheEntry::new(value, ttl));
        Ok(())
    }

    fn change_value(&mut self, key: &str, value: CacheValue, ttl: Duration) -> Result<()> {
        validate_arguments(key, &value)?;

        match self.entries.get_mut(key) {
            Some(entry) => {
                *entry = CacheEntry::new(value, ttl);
                Ok(())
            }
            None => Err(CacheError::KeyNotFound(key.to_string())),
        }
    }

    // == Clear Expired ==
    /// Collects dead keys in one scan, then removes exactly those keys.
    fn clear_expired(&mut self) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.entries.remove(key);
        }

        if !expired_keys.is_empty() {
            debug!(removed = expired_keys.len(), "Cleared expired entries");
        }
        expired_keys.len()
    }

    fn remove(&mut self, key: &str) -> Result<Option<CacheEntry>> {
        validate_key(key)?;
        Ok(self.entries.remove(key))
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
