//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with an absolute expiry.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::cache::CacheValue;

// == Cache Entry ==
/// A stored value paired with the instant it stops being alive.
///
/// Entries are immutable; updating a key builds a new entry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    value: Arc<CacheValue>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry that expires `ttl` from now.
    pub fn new(value: CacheValue, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            value: Arc::new(value),
            created_at: now,
            expires_at: expiry_after(now, ttl),
        }
    }

    /// Creates an entry with an explicit expiration instant.
    pub fn with_expiry(value: CacheValue, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: Arc::new(value),
            created_at: Utc::now(),
            expires_at,
        }
    }

    // == Accessors ==
    /// Returns a shared handle to the stored value.
    pub fn value(&self) -> Arc<CacheValue> {
        Arc::clone(&self.value)
    }

    /// Returns when the entry was built.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the instant the entry stops being alive.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    // == Is Alive ==
    /// Checks whether the entry is still alive.
    ///
    /// Evaluated against the clock on every call. An entry whose expiration
    /// instant equals the current time is already dead.
    pub fn is_alive(&self) -> bool {
        self.expires_at > Utc::now()
    }

    // == Is Expired ==
    /// Inverse of `is_alive`.
    pub fn is_expired(&self) -> bool {
        !self.is_alive()
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, or zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        (self.expires_at - Utc::now())
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

/// Computes `now + ttl`, saturating at the latest representable instant.
fn expiry_after(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
