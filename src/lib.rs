//! TTL Cache - An in-process key-value cache
//!
//! Stores values under string keys with a per-entry time-to-live and
//! reclaims expired entries with a background sweep.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{CacheEntry, CacheService, CacheStats, CacheStorage, CacheValue, MemoryStorage};
pub use config::Config;
pub use error::{CacheError, Result};
