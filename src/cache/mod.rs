//! Cache Module
//!
//! Provides in-memory key-value caching with per-entry TTL expiration.

mod entry;
mod service;
mod stats;
mod storage;


// Re-export public types
pub use entry::CacheEntry;
pub use service::CacheService;
pub use stats::{CacheStats, StatsRecorder};
pub(crate) use storage::{read_storage, write_storage};
pub use storage::{validate_key, validate_value, CacheStorage, MemoryStorage};

/// Payload type stored in the cache. `Value::Null` is rejected on insert.
pub type CacheValue = serde_json::Value;
