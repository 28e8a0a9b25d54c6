//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for storage and service operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key is empty or whitespace-only, or another argument is unusable
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Value argument is null
    #[error("Value is null")]
    NullValue,

    /// Key is already present (and alive, at the service layer)
    #[error("Key already exists: {0}")]
    KeyExists(String),

    /// Key is absent, or present but expired when read through the service
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// Internal failure (panicking sweep, missing runtime)
    #[error("Internal error: {0}")]
    Internal(String),
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
