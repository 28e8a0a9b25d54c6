//! Background Tasks Module
//!
//! Contains background tasks that run periodically for the lifetime of a cache.
//!
//! # Tasks
//! - Expiry sweep: removes expired cache entries at a fixed interval

mod sweep;

pub(crate) use sweep::sweep_once;
pub use sweep::{spawn_sweep_task, SweepHandle};
