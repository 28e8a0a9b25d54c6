//! Expiry Sweep Task
//!
//! Background task that periodically removes expired cache entries.
//! Reads never depend on it: expired entries are already invisible through
//! the service, the sweep only reclaims their memory.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::cache::{write_storage, CacheStorage, StatsRecorder};
use crate::error::{CacheError, Result};

// == Sweep Handle ==
/// Handle to a running sweep task.
///
/// Dropping the handle signals the task and aborts it.
#[derive(Debug)]
pub struct SweepHandle {
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl SweepHandle {
    /// Signals the task to stop after its current tick. Idempotent.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Stops the task and waits for it to finish.
    pub async fn join(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if e.is_panic() {
                    error!("Expiry sweep task panicked: {}", e);
                }
            }
        }
    }

    /// Returns true once the task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |task| task.is_finished())
    }
}

impl Drop for SweepHandle {
    fn drop(&mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Spawns a background task that sweeps expired entries every `interval`.
///
/// The first sweep runs immediately. Must be called from within a tokio
/// runtime.
///
/// # Errors
/// - `InvalidArgument` if `interval` is zero
/// - `Internal` if there is no tokio runtime to spawn onto
pub fn spawn_sweep_task<S: CacheStorage>(
    storage: Arc<RwLock<S>>,
    stats: Arc<StatsRecorder>,
    interval: Duration,
) -> Result<SweepHandle> {
    if interval.is_zero() {
        return Err(CacheError::InvalidArgument(
            "sweep interval must be greater than zero".to_string(),
        ));
    }

    let runtime = Handle::try_current()
        .map_err(|e| CacheError::Internal(format!("no tokio runtime for sweep task: {}", e)))?;

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let task = runtime.spawn(async move {
        info!("Starting expiry sweep task with interval of {:?}", interval);

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = sweep_once(&*storage, &*stats) {
                        error!("Expiry sweep failed: {}", e);
                    }
                }
                result = shutdown_rx.changed() => {
                    if result.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Expiry sweep task stopped");
    });

    Ok(SweepHandle {
        shutdown_tx,
        task: Some(task),
    })
}

// == Sweep Once ==
/// Runs one sweep under the storage write lock and records it.
///
/// A panic inside `clear_expired` is caught while the guard is still held,
/// so the lock stays usable and the failure comes back as `Internal`.
pub(crate) fn sweep_once<S: CacheStorage>(
    storage: &RwLock<S>,
    stats: &StatsRecorder,
) -> Result<usize> {
    let removed = {
        let mut guard = write_storage(storage);
        panic::catch_unwind(AssertUnwindSafe(|| guard.clear_expired())).map_err(|payload| {
            CacheError::Internal(format!("clear_expired panicked: {}", panic_message(&*payload)))
        })?
    };

    stats.record_sweep(removed);

    if removed > 0 {
        info!("Expiry sweep: removed {} expired entries", removed);
    } else {
        debug!("Expiry sweep: no expired entries found");
    }

    Ok(removed)
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}
