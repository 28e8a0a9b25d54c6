//! Walkthrough of the TTL cache lifecycle.
//!
//! Run with `cargo run --example walkthrough`. Set `RUST_LOG` to adjust output
//! and `SWEEP_INTERVAL_MS` to change the sweep period.

use std::time::Duration;

use anyhow::Context;
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ttl_cache::{CacheError, CacheService, Config, MemoryStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttl_cache=debug,walkthrough=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!("Configuration loaded: sweep_interval={:?}", config.sweep_interval());

    let cache = CacheService::from_config(MemoryStorage::new(), &config)
        .context("failed to start cache")?;

    cache.add("a", json!("x"), Duration::from_secs(30))?;
    info!("get(a) = {}", cache.get("a")?);

    match cache.add("a", json!("y"), Duration::from_secs(30)) {
        Err(CacheError::KeyExists(key)) => warn!("add rejected, {} is still live", key),
        other => anyhow::bail!("unexpected add result: {:?}", other),
    }

    cache.add("b", json!({"count": 1}), Duration::from_secs(1))?;
    tokio::time::sleep(Duration::from_millis(1100)).await;

    if let Err(e) = cache.get("b") {
        info!("after expiry: {}", e);
    }
    cache.add("b", json!({"count": 2}), Duration::from_secs(30))?;
    info!("revived get(b) = {}", cache.get("b")?);

    cache.add("c", json!(42), Duration::from_millis(10))?;
    tokio::time::sleep(Duration::from_millis(20)).await;
    let removed = cache.purge_expired()?;
    info!("purged {} expired entries", removed);

    let stats = cache.stats();
    info!("stats: {}", serde_json::to_string(&stats)?);

    cache.shutdown().await;
    Ok(())
}
