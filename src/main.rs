//! Sharded LRU - workload driver
//!
//! Builds a cache from the environment, hammers it from several threads and
//! reports what happened.

use std::thread;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sharded_lru::{Cache, Config};

/// Main entry point for the workload driver.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the sharded cache with configured parameters
/// 4. Run the mixed add/get/remove workload on worker threads
/// 5. Print the aggregated statistics as JSON
fn main() -> Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sharded_lru=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("failed to load configuration")?;
    info!(
        "Configuration loaded: capacity={}, shards={}, workers={}, ops_per_worker={}, key_space={}",
        config.capacity, config.shards, config.workers, config.ops_per_worker, config.key_space
    );

    let cache: Cache<u64, u64> = config.cache_builder().build();
    info!(
        "Cache initialized with {} shards of capacity {}",
        cache.shard_count(),
        cache.shard_capacity()
    );

    let started = Instant::now();
    thread::scope(|scope| {
        for worker in 0..config.workers {
            let cache = &cache;
            let config = &config;
            scope.spawn(move || run_worker(cache, config, worker as u64));
        }
    });
    let elapsed = started.elapsed();

    let total_ops = config.workers * config.ops_per_worker;
    info!(
        "Workload finished: {} ops in {:?} ({:.0} ops/s), {} entries cached",
        total_ops,
        elapsed,
        total_ops as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
        cache.len()
    );

    if let Some((key, value)) = cache.peek_front() {
        debug!(key, value, "front of sentinel shard");
    }

    let stats = cache.stats();
    info!("Hit rate: {:.2}%", stats.hit_rate() * 100.0);
    let report = serde_json::to_string_pretty(&stats).context("failed to render statistics")?;
    println!("{report}");

    Ok(())
}

/// Runs one worker's share of the workload: 70% gets, 25% adds, 5% removes.
fn run_worker(cache: &Cache<u64, u64>, config: &Config, worker: u64) {
    let key_space = config.key_space.max(1);
    // Worker-specific odd stride so workers walk the key space differently
    let stride = 2 * worker + 7;
    let mut cursor = worker;

    for op in 0..config.ops_per_worker {
        cursor = cursor.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(stride);
        let key = (cursor >> 33) % key_space;
        match op % 20 {
            0..=13 => {
                cache.get(&key);
            }
            14..=18 => cache.add(key, key.wrapping_mul(31)),
            _ => {
                cache.remove(&key);
            }
        }
    }
    debug!(worker, "worker finished");
}
